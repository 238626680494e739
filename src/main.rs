use android_inject_run::adb::AdbShell;
use android_inject_run::args::Args;
use android_inject_run::inject::InjectionSession;

fn main() {
    env_logger::init();

    // Usage/version/bad-argument runs end here, without error status and
    // before any device interaction.
    let Some(args) = Args::parse() else {
        return;
    };

    let rt = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    let code = rt.block_on(run(args.pid));
    std::process::exit(code);
}

async fn run(pid: u32) -> i32 {
    let adb = match AdbShell::new(None) {
        Ok(adb) => adb,
        Err(e) => {
            eprintln!("❌ {e}");
            return 1;
        }
    };

    let session = InjectionSession::new(&adb, pid);
    let mut stream = match session.run().await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("❌ {e}");
            return 1;
        }
    };

    // Follow the log until Ctrl-C. The interrupt is the expected way a
    // session ends, so it exits silently with normal status.
    loop {
        tokio::select! {
            line = stream.next_line() => match line {
                Some(line) => println!("{line}"),
                None => break, // transport ended on its own
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    stream.shutdown().await;
    0
}
