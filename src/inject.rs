//! Fixed injection workflow: stage the payloads, relax SELinux, clear the
//! device log, run the native injector against a target PID, then follow the
//! hook library's log tag.
//!
//! The sequence is linear with no rollback: a failure in any step aborts the
//! whole session and recovery is a fresh run, not cleanup. The injector and
//! hook library themselves are opaque build artifacts; this module only
//! stages and invokes them.

use crate::adb::{AdbResult, AdbShell, LogStream, SecurityMode, Transport};

/// Build artifacts, relative to the working directory.
pub const LOCAL_INJECTOR: &str = "libs/armeabi-v7a/injector";
pub const LOCAL_HOOK_LIB: &str = "libs/armeabi-v7a/libhook.so";

/// Staging location on the device; world-executable temp space.
pub const REMOTE_INJECTOR: &str = "/data/local/tmp/injector";
pub const REMOTE_HOOK_LIB: &str = "/data/local/tmp/libhook.so";

/// Tag under which the injected library writes its diagnostics.
pub const LOG_TAG: &str = "LIBHOOK";

/// One injection run against a live device. Holds nothing beyond the target
/// PID and the payload paths; the resolved state lives on the device.
pub struct InjectionSession<'a, T: Transport> {
    adb: &'a AdbShell<T>,
    target_pid: u32,
    injector: &'a str,
    hook_lib: &'a str,
}

impl<'a, T: Transport> InjectionSession<'a, T> {
    pub fn new(adb: &'a AdbShell<T>, target_pid: u32) -> Self {
        Self {
            adb,
            target_pid,
            injector: LOCAL_INJECTOR,
            hook_lib: LOCAL_HOOK_LIB,
        }
    }

    /// Overrides the local payload paths.
    pub fn with_payload(mut self, injector: &'a str, hook_lib: &'a str) -> Self {
        self.injector = injector;
        self.hook_lib = hook_lib;
        self
    }

    /// Drives the session up to the streaming phase and returns the live
    /// log stream filtered to [`LOG_TAG`]. The caller consumes the stream
    /// until interrupted; interruption is the expected way a session ends.
    pub async fn run(&self) -> AdbResult<LogStream> {
        self.stage().await?;

        // ptrace attach does not work under enforcing policy.
        self.adb.set_security_mode(SecurityMode::Permissive).await?;
        self.adb.clear_log().await?;

        println!("@ Injection into PID {} starting ...", self.target_pid);
        self.adb
            .run_as_root(&format!(
                "{REMOTE_INJECTOR} {} {REMOTE_HOOK_LIB}",
                self.target_pid
            ))
            .await?;

        self.adb.stream_log(Some(LOG_TAG)).await
    }

    /// Removes stale payloads, pushes the injector and the hook library,
    /// and marks the injector runnable.
    async fn stage(&self) -> AdbResult<()> {
        println!("@ Pushing files to /data/local/tmp ...");
        self.adb
            .shell(&format!("rm -rf {REMOTE_INJECTOR} {REMOTE_HOOK_LIB}"))
            .await?;
        self.adb.push(self.injector, REMOTE_INJECTOR).await?;
        self.adb.push(self.hook_lib, REMOTE_HOOK_LIB).await?;
        self.adb
            .shell(&format!("chmod 777 {REMOTE_INJECTOR}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::tests::{RecordingTransport, failed_output, ok_output};
    use crate::adb::{AdbError, AdbShell};

    #[tokio::test]
    async fn full_session_issues_expected_command_sequence() {
        let transport = RecordingTransport::new();
        transport.set_stream_lines(vec!["I/LIBHOOK ( 1234): initialized".to_string()]);
        let adb = AdbShell::with_transport(&transport);

        let mut stream = InjectionSession::new(&adb, 1234).run().await.unwrap();

        assert_eq!(
            transport.issued_lines(),
            [
                "shell rm -rf /data/local/tmp/injector /data/local/tmp/libhook.so",
                "push libs/armeabi-v7a/injector /data/local/tmp/injector",
                "push libs/armeabi-v7a/libhook.so /data/local/tmp/libhook.so",
                "shell chmod 777 /data/local/tmp/injector",
                "shell su 0 setenforce 0",
                "shell su -c supolicy --live \"allow s_untrusted_app shell_data_file file { execute execute_no_trans }\"",
                "logcat -c",
                "shell su -c \"/data/local/tmp/injector 1234 /data/local/tmp/libhook.so\"",
            ]
        );
        assert_eq!(transport.streamed_lines(), ["logcat -s LIBHOOK"]);

        assert_eq!(
            stream.next_line().await.as_deref(),
            Some("I/LIBHOOK ( 1234): initialized")
        );
    }

    #[tokio::test]
    async fn staging_failure_aborts_before_security_toggle() {
        // rm succeeds, first push fails: the session must stop right there,
        // with no partial cleanup and no further device interaction.
        let transport = RecordingTransport::with_outputs(vec![
            ok_output(""),
            failed_output(1, "adb: error: cannot stat 'libs/armeabi-v7a/injector'"),
        ]);
        let adb = AdbShell::with_transport(&transport);

        let err = InjectionSession::new(&adb, 1234).run().await.unwrap_err();
        assert!(matches!(err, AdbError::TransferError { .. }));

        let issued = transport.issued_lines();
        assert_eq!(issued.len(), 2, "nothing runs after the failed push");
        assert!(transport.streamed_lines().is_empty());
    }

    #[tokio::test]
    async fn payload_paths_can_be_overridden() {
        let transport = RecordingTransport::new();
        let adb = AdbShell::with_transport(&transport);

        InjectionSession::new(&adb, 77)
            .with_payload("out/injector", "out/libhook.so")
            .run()
            .await
            .unwrap();

        let issued = transport.issued_lines();
        assert!(issued.contains(&"push out/injector /data/local/tmp/injector".to_string()));
        assert!(issued.contains(&"push out/libhook.so /data/local/tmp/libhook.so".to_string()));
    }
}
