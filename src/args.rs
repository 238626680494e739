use std::env;

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    /// PID of the process to inject into.
    pub pid: u32,
}

impl Args {
    /// Parses the process arguments. Returns `None` when the run should stop
    /// after printing usage or version information; that is not an error
    /// exit, so callers return normally.
    pub fn parse() -> Option<Self> {
        let argv: Vec<String> = env::args().collect();
        Self::parse_from(&argv)
    }

    pub fn parse_from(argv: &[String]) -> Option<Self> {
        let program = argv.first().map(String::as_str).unwrap_or("android-inject-run");
        let mut positional: Vec<&str> = Vec::new();

        for arg in argv.iter().skip(1) {
            if arg == "--help" || arg == "-h" {
                print_usage(program);
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "android-inject-run v{} ({})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return None;
            } else {
                positional.push(arg);
            }
        }

        if positional.len() != 1 {
            print_usage(program);
            return None;
        }

        match positional[0].parse::<u32>() {
            Ok(pid) if pid > 0 => Some(Args { pid }),
            _ => {
                println!("❌ Invalid PID: {}", positional[0]);
                print_usage(program);
                None
            }
        }
    }
}

fn print_usage(program: &str) {
    println!("Usage: {program} <pid>");
    println!();
    println!("Stages the native injector and hook library on the attached device,");
    println!("injects into the given PID and follows the {} log tag.", crate::inject::LOG_TAG);
    println!();
    println!("ARGS:");
    println!("    <pid>               Target process ID (positive integer)");
    println!();
    println!("FLAGS:");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("android-inject-run")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn single_pid_parses() {
        assert_eq!(Args::parse_from(&argv(&["1234"])), Some(Args { pid: 1234 }));
    }

    #[test]
    fn zero_args_prints_usage() {
        assert_eq!(Args::parse_from(&argv(&[])), None);
    }

    #[test]
    fn extra_args_print_usage() {
        assert_eq!(Args::parse_from(&argv(&["1234", "5678"])), None);
    }

    #[test]
    fn non_numeric_pid_is_rejected() {
        assert_eq!(Args::parse_from(&argv(&["browser"])), None);
    }

    #[test]
    fn zero_pid_is_rejected() {
        assert_eq!(Args::parse_from(&argv(&["0"])), None);
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(Args::parse_from(&argv(&["--help"])), None);
        assert_eq!(Args::parse_from(&argv(&["-h", "1234"])), None);
    }
}
