//! Semantic device operations built on top of the transport.

use std::time::Duration;

use super::command::{AdbCommand, ExecMode};
use super::error::{AdbError, AdbResult};
use super::logcat::LogStream;
use super::transport::{AdbTransport, Transport};

/// SELinux posture of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Enforcing,
    Permissive,
}

impl SecurityMode {
    fn setenforce_arg(self) -> &'static str {
        match self {
            SecurityMode::Enforcing => "1",
            SecurityMode::Permissive => "0",
        }
    }
}

/// Live supolicy exception letting the untrusted app domain execute a
/// shell-staged file, which the injector's ptrace attach needs. Applied on
/// entering permissive mode and intentionally never retracted; this string
/// embeds double quotes, so it bypasses the `su -c` wrapping and goes to the
/// device shell verbatim.
const PTRACE_POLICY_EXCEPTION: &str = "su -c supolicy --live \"allow s_untrusted_app shell_data_file file { execute execute_no_trans }\"";

/// Handle to one attached device, reached through the external `adb` binary.
///
/// Construction validates the transport once; after that every operation
/// assumes the handle is good. Exactly one command is in flight at a time.
pub struct AdbShell<T: Transport = AdbTransport> {
    transport: T,
}

impl AdbShell<AdbTransport> {
    /// Connects to the single attached/default device, or to `serial` when
    /// given. Fails with `TransportUnavailable` if the adb binary cannot be
    /// reached, before any other operation is attempted.
    pub fn new(serial: Option<&str>) -> AdbResult<Self> {
        Ok(Self {
            transport: AdbTransport::new(serial)?,
        })
    }
}

impl<T: Transport> AdbShell<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Copies a local file onto the device. Output is discarded; only the
    /// exit status is observable, and a non-zero status is a hard failure.
    pub async fn push(&self, source: &str, dest: &str) -> AdbResult<()> {
        let out = self
            .transport
            .run(&AdbCommand::push(source, dest), ExecMode::Silent)
            .await?;
        if !out.success {
            return Err(AdbError::TransferError {
                source_path: source.to_string(),
                dest_path: dest.to_string(),
                detail: format!("adb push exited with {:?}", out.code),
            });
        }
        Ok(())
    }

    /// Runs `command_text` in the device shell and returns raw stdout.
    /// Trailing line endings are preserved; trimming is the caller's
    /// responsibility. Quoting of special characters inside `command_text`
    /// is also the caller's responsibility.
    pub async fn shell(&self, command_text: &str) -> AdbResult<String> {
        let out = self
            .transport
            .run(&AdbCommand::shell(command_text), ExecMode::Captured)
            .await?;
        Ok(out.stdout)
    }

    /// Runs `command_text` with superuser privilege on the device. See
    /// [`AdbCommand::elevated`] for the double-quote constraint.
    pub async fn run_as_root(&self, command_text: &str) -> AdbResult<String> {
        let out = self
            .transport
            .run(&AdbCommand::elevated(command_text), ExecMode::Captured)
            .await?;
        Ok(out.stdout)
    }

    /// Sends SIGKILL to every process matching `name`. Fire-and-forget: no
    /// verification that anything actually died.
    pub async fn kill_process(&self, name: &str) -> AdbResult<()> {
        self.run_as_root(&format!("pkill -9 {name}")).await?;
        Ok(())
    }

    /// Discards accumulated device log history so subsequent streaming
    /// starts from a known-empty baseline.
    pub async fn clear_log(&self) -> AdbResult<()> {
        self.transport
            .run(&AdbCommand::clear_log(), ExecMode::Captured)
            .await?;
        Ok(())
    }

    /// Toggles SELinux enforcement. Entering permissive additionally grants
    /// the ptrace policy exception; switching back to enforcing restores the
    /// mode only and leaves the exception in place. The asymmetry is
    /// deliberate.
    pub async fn set_security_mode(&self, mode: SecurityMode) -> AdbResult<()> {
        self.shell(&format!("su 0 setenforce {}", mode.setenforce_arg()))
            .await?;
        if mode == SecurityMode::Permissive {
            self.shell(PTRACE_POLICY_EXCEPTION).await?;
        }
        Ok(())
    }

    /// Resolves a PID by process-table lookup. The table is queried fresh on
    /// every call; the device's process set can change between calls.
    ///
    /// When several processes match the name substring, the first line in
    /// table order wins. Callers needing an exact match must make the search
    /// name unambiguous.
    pub async fn find_process_id(&self, name: &str) -> AdbResult<u32> {
        let table = self.run_as_root(&format!("ps | grep '{name}'")).await?;
        parse_process_id(&table, name)
    }

    /// Kills `package`, relaunches its entry `activity`, and returns the new
    /// PID. Used by workflows that restart the target app before injecting.
    pub async fn restart_activity(&self, package: &str, activity: &str) -> AdbResult<u32> {
        self.kill_process(package).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        self.shell(&format!("am start {package}/{activity}")).await?;
        self.find_process_id(package).await
    }

    /// Attaches to the device's continuous log, optionally restricted to one
    /// tag. The returned stream runs until shut down or the transport dies;
    /// this is the one long-running operation in the system.
    pub async fn stream_log(&self, tag: Option<&str>) -> AdbResult<LogStream> {
        self.transport.open_stream(&AdbCommand::logcat(tag)).await
    }
}

/// Second whitespace column of the first line containing `name`, parsed as a
/// PID.
fn parse_process_id(table: &str, name: &str) -> AdbResult<u32> {
    let line = table
        .lines()
        .find(|line| line.contains(name))
        .ok_or_else(|| AdbError::ProcessNotFound {
            name: name.to_string(),
        })?;
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AdbError::MalformedProcessTable {
            name: name.to_string(),
            token: String::new(),
        })?;
    token.parse().map_err(|_| AdbError::MalformedProcessTable {
        name: name.to_string(),
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS_OUTPUT: &str = "\
u0_a61    4122  180   512340 48220 ffffffff 00000000 S com.android.browser
u0_a61    4388  4122  498120 31004 ffffffff 00000000 S com.android.browser:sandboxed
";

    #[test]
    fn parse_pid_takes_second_column_of_first_match() {
        let pid = parse_process_id(PS_OUTPUT, "com.android.browser").unwrap();
        assert_eq!(pid, 4122);
    }

    #[test]
    fn parse_pid_substring_match_prefers_table_order() {
        // Both lines contain the substring; the first one wins.
        let pid = parse_process_id(PS_OUTPUT, "browser").unwrap();
        assert_eq!(pid, 4122);
    }

    #[test]
    fn parse_pid_zero_matches_is_process_not_found() {
        let err = parse_process_id(PS_OUTPUT, "com.example.missing").unwrap_err();
        assert!(matches!(err, AdbError::ProcessNotFound { name } if name == "com.example.missing"));
    }

    #[test]
    fn parse_pid_empty_table_is_process_not_found() {
        let err = parse_process_id("", "anything").unwrap_err();
        assert!(matches!(err, AdbError::ProcessNotFound { .. }));
    }

    #[test]
    fn parse_pid_non_numeric_column_is_malformed() {
        let table = "USER      PID   PPID  VSIZE  RSS   WCHAN    PC         NAME com.foo\n";
        let err = parse_process_id(table, "com.foo").unwrap_err();
        assert!(matches!(err, AdbError::MalformedProcessTable { token, .. } if token == "PID"));
    }

    #[test]
    fn parse_pid_single_token_line_is_malformed() {
        let err = parse_process_id("com.foo\n", "com.foo").unwrap_err();
        assert!(matches!(err, AdbError::MalformedProcessTable { token, .. } if token.is_empty()));
    }
}
