//! Structured construction of adb command lines.
//!
//! Commands are built as argument-token lists so quoting is owned here,
//! centrally, rather than interpolated ad hoc at every call site. The
//! transport prepends device selection (`-s <serial>`) when spawning.

use super::error::{AdbError, AdbResult};

/// One argument list for the `adb` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbCommand {
    args: Vec<String>,
}

impl AdbCommand {
    /// Runs `command_text` inside the device shell. The text travels as a
    /// single argv token, so this is the one quoting layer this level adds.
    pub fn shell(command_text: &str) -> Self {
        Self {
            args: vec!["shell".to_string(), command_text.to_string()],
        }
    }

    /// Runs `command_text` with superuser privilege on the device by
    /// wrapping it as `su -c "..."` before handing it to the device shell.
    ///
    /// Known constraint: `command_text` must not itself contain double
    /// quotes. The text has to survive the su shell, the device shell and
    /// the transport's argv boundary, and an embedded `"` breaks the nesting.
    pub fn elevated(command_text: &str) -> Self {
        Self::shell(&format!("su -c \"{command_text}\""))
    }

    /// Copies a local file to a path on the device.
    pub fn push(source: &str, dest: &str) -> Self {
        Self {
            args: vec!["push".to_string(), source.to_string(), dest.to_string()],
        }
    }

    /// Starts the continuous device log reader, optionally restricted to a
    /// single tag (`logcat -s <tag>` silences everything else).
    pub fn logcat(tag: Option<&str>) -> Self {
        let args = match tag {
            Some(tag) => vec!["logcat".to_string(), "-s".to_string(), tag.to_string()],
            None => vec!["logcat".to_string()],
        };
        Self { args }
    }

    /// Discards accumulated device log history.
    pub fn clear_log() -> Self {
        Self {
            args: vec!["logcat".to_string(), "-c".to_string()],
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Space-joined rendering for diagnostics and logs.
    pub fn display(&self) -> String {
        self.args.join(" ")
    }
}

/// How a short-lived invocation handles its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Output buffered and returned to the caller.
    Captured,
    /// Output discarded; only the exit status is observable.
    Silent,
}

/// Result of one command invocation. Every invocation produces exactly one
/// of these, or fails outright if the transport cannot be started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
    pub success: bool,
}

impl CommandOutput {
    /// Escalates a non-zero exit into a hard error. The base execution path
    /// only reports non-zero status through the log, because device shell
    /// idioms use exit status loosely; callers with a strict contract opt in
    /// here.
    pub fn require_success(self, command: &AdbCommand) -> AdbResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(AdbError::CommandFailed {
                command: command.display(),
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}
