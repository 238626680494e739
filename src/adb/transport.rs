//! The seam between semantic shell operations and the external `adb` binary.

use std::process::Stdio;

use tokio::process::Command;

use super::command::{AdbCommand, CommandOutput, ExecMode};
use super::error::{AdbError, AdbResult};
use super::logcat::LogStream;

/// Executes adb command lines. Implemented by [`AdbTransport`] for the real
/// binary; tests substitute a recording implementation.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Runs a short-lived command to completion.
    ///
    /// A non-zero exit status is reported through the returned output, not
    /// raised as an error: some device shell idioms use exit status loosely,
    /// so escalation is the caller's decision. Only a transport that cannot
    /// be started at all is a hard failure.
    async fn run(&self, command: &AdbCommand, mode: ExecMode) -> AdbResult<CommandOutput>;

    /// Spawns a long-running command and hands back its live output.
    async fn open_stream(&self, command: &AdbCommand) -> AdbResult<LogStream>;
}

/// Drives the locally installed `adb` binary through `tokio::process`.
pub struct AdbTransport {
    serial: Option<String>,
}

impl AdbTransport {
    /// Probes for the `adb` binary once. A handle that constructs
    /// successfully is assumed valid for the rest of the session.
    ///
    /// `serial` selects a device explicitly; `None` targets the single
    /// attached/default device.
    pub fn new(serial: Option<&str>) -> AdbResult<Self> {
        match std::process::Command::new("adb").arg("version").output() {
            Ok(out) if out.status.success() => Ok(Self {
                serial: serial.map(str::to_string),
            }),
            Ok(out) => Err(AdbError::TransportUnavailable {
                detail: format!("'adb version' returned non-zero ({})", out.status),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AdbError::TransportUnavailable {
                    detail: "'adb' binary not found in PATH".to_string(),
                })
            }
            Err(e) => Err(AdbError::TransportUnavailable {
                detail: format!("failed to invoke 'adb': {e}"),
            }),
        }
    }

    fn command(&self, command: &AdbCommand) -> Command {
        let mut cmd = Command::new("adb");
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(command.args());
        cmd
    }
}

impl Transport for AdbTransport {
    async fn run(&self, command: &AdbCommand, mode: ExecMode) -> AdbResult<CommandOutput> {
        let mut cmd = self.command(command);
        if mode == ExecMode::Silent {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        log::debug!("adb {}", command.display());
        let out = cmd.output().await?;
        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            code: out.status.code(),
            success: out.status.success(),
        };
        if !output.success {
            log::warn!(
                "adb {} exited with {:?}: stdout={:?} stderr={:?}",
                command.display(),
                output.code,
                output.stdout.trim_end(),
                output.stderr.trim_end()
            );
        } else if !output.stderr.is_empty() {
            // The remote shell sometimes writes warnings here even on success.
            log::warn!("adb {}: {}", command.display(), output.stderr.trim_end());
        }
        Ok(output)
    }

    async fn open_stream(&self, command: &AdbCommand) -> AdbResult<LogStream> {
        let mut cmd = self.command(command);
        cmd.stdout(Stdio::piped()).stderr(Stdio::null());
        log::debug!("adb {} (streaming)", command.display());
        let mut child = cmd.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("child stdout not captured"))?;
        Ok(LogStream::from_child(child, stdout))
    }
}
