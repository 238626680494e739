use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' transport unavailable: {detail}. Install Android Platform Tools (https://developer.android.com/tools/adb) or add 'adb' to PATH."
    )]
    TransportUnavailable { detail: String },

    #[error("Failed to push '{source_path}' to '{dest_path}': {detail}")]
    TransferError {
        source_path: String,
        dest_path: String,
        detail: String,
    },

    #[error("No process matching '{name}' found in the device process table")]
    ProcessNotFound { name: String },

    #[error("Process table entry for '{name}' has a non-numeric PID column: '{token}'")]
    MalformedProcessTable { name: String, token: String },

    #[error("Command 'adb {command}' exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run adb: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
