// ADB module - device shell abstraction over the external `adb` binary.
// Turns high-level intents (push a file, run as root, find a PID, follow a
// log tag) into correctly quoted external command invocations.

pub mod command;
pub mod error;
pub mod logcat;
pub mod shell;
pub mod transport;


pub use command::{AdbCommand, CommandOutput, ExecMode};
pub use error::{AdbError, AdbResult};
pub use logcat::LogStream;
pub use shell::{AdbShell, SecurityMode};
pub use transport::{AdbTransport, Transport};
