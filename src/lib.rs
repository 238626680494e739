pub mod adb;
pub mod args;
pub mod inject;

pub use adb::{AdbError, AdbResult, AdbShell, LogStream, SecurityMode};
pub use inject::InjectionSession;
