//! Live, line-oriented consumption of a continuously-running log reader.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const LINE_BUFFER: usize = 256;

/// A cancellable view of a long-running child process as a sequence of
/// text lines.
///
/// A dedicated task owns the child's stdout and feeds lines into a bounded
/// channel, so the consumer gets natural backpressure from its own reading
/// pace. Shutting the stream down (or dropping it) kills the child and stops
/// the reader, so the subprocess is never left orphaned.
#[derive(Debug)]
pub struct LogStream {
    rx: mpsc::Receiver<String>,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
}

impl LogStream {
    pub(crate) fn from_child(
        child: Child,
        stdout: impl AsyncRead + Unpin + Send + 'static,
    ) -> Self {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) | Err(_) => break,
                }
            }
        });
        Self {
            rx,
            child: Some(child),
            reader: Some(reader),
        }
    }

    /// A stream backed by pre-cooked lines instead of a child process.
    #[cfg(test)]
    pub(crate) fn from_lines(lines: Vec<String>) -> Self {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            // Capacity matches the line count, so this cannot fail.
            let _ = tx.try_send(line);
        }
        Self {
            rx,
            child: None,
            reader: None,
        }
    }

    /// The next log line, or `None` once the underlying process is gone and
    /// all buffered lines have been drained.
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Tears the stream down: kills the child process and stops the reader
    /// task. This is the clean release path after an external interrupt.
    pub async fn shutdown(mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Stdio;
    use std::time::Duration;
    use tokio::process::Command;

    fn spawn_sh(script: &str) -> (Child, impl AsyncRead + Unpin + Send + 'static) {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn sh");
        let stdout = child.stdout.take().expect("stdout not captured");
        (child, stdout)
    }

    #[tokio::test]
    async fn reads_child_lines_in_order_then_ends() {
        let (child, stdout) = spawn_sh("echo one; echo two");
        let mut stream = LogStream::from_child(child, stdout);
        assert_eq!(stream.next_line().await.as_deref(), Some("one"));
        assert_eq!(stream.next_line().await.as_deref(), Some("two"));
        assert_eq!(stream.next_line().await, None);
    }

    #[tokio::test]
    async fn shutdown_kills_long_running_child() {
        let (child, stdout) = spawn_sh("echo started; sleep 30");
        let mut stream = LogStream::from_child(child, stdout);
        assert_eq!(stream.next_line().await.as_deref(), Some("started"));

        // Must return promptly instead of waiting out the sleep.
        let result = tokio::time::timeout(Duration::from_secs(5), stream.shutdown()).await;
        assert!(result.is_ok(), "shutdown should not wait for the child");
    }

    #[tokio::test]
    async fn from_lines_drains_then_closes() {
        let mut stream = LogStream::from_lines(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(stream.next_line().await.as_deref(), Some("a"));
        assert_eq!(stream.next_line().await.as_deref(), Some("b"));
        assert_eq!(stream.next_line().await, None);
    }
}
