// Newline-delimited JSON over a child process's stdio

use crate::error::{BridgeError, Result};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Stdio transport to a bridge subprocess
///
/// One JSON message per line in each direction. The child's stderr is
/// drained in a background task so a chatty server cannot fill the pipe and
/// block itself.
#[derive(Debug)]
pub struct StdioTransport {
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    child: Child,
    closed: bool,
}

impl StdioTransport {
    /// Spawn the bridge subprocess with piped stdio
    pub fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let child_stdin = child.stdin.take().ok_or_else(|| {
            BridgeError::Handshake("Failed to capture stdin of bridge process".to_string())
        })?;
        let child_stdout = child.stdout.take().ok_or_else(|| {
            BridgeError::Handshake("Failed to capture stdout of bridge process".to_string())
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!("[bridge stderr] {}", line);
                }
            });
        }

        Ok(Self {
            stdin: BufWriter::new(child_stdin),
            stdout: BufReader::new(child_stdout),
            child,
            closed: false,
        })
    }

    /// Write one message followed by a newline and flush
    pub async fn send(&mut self, message: &Value) -> Result<()> {
        if self.closed {
            return Err(BridgeError::ConnectionClosed);
        }

        let mut json_str = serde_json::to_string(message)?;
        json_str.push('\n');
        self.stdin.write_all(json_str.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Read the next non-blank message
    pub async fn receive(&mut self) -> Result<Value> {
        if self.closed {
            return Err(BridgeError::ConnectionClosed);
        }

        loop {
            let mut line = String::new();
            let n = self.stdout.read_line(&mut line).await?;
            if n == 0 {
                self.closed = true;
                return Err(BridgeError::ConnectionClosed);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(serde_json::from_str(trimmed)?);
        }
    }

    /// Terminate the subprocess; idempotent
    pub async fn close(&mut self) {
        self.closed = true;
        let _ = self.child.start_kill();
        let _ = tokio::time::timeout(Duration::from_secs(3), self.child.wait()).await;
    }
}
