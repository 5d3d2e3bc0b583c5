//! External post-process command
//!
//! The command runs through the platform shell once per document. It gets
//! the serialized document on stdin and its trimmed stdout becomes the
//! output line.

use super::{DocumentTransform, TransformError};
use crate::core::encoding::FileEncoding;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs a shell command per document
#[derive(Debug, Clone)]
pub struct ShellCommand {
    command: String,
    timeout: Duration,
    encoding: FileEncoding,
}

impl ShellCommand {
    /// Create a transform for `command`
    pub fn new(command: impl Into<String>, timeout: Duration, encoding: FileEncoding) -> Self {
        Self {
            command: command.into(),
            timeout,
            encoding,
        }
    }

    /// The command line
    pub fn command(&self) -> &str {
        &self.command
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        let mut command = {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&self.command);
            command
        };

        #[cfg(not(windows))]
        let mut command = {
            let mut command = Command::new("sh");
            command.arg("-c").arg(&self.command);
            command
        };

        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, input: Vec<u8>) -> Result<std::process::Output, TransformError> {
        let mut child = self
            .shell()
            .spawn()
            .map_err(|e| TransformError::Spawn(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransformError::Spawn("stdin is not available".to_string()))?;

        let feed = async move {
            let written = stdin.write_all(&input).await;
            drop(stdin);
            match written {
                // The command may exit without reading its input
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        fed.map_err(|e| TransformError::Spawn(format!("cannot write document: {e}")))?;
        output.map_err(|e| TransformError::Spawn(e.to_string()))
    }
}

#[async_trait]
impl DocumentTransform for ShellCommand {
    async fn transform(&self, document: &Value) -> Result<String, TransformError> {
        let text = serde_json::to_string(document)
            .map_err(|e| TransformError::Serialization(e.to_string()))?;
        let input = self.encoding.encode(&text).map_err(TransformError::Encoding)?;

        let output = tokio::time::timeout(self.timeout, self.run(input))
            .await
            .map_err(|_| TransformError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(TransformError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = self
            .encoding
            .decode(&output.stdout)
            .map_err(|reason| TransformError::Encoding(format!("post-process output: {reason}")))?;

        Ok(stdout.trim().to_string())
    }
}
