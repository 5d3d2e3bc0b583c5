//! Output file or stdout for exported documents

use crate::core::encoding::FileEncoding;
use crate::domain::{FerryError, Result};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Line-oriented writer in the configured encoding
pub struct OutputSink {
    writer: BufWriter<Box<dyn AsyncWrite + Unpin + Send>>,
    encoding: FileEncoding,
    lines: u64,
}

impl OutputSink {
    /// Open `path`, or stdout when no path is given
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Output`] if the file cannot be created.
    pub async fn open(path: Option<&Path>, encoding: FileEncoding) -> Result<Self> {
        let writer: Box<dyn AsyncWrite + Unpin + Send> = match path {
            Some(path) => {
                let file = tokio::fs::File::create(path).await.map_err(|e| {
                    FerryError::Output(format!(
                        "Cannot create output file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Box::new(file)
            }
            None => Box::new(tokio::io::stdout()),
        };
        Ok(Self::from_writer(writer, encoding))
    }

    /// Wrap an arbitrary writer
    pub fn from_writer(writer: Box<dyn AsyncWrite + Unpin + Send>, encoding: FileEncoding) -> Self {
        Self {
            writer: BufWriter::new(writer),
            encoding,
            lines: 0,
        }
    }

    /// Encode a line; characters the encoding cannot hold are an error
    pub fn encode(&self, text: &str) -> std::result::Result<Vec<u8>, String> {
        self.encoding.encode(text)
    }

    /// Append one encoded line
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Output`] if the write fails.
    pub async fn write_line(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).await.map_err(output_error)?;
        self.writer.write_all(b"\n").await.map_err(output_error)?;
        self.lines += 1;
        Ok(())
    }

    /// Flush buffered lines
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Output`] if the flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(output_error)
    }

    /// Lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

fn output_error(e: std::io::Error) -> FerryError {
    FerryError::Output(format!("Failed to write output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding;

    #[tokio::test]
    async fn test_writes_lines_in_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let latin1 = encoding::resolve("latin1").unwrap();

        let mut sink = OutputSink::open(Some(&path), latin1).await.unwrap();
        let line = sink.encode(r#"{"name":"José"}"#).unwrap();
        sink.write_line(&line).await.unwrap();
        sink.write_line(b"{}").await.unwrap();
        sink.flush().await.unwrap();

        assert_eq!(sink.lines(), 2);
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, b"{\"name\":\"Jos\xe9\"}\n{}\n".to_vec());
    }

    #[tokio::test]
    async fn test_unrepresentable_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let sink = OutputSink::open(Some(&path), encoding::resolve("ascii").unwrap())
            .await
            .unwrap();
        assert!(sink.encode("naïve").is_err());
    }

    #[tokio::test]
    async fn test_unwritable_path() {
        let result = OutputSink::open(
            Some(Path::new("/nonexistent/dir/out.jsonl")),
            FileEncoding::utf8(),
        )
        .await;
        assert!(matches!(result, Err(FerryError::Output(_))));
    }
}
