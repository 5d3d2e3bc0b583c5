//! Document transforms applied on export
//!
//! A transform turns one exported document into the text written to the
//! output. The default serializes the document as compact JSON; the
//! `--post-process` option swaps in an external command.
//!
//! # Example
//!
//! ```rust
//! use ferry::core::transform::{DocumentTransform, JsonSerializer};
//! use serde_json::json;
//!
//! # async fn example() {
//! let text = JsonSerializer.transform(&json!({"name": "Zoë"})).await.unwrap();
//! assert_eq!(text, r#"{"name":"Zoë"}"#);
//! # }
//! ```

pub mod command;

pub use command::ShellCommand;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Why a document could not be transformed
///
/// Every variant is a per-document rejection; none of them stops the run.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The command could not be started or fed
    #[error("post-process command could not run: {0}")]
    Spawn(String),

    /// The command exited unsuccessfully
    #[error("post-process command failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    /// The command did not finish in time
    #[error("post-process command timed out after {0:?}")]
    Timeout(Duration),

    /// Input or output could not be converted to or from the file encoding
    #[error("{0}")]
    Encoding(String),

    /// The document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Converts one exported document into output text
#[async_trait]
pub trait DocumentTransform: Send + Sync {
    /// Transform one document
    ///
    /// An empty string means "write nothing for this document".
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] when the document must be rejected.
    async fn transform(&self, document: &Value) -> Result<String, TransformError>;
}

/// Compact JSON, one document per line
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

#[async_trait]
impl DocumentTransform for JsonSerializer {
    async fn transform(&self, document: &Value) -> Result<String, TransformError> {
        serde_json::to_string(document).map_err(|e| TransformError::Serialization(e.to_string()))
    }
}
