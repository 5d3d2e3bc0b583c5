//! Elasticsearch request and response payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Response of `POST /<index>/_bulk`
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    /// Whether any item failed
    #[serde(default)]
    pub errors: bool,

    /// One single-key object per item, keyed by the operation name
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItem>>,
}

/// Result of one bulk operation
#[derive(Debug, Deserialize)]
pub struct BulkItem {
    /// HTTP status of the item
    pub status: u16,

    /// Error details for failed items
    #[serde(default)]
    pub error: Option<Value>,
}

impl BulkItem {
    /// Human-readable failure reason
    pub fn reason(&self) -> Option<String> {
        self.error.as_ref().map(error_reason)
    }
}

/// Response of `_search` and `_search/scroll`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Cursor for the next page
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,

    /// Matched documents
    pub hits: SearchHits,
}

/// The `hits` section of a search response
#[derive(Debug, Deserialize)]
pub struct SearchHits {
    /// Hits on this page
    #[serde(default)]
    pub hits: Vec<Value>,
}

/// Body of `POST /_search/scroll`
#[derive(Debug, Serialize)]
pub struct ScrollRequest<'a> {
    pub scroll: &'a str,
    pub scroll_id: &'a str,
}

/// Body of `DELETE /_search/scroll`
#[derive(Debug, Serialize)]
pub struct ClearScrollRequest<'a> {
    pub scroll_id: Vec<&'a str>,
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Value,
}

/// Extract `type: reason` from an error value, which may be a string or an
/// object with `type`/`reason` fields
pub fn error_reason(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(object) => {
            let kind = object.get("type").and_then(Value::as_str);
            let reason = object.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{kind}: {reason}"),
                (None, Some(reason)) => reason.to_string(),
                (Some(kind), None) => kind.to_string(),
                (None, None) => error.to_string(),
            }
        }
        other => other.to_string(),
    }
}
