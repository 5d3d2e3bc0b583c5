//! Document store abstraction
//!
//! This module defines the trait the transfer engine talks to. The
//! Elasticsearch HTTP client implements it; tests use in-process doubles.

use crate::domain::StoreError;
use async_trait::async_trait;
use serde_json::Value;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Status the store reported for one bulk item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemStatus {
    /// HTTP status of the item
    pub status: u16,

    /// Error reason for failed items
    pub reason: Option<String>,
}

impl BulkItemStatus {
    /// A successful item
    pub fn ok(status: u16) -> Self {
        Self {
            status,
            reason: None,
        }
    }

    /// A failed item
    pub fn failed(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: Some(reason.into()),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One page of search hits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollPage {
    /// Cursor for the next page, if the store returned one
    pub scroll_id: Option<String>,

    /// Hits in store order
    pub hits: Vec<Value>,
}

/// Document store operations used by import and export
///
/// Implementations must not retry on their own: retries are decided by the
/// import executor, and export never retries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check that the store is reachable and accepts the credentials
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the request.
    async fn ping(&self) -> StoreResult<()>;

    /// Submit one NDJSON bulk request
    ///
    /// Returns one status per bulk item, in request order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request as a whole failed.
    async fn bulk(
        &self,
        index: &str,
        pipeline: Option<&str>,
        body: String,
    ) -> StoreResult<Vec<BulkItemStatus>>;

    /// Run `query` and open a scroll cursor
    ///
    /// # Errors
    ///
    /// Returns an error if the query is refused or the store is unreachable.
    async fn open_scroll(
        &self,
        index: Option<&str>,
        query: &Value,
        page_size: usize,
        keep_alive: &str,
    ) -> StoreResult<ScrollPage>;

    /// Fetch the page after `scroll_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor expired or the store is unreachable.
    async fn next_scroll(&self, scroll_id: &str, keep_alive: &str) -> StoreResult<ScrollPage>;

    /// Release a scroll cursor
    ///
    /// # Errors
    ///
    /// Returns an error if the store did not release the cursor.
    async fn clear_scroll(&self, scroll_id: &str) -> StoreResult<()>;
}
