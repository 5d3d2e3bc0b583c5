//! Paged reading of search results through a scroll cursor

use crate::adapters::store::{DocumentStore, ScrollPage};
use crate::domain::{FerryError, Result, StoreError};
use serde_json::Value;
use std::sync::Arc;

/// Async pager over a scroll query
///
/// Each call to [`next_page`](ScrollSource::next_page) performs one fetch.
/// The sequence ends when a page is shorter than the page size or the store
/// stops handing out a cursor.
pub struct ScrollSource {
    store: Arc<dyn DocumentStore>,
    index: Option<String>,
    query: Value,
    page_size: usize,
    keep_alive: String,
    scroll_id: Option<String>,
    started: bool,
    exhausted: bool,
    fetches: usize,
}

impl ScrollSource {
    /// Create a pager; nothing is fetched until the first `next_page`
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index: Option<String>,
        query: Value,
        page_size: usize,
        keep_alive: impl Into<String>,
    ) -> Self {
        Self {
            store,
            index,
            query,
            page_size: page_size.max(1),
            keep_alive: keep_alive.into(),
            scroll_id: None,
            started: false,
            exhausted: false,
            fetches: 0,
        }
    }

    /// Number of page fetches performed
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Fetch the next page of hits, or `None` at the end
    ///
    /// # Errors
    ///
    /// Any fetch failure is fatal for the run. A query the store refuses is
    /// reported as [`FerryError::Query`].
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = if !self.started {
            self.started = true;
            self.store
                .open_scroll(
                    self.index.as_deref(),
                    &self.query,
                    self.page_size,
                    &self.keep_alive,
                )
                .await
        } else {
            match self.scroll_id.as_deref() {
                Some(scroll_id) => self.store.next_scroll(scroll_id, &self.keep_alive).await,
                None => Ok(ScrollPage::default()),
            }
        };

        let page = page.map_err(|e| {
            self.exhausted = true;
            fetch_error(e)
        })?;
        self.fetches += 1;

        if page.scroll_id.is_some() {
            self.scroll_id = page.scroll_id;
        }
        if page.hits.len() < self.page_size || self.scroll_id.is_none() {
            self.exhausted = true;
        }

        tracing::debug!(
            fetch = self.fetches,
            hits = page.hits.len(),
            exhausted = self.exhausted,
            "Fetched result page"
        );

        if page.hits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(page.hits))
        }
    }

    /// Release the cursor; failures are only logged
    pub async fn close(&mut self) {
        if let Some(scroll_id) = self.scroll_id.take() {
            if let Err(e) = self.store.clear_scroll(&scroll_id).await {
                tracing::warn!(error = %e, "Failed to release scroll cursor");
            }
        }
    }
}

fn fetch_error(error: StoreError) -> FerryError {
    match error {
        StoreError::ClientError { .. } => FerryError::Query(error.to_string()),
        other => FerryError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mapping() {
        assert!(matches!(
            fetch_error(StoreError::from_status(400, "parsing_exception")),
            FerryError::Query(_)
        ));
        assert!(matches!(
            fetch_error(StoreError::from_status(404, "search_context_missing_exception")),
            FerryError::Query(_)
        ));
        let unreachable = fetch_error(StoreError::ConnectionFailed("refused".into()));
        assert_eq!(unreachable.exit_code(), 4);
    }
}
