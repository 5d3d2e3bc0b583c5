//! Export coordinator - drives query results into an output file
//!
//! Pages are pulled one at a time from the scroll cursor. Every hit is
//! projected, transformed and written before the next page is fetched, so
//! output order follows the order of the hits.

use super::scroll::ScrollSource;
use super::sink::OutputSink;
use crate::adapters::store::DocumentStore;
use crate::config::MAX_CHUNK_SIZE;
use crate::core::encoding::FileEncoding;
use crate::core::envelope::Projection;
use crate::core::summary::{ChunkResult, Direction, RunState, RunSummary};
use crate::core::transform::DocumentTransform;
use crate::domain::{FerryError, ItemFailure, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;

/// Everything an export run needs to know
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Query file, `-` reads stdin
    pub query_file: PathBuf,

    /// Index to search; all indices when absent
    pub index: Option<String>,

    /// Output file; stdout when absent
    pub output: Option<PathBuf>,

    /// Export complete hits instead of `_source`
    pub full: bool,

    /// Hits per page
    pub chunk_size: usize,

    /// Output encoding
    pub encoding: FileEncoding,

    /// Scroll keep-alive, e.g. `5m`
    pub keep_alive: String,
}

impl ExportOptions {
    /// Options with defaults for everything but the query file
    pub fn new(query_file: impl Into<PathBuf>) -> Self {
        Self {
            query_file: query_file.into(),
            index: None,
            output: None,
            full: false,
            chunk_size: 1000,
            encoding: FileEncoding::utf8(),
            keep_alive: "5m".to_string(),
        }
    }

    /// Check option values that cannot work
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(FerryError::Configuration(format!(
                "Chunk size must be between 1 and {MAX_CHUNK_SIZE}"
            )));
        }

        if let Some(index) = &self.index {
            if index.trim().is_empty() {
                return Err(FerryError::Configuration(
                    "Index name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn projection(&self) -> Projection {
        if self.full {
            Projection::Full
        } else {
            Projection::Source
        }
    }
}

/// Read and parse the query document
///
/// # Errors
///
/// Returns [`FerryError::Query`] when the text is not a JSON object and
/// [`FerryError::Input`] when it cannot be read.
pub async fn read_query(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|e| FerryError::Input(format!("Cannot read query from stdin: {e}")))?;
        text
    } else {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            FerryError::Input(format!("Cannot read query file {}: {}", path.display(), e))
        })?
    };

    parse_query(&text)
}

fn parse_query(text: &str) -> Result<Value> {
    let query: Value = serde_json::from_str(text)
        .map_err(|e| FerryError::Query(format!("Query is not valid JSON: {e}")))?;
    if !query.is_object() {
        return Err(FerryError::Query(
            "Query must be a JSON object".to_string(),
        ));
    }
    Ok(query)
}

/// Export coordinator
pub struct ExportCoordinator {
    options: ExportOptions,
    store: Arc<dyn DocumentStore>,
    transform: Arc<dyn DocumentTransform>,
    shutdown: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator
    pub fn new(
        options: ExportOptions,
        store: Arc<dyn DocumentStore>,
        transform: Arc<dyn DocumentTransform>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            options,
            store,
            transform,
            shutdown,
        }
    }

    /// Execute the export
    ///
    /// # Errors
    ///
    /// Returns an error for run-level failures: bad options or query,
    /// unreachable store, failed page fetch or an unwritable output.
    pub async fn execute(self) -> Result<RunSummary> {
        self.options.validate()?;
        let query = read_query(&self.options.query_file).await?;

        tracing::info!(
            index = self.options.index.as_deref().unwrap_or("_all"),
            chunk_size = self.options.chunk_size,
            full = self.options.full,
            encoding = self.options.encoding.name(),
            "Starting export"
        );

        self.store.ping().await?;

        let mut sink = OutputSink::open(self.options.output.as_deref(), self.options.encoding).await?;
        let mut pages = ScrollSource::new(
            self.store.clone(),
            self.options.index.clone(),
            query,
            self.options.chunk_size,
            self.options.keep_alive.clone(),
        );

        let outcome = self.run(&mut pages, &mut sink).await;
        pages.close().await;
        let summary = outcome?;

        tracing::debug!(fetches = pages.fetches(), lines = sink.lines(), "Export finished");
        summary.log_summary();
        Ok(summary)
    }

    async fn run(&self, pages: &mut ScrollSource, sink: &mut OutputSink) -> Result<RunSummary> {
        let projection = self.options.projection();
        let mut state = RunState::start(Direction::Export);
        let mut interrupted = false;
        let mut ordinal: u64 = 0;

        loop {
            if *self.shutdown.borrow() {
                tracing::warn!(
                    chunks = state.chunks(),
                    "Shutdown requested, stopping before the next page"
                );
                interrupted = true;
                break;
            }

            let Some(hits) = pages.next_page().await? else {
                break;
            };
            let first = ordinal + 1;
            let records = hits.len();

            let mut result = ChunkResult::new();
            for hit in hits {
                ordinal += 1;
                self.export_hit(ordinal, hit, projection, sink, &mut result)
                    .await?;
            }
            sink.flush().await?;

            crate::log_chunk_processed!(
                state.chunks() + 1,
                first,
                records,
                result.accepted,
                result.failed()
            );
            state.record_chunk(result);
        }

        Ok(state.finish(false, interrupted))
    }

    async fn export_hit(
        &self,
        ordinal: u64,
        hit: Value,
        projection: Projection,
        sink: &mut OutputSink,
        result: &mut ChunkResult,
    ) -> Result<()> {
        let document = match projection.apply(hit) {
            Ok(document) => document,
            Err(reason) => {
                result.add_failure(ItemFailure::new(ordinal, reason));
                return Ok(());
            }
        };

        let text = match self.transform.transform(&document).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(ordinal, error = %e, "Document rejected by transform");
                result.add_failure(ItemFailure::new(ordinal, e.to_string()));
                return Ok(());
            }
        };

        if text.is_empty() {
            result.add_skipped();
            return Ok(());
        }

        match sink.encode(&text) {
            Ok(bytes) => {
                sink.write_line(&bytes).await?;
                result.add_success(1);
            }
            Err(reason) => result.add_failure(ItemFailure::new(ordinal, reason)),
        }
        Ok(())
    }
}
