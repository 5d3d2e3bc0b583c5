//! Import coordinator - drives a file through the bulk API
//!
//! The run is strictly sequential: read a chunk, build its envelopes,
//! submit and resolve it, record the outcome, then read the next chunk.
//! A shutdown signal is honoured only between chunks.

use super::executor::BulkExecutor;
use super::retry::RetryPolicy;
use crate::adapters::store::DocumentStore;
use crate::core::batch::Batcher;
use crate::core::encoding::FileEncoding;
use crate::core::envelope::{self, EnvelopeBuilder};
use crate::core::source::{self, InputFormat};
use crate::core::summary::{ChunkResult, Direction, RunState, RunSummary};
use crate::domain::{FerryError, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Everything an import run needs to know
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Input file
    pub input: PathBuf,

    /// Target index
    pub index: String,

    /// Ingest pipeline
    pub pipeline: Option<String>,

    /// Generate an `index` action per record
    pub generate_action: bool,

    /// Dotted path of the document id
    pub id_field: Option<String>,

    /// Records per bulk request
    pub chunk_size: usize,

    /// Input encoding
    pub encoding: FileEncoding,

    /// Print requests instead of sending them
    pub dry_run: bool,

    /// Retry behaviour for transient item failures
    pub retry: RetryPolicy,
}

impl ImportOptions {
    /// Options with defaults for everything but the input and index
    pub fn new(input: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            index: index.into(),
            pipeline: None,
            generate_action: true,
            id_field: None,
            chunk_size: 1000,
            encoding: FileEncoding::utf8(),
            dry_run: false,
            retry: RetryPolicy::default(),
        }
    }

    /// Check option combinations that cannot work
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first problem found.
    pub fn validate(&self) -> Result<InputFormat> {
        let format = InputFormat::from_path(&self.input)?;

        if self.index.trim().is_empty() {
            return Err(FerryError::Configuration(
                "Index name cannot be empty".to_string(),
            ));
        }

        if self.id_field.is_some() && !self.generate_action {
            return Err(FerryError::Configuration(
                "ID field can only be applied to generated actions".to_string(),
            ));
        }

        if format.is_structured() && !self.generate_action {
            return Err(FerryError::Configuration(
                "Actions must be generated for CSV input".to_string(),
            ));
        }

        Ok(format)
    }

    fn envelope_builder(&self) -> EnvelopeBuilder {
        let builder = if self.generate_action {
            EnvelopeBuilder::generated(self.index.clone())
        } else {
            EnvelopeBuilder::passthrough(self.index.clone())
        };
        builder
            .with_pipeline(self.pipeline.clone())
            .with_id_field(self.id_field.as_deref())
    }
}

/// Import coordinator
pub struct ImportCoordinator {
    options: ImportOptions,
    store: Arc<dyn DocumentStore>,
    shutdown: watch::Receiver<bool>,
    dry_run_output: Box<dyn Write + Send>,
}

impl ImportCoordinator {
    /// Create a coordinator; dry-run requests go to stdout
    pub fn new(
        options: ImportOptions,
        store: Arc<dyn DocumentStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            options,
            store,
            shutdown,
            dry_run_output: Box::new(std::io::stdout()),
        }
    }

    /// Send dry-run requests somewhere other than stdout
    pub fn with_dry_run_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.dry_run_output = output;
        self
    }

    /// Execute the import
    ///
    /// This is the main entry point. It:
    /// 1. Validates the options and opens the input
    /// 2. Checks the store connection (skipped in dry-run)
    /// 3. Streams chunks through envelope building and bulk submission
    /// 4. Returns the run summary
    ///
    /// # Errors
    ///
    /// Returns an error for run-level failures only: bad options, unreadable
    /// input, unreachable store or refused credentials.
    pub async fn execute(mut self) -> Result<RunSummary> {
        let format = self.options.validate()?;
        let input = source::open(&self.options.input, format, self.options.encoding)?;

        tracing::info!(
            input = %self.options.input.display(),
            index = %self.options.index,
            format = ?format,
            chunk_size = self.options.chunk_size,
            generate_action = self.options.generate_action,
            dry_run = self.options.dry_run,
            "Starting import"
        );

        if !self.options.dry_run {
            self.store.ping().await?;
        }

        let builder = self.options.envelope_builder();
        let executor = BulkExecutor::new(
            self.store.clone(),
            self.options.index.clone(),
            self.options.pipeline.clone(),
            self.options.retry.clone(),
        );

        let mut batcher = Batcher::new(input, self.options.chunk_size);
        if !self.options.generate_action {
            batcher = batcher.keep_with_next(envelope::expects_document);
        }

        let mut state = RunState::start(Direction::Import);
        let mut interrupted = false;

        loop {
            if *self.shutdown.borrow() {
                tracing::warn!(
                    chunks = state.chunks(),
                    "Shutdown requested, stopping before the next chunk"
                );
                interrupted = true;
                break;
            }

            let Some(chunk) = batcher.next() else {
                break;
            };
            let chunk = chunk?;
            let first = chunk.first().map(|r| r.ordinal).unwrap_or_default();

            let envelopes = builder.build(&chunk);
            let mut result = ChunkResult::new();
            for failure in envelopes.rejected {
                tracing::debug!(ordinal = failure.ordinal, reason = %failure.reason, "Rejected locally");
                result.add_failure(failure);
            }

            if self.options.dry_run {
                if !envelopes.entries.is_empty() {
                    let request = envelope::render_request(
                        builder.index(),
                        builder.pipeline(),
                        &envelopes.entries,
                    );
                    self.dry_run_output
                        .write_all(request.as_bytes())
                        .and_then(|_| self.dry_run_output.flush())
                        .map_err(|e| FerryError::Output(format!("Cannot write dry-run output: {e}")))?;
                }
                for entry in &envelopes.entries {
                    for _ in &entry.ordinals {
                        result.add_skipped();
                    }
                }
            } else if !envelopes.entries.is_empty() {
                result.merge(executor.submit(envelopes.entries).await?);
            }

            crate::log_chunk_processed!(
                state.chunks() + 1,
                first,
                chunk.len(),
                result.accepted,
                result.failed()
            );
            state.record_chunk(result);
        }

        state.add_skipped(batcher.source().skipped() as usize);

        let summary = state.finish(self.options.dry_run, interrupted);
        summary.log_summary();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_validation() {
        let options = ImportOptions::new("data.jsonl", "docs");
        assert_eq!(options.validate().unwrap(), InputFormat::JsonLines);

        let mut options = ImportOptions::new("data.jsonl", "docs");
        options.generate_action = false;
        options.id_field = Some("id".to_string());
        assert!(matches!(
            options.validate(),
            Err(FerryError::Configuration(_))
        ));

        let mut options = ImportOptions::new("rows.csv", "docs");
        options.generate_action = false;
        assert!(matches!(
            options.validate(),
            Err(FerryError::Configuration(_))
        ));

        let options = ImportOptions::new("data.xml", "docs");
        assert!(matches!(
            options.validate(),
            Err(FerryError::Configuration(_))
        ));
    }

    #[test]
    fn test_envelope_builder_from_options() {
        let mut options = ImportOptions::new("data.jsonl", "docs");
        options.pipeline = Some("enrich".to_string());
        let builder = options.envelope_builder();
        assert!(builder.generates_actions());
        assert_eq!(builder.pipeline(), Some("enrich"));

        options.generate_action = false;
        assert!(!options.envelope_builder().generates_actions());
    }
}
