//! Export command implementation
//!
//! This module implements the `export` command: run a query through the
//! scroll API and write one line per document to a file or stdout.

use super::{fail, prepare, report, ConnectionArgs};
use crate::adapters::store::create_document_store;
use crate::config::FerryConfig;
use crate::core::export::{ExportCoordinator, ExportOptions};
use crate::core::transform::{DocumentTransform, JsonSerializer, ShellCommand};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// File with the JSON query body, `-` for stdin
    pub query_file: PathBuf,

    /// Shell command each document is piped through
    #[arg(long, value_name = "CMD")]
    pub post_process: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long = "out", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Export complete hits instead of only `_source`
    #[arg(long)]
    pub full: bool,

    /// Text encoding of the output
    #[arg(long, value_name = "ENCODING")]
    pub file_encoding: Option<String>,

    /// Hits per scroll page
    #[arg(short, long)]
    pub chunk_size: Option<usize>,

    /// Index or index pattern to search (all indices when omitted)
    #[arg(short, long)]
    pub index: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl ExportArgs {
    /// Apply the flags that were given onto `config`
    pub fn apply(&self, config: &mut FerryConfig) {
        self.connection.apply(&mut config.connection);
        if let Some(file_encoding) = &self.file_encoding {
            config.transfer.file_encoding = file_encoding.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.transfer.chunk_size = chunk_size;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        mut config: FerryConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        self.apply(&mut config);
        let encoding = match prepare(&config) {
            Ok(encoding) => encoding,
            Err(e) => return Ok(fail(&e)),
        };

        let transform: Arc<dyn DocumentTransform> = match &self.post_process {
            Some(command) => {
                tracing::info!(command = %command, "Post-processing documents");
                Arc::new(ShellCommand::new(
                    command.clone(),
                    Duration::from_secs(config.transfer.post_process_timeout_seconds),
                    encoding,
                ))
            }
            None => Arc::new(JsonSerializer),
        };

        let mut options = ExportOptions::new(&self.query_file);
        options.index = self.index.clone();
        options.output = self.output.clone();
        options.full = self.full;
        options.chunk_size = config.transfer.chunk_size;
        options.encoding = encoding;
        options.keep_alive = config.transfer.scroll_keep_alive.clone();

        let store = match create_document_store(&config.connection) {
            Ok(store) => store,
            Err(e) => return Ok(fail(&e)),
        };

        let outcome = ExportCoordinator::new(options, store, transform, shutdown_signal)
            .execute()
            .await;
        Ok(report(outcome))
    }
}
