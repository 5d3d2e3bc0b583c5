//! Import command implementation
//!
//! This module implements the `import` command: stream a JSON lines file
//! (plain or compressed) or a CSV file into an index through the bulk API.

use super::{fail, prepare, report, ConnectionArgs};
use crate::adapters::store::create_document_store;
use crate::config::FerryConfig;
use crate::core::import::{ImportCoordinator, ImportOptions, RetryPolicy};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Input file (.json, .jsonl, .ndjson, .gz, .bz2, .xz, .zip or .csv)
    pub file: PathBuf,

    /// Target index
    pub index: String,

    /// Text encoding of the input file
    #[arg(long, value_name = "ENCODING")]
    pub file_encoding: Option<String>,

    /// Ingest pipeline to route documents through
    #[arg(long)]
    pub pipeline: Option<String>,

    /// The file already contains action lines
    #[arg(long)]
    pub no_generate_action: bool,

    /// Dotted path of the field used as document id
    #[arg(long, value_name = "PATH")]
    pub id_field: Option<String>,

    /// Records per bulk request
    #[arg(short, long)]
    pub chunk_size: Option<usize>,

    /// Resubmissions per chunk for transient item failures
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Print the bulk requests instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl ImportArgs {
    /// Apply the flags that were given onto `config`
    pub fn apply(&self, config: &mut FerryConfig) {
        self.connection.apply(&mut config.connection);
        if let Some(file_encoding) = &self.file_encoding {
            config.transfer.file_encoding = file_encoding.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.transfer.chunk_size = chunk_size;
        }
        if let Some(max_retries) = self.max_retries {
            config.transfer.retry.max_retries = max_retries;
        }
    }

    /// Execute the import command
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

        let mut options = ImportOptions::new(&self.file, &self.index);
        options.pipeline = self.pipeline.clone();
        options.generate_action = !self.no_generate_action;
        options.id_field = self.id_field.clone();
        options.chunk_size = config.transfer.chunk_size;
        options.encoding = encoding;
        options.dry_run = self.dry_run;
        options.retry = RetryPolicy::from_config(&config.transfer.retry);

        if let Err(e) = options.validate() {
            return Ok(fail(&e));
        }

        if self.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be sent to the store");
        }

        let store = match create_document_store(&config.connection) {
            Ok(store) => store,
            Err(e) => return Ok(fail(&e)),
        };

        let outcome = ImportCoordinator::new(options, store, shutdown_signal)
            .execute()
            .await;
        Ok(report(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::exit_codes;

    fn args(file: &str) -> ImportArgs {
        ImportArgs {
            file: PathBuf::from(file),
            index: "people".to_string(),
            file_encoding: None,
            pipeline: None,
            no_generate_action: false,
            id_field: None,
            chunk_size: None,
            max_retries: None,
            dry_run: false,
            connection: ConnectionArgs::default(),
        }
    }

    #[test]
    fn test_import_args_override_transfer() {
        let mut import = args("people.jsonl");
        import.file_encoding = Some("latin1".to_string());
        import.chunk_size = Some(250);
        import.max_retries = Some(0);

        let mut config = FerryConfig::default();
        import.apply(&mut config);
        assert_eq!(config.transfer.file_encoding, "latin1");
        assert_eq!(config.transfer.chunk_size, 250);
        assert_eq!(config.transfer.retry.max_retries, 0);
    }

    #[tokio::test]
    async fn test_id_field_without_actions_is_configuration_error() {
        let mut import = args("people.jsonl");
        import.no_generate_action = true;
        import.id_field = Some("id".to_string());

        let (_tx, rx) = watch::channel(false);
        let code = import.execute(FerryConfig::default(), rx).await.unwrap();
        assert_eq!(code, exit_codes::CONFIGURATION);
    }

    #[tokio::test]
    async fn test_chunk_size_out_of_range() {
        let mut import = args("people.jsonl");
        import.chunk_size = Some(0);

        let (_tx, rx) = watch::channel(false);
        let code = import.execute(FerryConfig::default(), rx).await.unwrap();
        assert_eq!(code, exit_codes::CONFIGURATION);
    }

    #[tokio::test]
    async fn test_dry_run_of_missing_file_is_fatal() {
        let mut import = args("/nonexistent/people.jsonl");
        import.dry_run = true;

        let (_tx, rx) = watch::channel(false);
        let code = import.execute(FerryConfig::default(), rx).await.unwrap();
        assert_eq!(code, exit_codes::FATAL);
    }
}
