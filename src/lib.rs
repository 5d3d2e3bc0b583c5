// Ferry - Streaming bulk import and scroll export for Elasticsearch
// Copyright (c) 2025 Ferry Contributors
// Licensed under the MIT License

//! # Ferry - bulk import and scroll export for Elasticsearch
//!
//! Ferry moves documents between flat files and an Elasticsearch cluster
//! without loading either side into memory.
//!
//! ## Overview
//!
//! - **Import** streams a JSON lines (plain or compressed) or CSV file into an
//!   index, one `_bulk` request per chunk, retrying transient item failures
//! - **Export** pages through the results of a query with the scroll API and
//!   writes one line per document, optionally piped through a shell command
//! - **Both** report accepted, rejected and skipped records in a final
//!   summary and map the outcome to a process exit code
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Transfer engine (sources, batching, envelopes, import, export)
//! - [`adapters`] - Document store trait and the Elasticsearch HTTP client
//! - [`domain`] - Records, item outcomes and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferry::adapters::store::create_document_store;
//! use ferry::config::load_or_default;
//! use ferry::core::export::{ExportCoordinator, ExportOptions};
//! use ferry::core::transform::JsonSerializer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_or_default(None)?;
//!     let store = create_document_store(&config.connection)?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let mut options = ExportOptions::new("query.json");
//!     options.index = Some("logs-*".to_string());
//!     options.output = Some("logs.jsonl".into());
//!
//!     let summary = ExportCoordinator::new(options, store, Arc::new(JsonSerializer), shutdown_rx)
//!         .execute()
//!         .await?;
//!
//!     println!("Exported {} documents", summary.succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Run-level failures are [`domain::FerryError`] values and abort the
//! transfer. Problems with a single document never do; they are counted in
//! the [`core::summary::RunSummary`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
