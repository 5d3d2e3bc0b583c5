//! Core transfer engine for Ferry.
//!
//! Both directions share the same shape: a lazy record sequence is cut into
//! chunks, every chunk is resolved completely, and the outcome is folded
//! into a single run summary.
//!
//! # Modules
//!
//! - [`source`] - Line-delimited (plain or compressed) and CSV record sources
//! - [`encoding`] - File encoding resolution and conversion
//! - [`batch`] - Fixed-size chunking of a record sequence
//! - [`envelope`] - Bulk action lines and export projections
//! - [`import`] - Bulk submission with item-level retry
//! - [`export`] - Scroll paging into an output sink
//! - [`transform`] - Post-process filters for exported documents
//! - [`summary`] - Run accounting and the final report
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry::adapters::store::create_document_store;
//! use ferry::config::load_or_default;
//! use ferry::core::import::{ImportCoordinator, ImportOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_or_default(None)?;
//! let store = create_document_store(&config.connection)?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let options = ImportOptions::new("people.jsonl", "people");
//! let summary = ImportCoordinator::new(options, store, shutdown_rx)
//!     .execute()
//!     .await?;
//!
//! println!("Succeeded: {}", summary.succeeded);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod encoding;
pub mod envelope;
pub mod export;
pub mod import;
pub mod source;
pub mod summary;
pub mod transform;
