//! Domain models and types for Ferry.
//!
//! The domain layer provides:
//! - **Records and outcomes** ([`Record`], [`Chunk`], [`ItemOutcome`], [`ItemFailure`])
//! - **Error types** ([`FerryError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Run-level failures are [`FerryError`]s and abort the transfer. Per-document
//! problems are [`ItemOutcome::Rejected`] values and only show up in the
//! summary:
//!
//! ```rust
//! use ferry::domain::{ItemOutcome, Result};
//!
//! fn classify(status: u16) -> Result<ItemOutcome> {
//!     Ok(if status < 300 {
//!         ItemOutcome::Accepted
//!     } else {
//!         ItemOutcome::rejected(format!("status {status}"))
//!     })
//! }
//! ```

pub mod errors;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FerryError, StoreError};
pub use record::{Chunk, ItemFailure, ItemOutcome, Record, RecordContent};
pub use result::Result;
