//! Import: file to store
//!
//! [`ImportCoordinator`] streams an input file through the batcher and the
//! envelope builder into bulk requests. [`BulkExecutor`] resolves each
//! chunk, retrying transient item failures according to [`RetryPolicy`].

pub mod coordinator;
pub mod executor;
pub mod retry;

pub use coordinator::{ImportCoordinator, ImportOptions};
pub use executor::BulkExecutor;
pub use retry::RetryPolicy;
