//! Export: store to file
//!
//! [`ExportCoordinator`] pages through a scroll query with [`ScrollSource`]
//! and writes one line per document to an [`OutputSink`].

pub mod coordinator;
pub mod scroll;
pub mod sink;

pub use coordinator::{read_query, ExportCoordinator, ExportOptions};
pub use scroll::ScrollSource;
pub use sink::OutputSink;
