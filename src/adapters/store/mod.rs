//! Document store abstraction layer
//!
//! The transfer engine only sees [`DocumentStore`]; which client backs it is
//! decided by the factory.

pub mod factory;
pub mod traits;

pub use factory::create_document_store;
pub use traits::{BulkItemStatus, DocumentStore, ScrollPage, StoreResult};
