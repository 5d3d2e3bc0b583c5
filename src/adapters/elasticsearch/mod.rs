//! Elasticsearch adapter
//!
//! Implements [`DocumentStore`](crate::adapters::store::DocumentStore) over
//! the REST API: `_bulk` for import, `_search?scroll` for export.

pub mod client;
pub mod models;

pub use client::ElasticsearchClient;
