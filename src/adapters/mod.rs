//! External system integrations for Ferry.
//!
//! - [`store`] - Document store abstraction (trait-based)
//! - [`elasticsearch`] - Elasticsearch HTTP implementation
//!
//! # Design Pattern
//!
//! Adapters isolate the HTTP client from the transfer engine so that the
//! engine can be tested against in-process doubles:
//!
//! ```rust,no_run
//! use ferry::adapters::store::create_document_store;
//! use ferry::config::ConnectionConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectionConfig {
//!     host: "search.example.com".to_string(),
//!     ..ConnectionConfig::default()
//! };
//!
//! let store = create_document_store(&config)?;
//! store.ping().await?;
//! # Ok(())
//! # }
//! ```

pub mod elasticsearch;
pub mod store;
