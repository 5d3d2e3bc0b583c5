//! Configuration management for Ferry.
//!
//! Ferry reads an optional TOML file, substitutes `${VAR}` placeholders,
//! applies `FERRY_<SECTION>_<KEY>` environment overrides and validates the
//! result. Command-line flags are applied on top by the CLI commands.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [connection]
//! host = "search.example.com"
//! port = 9200
//! username = "elastic"
//! password = "${ELASTIC_PASSWORD}"
//! ca_cert = "/etc/ferry/ca.pem"
//!
//! [transfer]
//! chunk_size = 1000
//! file_encoding = "utf-8"
//!
//! [transfer.retry]
//! max_retries = 3
//! retryable_statuses = [429, 500, 502, 503, 504]
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use ferry::config::load_or_default;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_or_default(None)?;
//! println!("Store: {}", config.connection.base_url());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_or_default};
pub use schema::{
    ApplicationConfig, ConnectionConfig, FerryConfig, LoggingConfig, RetryConfig,
    TransferConfig, MAX_CHUNK_SIZE,
};
pub use secret::{secret_string, SecretString, SecretValue};
