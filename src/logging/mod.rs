//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output on stderr
//! - Configurable log levels
//! - JSON log files with rotation
//!
//! Stdout is never used for logs; it carries exported documents and dry-run
//! requests.
//!
//! # Example
//!
//! ```no_run
//! use ferry::logging::init_logging;
//! use ferry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the outcome of one processed chunk
///
/// # Example
///
/// ```no_run
/// use ferry::log_chunk_processed;
///
/// log_chunk_processed!(3, 2001, 1000, 998, 2);
/// ```
#[macro_export]
macro_rules! log_chunk_processed {
    ($chunk:expr, $first_ordinal:expr, $records:expr, $accepted:expr, $failed:expr) => {
        tracing::info!(
            chunk = $chunk,
            first_record = $first_ordinal,
            records = $records,
            accepted = $accepted,
            failed = $failed,
            "Chunk processed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ferry::log_error_with_context;
/// use ferry::domain::FerryError;
///
/// let error = FerryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use ferry::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "429 es_rejected_execution_exception");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
