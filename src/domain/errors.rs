//! Domain error types
//!
//! This module defines the error hierarchy for Ferry. Errors here are
//! run-level: item-level problems (a rejected document, an undecodable line)
//! are recorded as [`ItemOutcome`](crate::domain::ItemOutcome)s and never
//! surface as `FerryError`.

use crate::cli::exit_codes;
use thiserror::Error;

/// Main Ferry error type
///
/// Every variant aborts the run. [`FerryError::exit_code`] maps each one to
/// the process exit code reported by the CLI.
#[derive(Debug, Error)]
pub enum FerryError {
    /// Configuration or argument errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input file cannot be opened or read
    #[error("Input error: {0}")]
    Input(String),

    /// The query file is unreadable or the store refused the query
    #[error("Query error: {0}")]
    Query(String),

    /// The output file cannot be created or written
    #[error("Output error: {0}")]
    Output(String),

    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl FerryError {
    /// Process exit code for this error
    ///
    /// Configuration problems exit with 2, an unreachable or refusing store
    /// with 4, everything else with 5.
    pub fn exit_code(&self) -> i32 {
        match self {
            FerryError::Configuration(_) => exit_codes::CONFIGURATION,
            FerryError::Store(
                StoreError::ConnectionFailed(_)
                | StoreError::Timeout(_)
                | StoreError::Authentication { .. },
            ) => exit_codes::CONNECTION,
            _ => exit_codes::FATAL,
        }
    }
}

/// Document store errors
///
/// Errors that occur when talking to the store over HTTP.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Credentials refused (401/403)
    #[error("Authentication failed: {status} - {message}")]
    Authentication { status: u16, message: String },

    /// Rate limited (429)
    #[error("Rate limited: {0}")]
    Throttled(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx other than auth and rate limiting)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Build the error matching a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => StoreError::Authentication { status, message },
            429 => StoreError::Throttled(message),
            500..=599 => StoreError::ServerError { status, message },
            _ => StoreError::ClientError { status, message },
        }
    }

    /// HTTP status carried by the error, if the store answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Authentication { status, .. }
            | StoreError::ServerError { status, .. }
            | StoreError::ClientError { status, .. } => Some(*status),
            StoreError::Throttled(_) => Some(429),
            StoreError::ConnectionFailed(_)
            | StoreError::Timeout(_)
            | StoreError::InvalidResponse(_) => None,
        }
    }

    /// Whether the request never got a usable answer (network-level failure)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectionFailed(_) | StoreError::Timeout(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FerryError {
    fn from(err: std::io::Error) -> Self {
        FerryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FerryError {
    fn from(err: serde_json::Error) -> Self {
        FerryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FerryError {
    fn from(err: toml::de::Error) -> Self {
        FerryError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ferry_error_display() {
        let err = FerryError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::ConnectionFailed("refused".to_string());
        let err: FerryError = store_err.into();
        assert!(matches!(err, FerryError::Store(_)));
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            StoreError::from_status(401, "no"),
            StoreError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            StoreError::from_status(403, "no"),
            StoreError::Authentication { status: 403, .. }
        ));
        assert!(matches!(
            StoreError::from_status(429, "slow down"),
            StoreError::Throttled(_)
        ));
        assert!(matches!(
            StoreError::from_status(503, "busy"),
            StoreError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            StoreError::from_status(400, "bad"),
            StoreError::ClientError { status: 400, .. }
        ));
    }

    #[test]
    fn test_status_and_transport() {
        assert_eq!(StoreError::Throttled("x".into()).status(), Some(429));
        assert_eq!(StoreError::Timeout("x".into()).status(), None);
        assert!(StoreError::Timeout("x".into()).is_transport());
        assert!(!StoreError::from_status(500, "x").is_transport());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(FerryError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(
            FerryError::Store(StoreError::ConnectionFailed("x".into())).exit_code(),
            4
        );
        assert_eq!(
            FerryError::Store(StoreError::from_status(401, "x")).exit_code(),
            4
        );
        assert_eq!(FerryError::Query("bad query".into()).exit_code(), 5);
        assert_eq!(FerryError::Input("missing".into()).exit_code(), 5);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: FerryError = io_err.into();
        assert!(matches!(err, FerryError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: FerryError = toml_err.into();
        assert!(matches!(err, FerryError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
