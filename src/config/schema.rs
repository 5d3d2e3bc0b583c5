//! Configuration schema types
//!
//! This module defines the configuration structure for Ferry. Every section
//! has defaults, so an empty file (or no file at all) is a valid
//! configuration.

use crate::config::SecretString;
use crate::core::encoding;
use serde::{Deserialize, Serialize};

/// Main Ferry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FerryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Document store connection
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Chunking, encoding and retry settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FerryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.connection.validate()?;
        self.transfer.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Document store connection settings
///
/// These are handed to the HTTP client unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Store host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Store port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for basic authentication
    #[serde(default = "default_username")]
    pub username: String,

    /// Password for basic authentication; no auth header is sent without it
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Use HTTPS (disable with `--insecure`)
    #[serde(default = "default_true")]
    pub use_tls: bool,

    /// Optional CA certificate (PEM) for self-signed or private CAs
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ConnectionConfig {
    /// URL scheme derived from `use_tls`
    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL of the store, e.g. `https://localhost:9200`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.host.trim().is_empty() {
            return Err("connection.host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("connection.port must be between 1 and 65535".to_string());
        }

        let has_password = self
            .password
            .as_ref()
            .map(|p| !p.expose_secret().is_empty())
            .unwrap_or(false);
        if has_password && self.username.trim().is_empty() {
            return Err("Username and password must be provided together".to_string());
        }

        if self.ca_cert.is_some() && !self.use_tls {
            return Err("CA certificate can only be used with HTTPS".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("connection.timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: None,
            use_tls: true,
            ca_cert: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Transfer engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Records per bulk request (import) or page size (export)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Text encoding of input and output files (WHATWG label)
    #[serde(default = "default_file_encoding")]
    pub file_encoding: String,

    /// How long the store keeps a scroll cursor alive between pages
    #[serde(default = "default_scroll_keep_alive")]
    pub scroll_keep_alive: String,

    /// Upper bound for one post-process filter invocation
    #[serde(default = "default_post_process_timeout_seconds")]
    pub post_process_timeout_seconds: u64,

    /// Retry policy for import items
    #[serde(default)]
    pub retry: RetryConfig,
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(format!(
                "transfer.chunk_size must be between 1 and {MAX_CHUNK_SIZE}, got {}",
                self.chunk_size
            ));
        }

        encoding::resolve(&self.file_encoding).map_err(|e| e.to_string())?;

        if self.scroll_keep_alive.trim().is_empty() {
            return Err("transfer.scroll_keep_alive cannot be empty".to_string());
        }

        if self.post_process_timeout_seconds == 0 {
            return Err(
                "transfer.post_process_timeout_seconds must be greater than 0".to_string(),
            );
        }

        self.retry.validate()
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            file_encoding: default_file_encoding(),
            scroll_keep_alive: default_scroll_keep_alive(),
            post_process_timeout_seconds: default_post_process_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration
///
/// `retryable_statuses` is the documented boundary between transient and
/// permanent item failures: a status in this list is retried, any other
/// non-2xx status is a rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of resubmissions per chunk
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// HTTP statuses treated as transient
    #[serde(default = "default_retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 100 {
            return Err(format!(
                "transfer.retry.max_retries must be at most 100, got {}",
                self.max_retries
            ));
        }

        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "transfer.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "transfer.retry.initial_delay_ms ({}) cannot exceed max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }

        if let Some(status) = self
            .retryable_statuses
            .iter()
            .find(|s| !(400..=599).contains(*s))
        {
            return Err(format!(
                "transfer.retry.retryable_statuses may only contain 4xx/5xx codes, got {status}"
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            retryable_statuses: default_retryable_statuses(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rotating files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Upper bound for `transfer.chunk_size`
pub const MAX_CHUNK_SIZE: usize = 100_000;

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_username() -> String {
    "elastic".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_chunk_size() -> usize {
    1000
}

fn default_file_encoding() -> String {
    "utf-8".to_string()
}

fn default_scroll_keep_alive() -> String {
    "20m".to_string()
}

fn default_post_process_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retryable_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_default_values() {
        let config = FerryConfig::default();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.connection.username, "elastic");
        assert!(config.connection.use_tls);
        assert_eq!(config.transfer.chunk_size, 1000);
        assert_eq!(config.transfer.file_encoding, "utf-8");
        assert_eq!(config.transfer.scroll_keep_alive, "20m");
        assert_eq!(config.transfer.retry.max_retries, 3);
        assert_eq!(
            config.transfer.retry.retryable_statuses,
            vec![429, 500, 502, 503, 504]
        );
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url() {
        let mut connection = ConnectionConfig::default();
        assert_eq!(connection.base_url(), "https://localhost:9200");

        connection.use_tls = false;
        connection.host = "es.internal".to_string();
        connection.port = 9201;
        assert_eq!(connection.base_url(), "http://es.internal:9201");
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ca_cert_requires_tls() {
        let connection = ConnectionConfig {
            use_tls: false,
            ca_cert: Some("/etc/ssl/ca.pem".to_string()),
            ..ConnectionConfig::default()
        };
        let err = connection.validate().unwrap_err();
        assert!(err.contains("HTTPS"));
    }

    #[test]
    fn test_password_requires_username() {
        let connection = ConnectionConfig {
            username: String::new(),
            password: Some(secret_string("secret".to_string())),
            ..ConnectionConfig::default()
        };
        assert!(connection.validate().is_err());

        let connection = ConnectionConfig {
            password: Some(secret_string("secret".to_string())),
            ..ConnectionConfig::default()
        };
        assert!(connection.validate().is_ok());
    }

    #[test]
    fn test_transfer_config_validation() {
        let mut config = TransferConfig::default();
        assert!(config.validate().is_ok());

        config.chunk_size = 0;
        assert!(config.validate().is_err());

        config.chunk_size = MAX_CHUNK_SIZE + 1;
        assert!(config.validate().is_err());

        config.chunk_size = 500;
        config.file_encoding = "klingon".to_string();
        assert!(config.validate().is_err());

        config.file_encoding = "utf-16le".to_string();
        assert!(config.validate().is_err());

        config.file_encoding = "latin1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_validation() {
        let mut config = RetryConfig::default();
        assert!(config.validate().is_ok());

        config.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.backoff_multiplier = 2.0;
        config.initial_delay_ms = 60_000;
        assert!(config.validate().is_err());

        config.initial_delay_ms = 100;
        config.retryable_statuses = vec![200];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FerryConfig = toml::from_str(
            r#"
[connection]
host = "search.example.com"

[transfer.retry]
max_retries = 5
"#,
        )
        .unwrap();

        assert_eq!(config.connection.host, "search.example.com");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.transfer.chunk_size, 1000);
        assert_eq!(config.transfer.retry.max_retries, 5);
        assert_eq!(config.transfer.retry.initial_delay_ms, 1000);
    }
}
