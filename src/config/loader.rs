//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FerryConfig;
use super::secret_string;
use crate::domain::errors::FerryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Configuration file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "ferry.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FerryConfig
/// 4. Applies environment variable overrides (FERRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use ferry::config::loader::load_config;
///
/// let config = load_config("ferry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FerryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FerryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FerryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: FerryConfig = toml::from_str(&contents)
        .map_err(|e| FerryError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads the configuration the CLI should run with
///
/// An explicit path must exist. Without one, `ferry.toml` in the working
/// directory is used when present, otherwise the built-in defaults. In every
/// case `FERRY_*` overrides are applied and the result is validated.
pub fn load_or_default(path: Option<&str>) -> Result<FerryConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => {
            tracing::debug!("No configuration file found, using defaults");
            finish(FerryConfig::default())
        }
    }
}

fn finish(mut config: FerryConfig) -> Result<FerryConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FerryError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FerryError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        // Comment lines are copied verbatim
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FerryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the FERRY_* prefix
///
/// Environment variables follow the pattern FERRY_<SECTION>_<KEY>, for
/// example FERRY_CONNECTION_HOST or FERRY_TRANSFER_CHUNK_SIZE.
fn apply_env_overrides(config: &mut FerryConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("FERRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Connection overrides
    if let Ok(val) = std::env::var("FERRY_CONNECTION_HOST") {
        config.connection.host = val;
    }
    if let Ok(val) = std::env::var("FERRY_CONNECTION_PORT") {
        config.connection.port = parse_override("FERRY_CONNECTION_PORT", &val)?;
    }
    if let Ok(val) = std::env::var("FERRY_CONNECTION_USERNAME") {
        config.connection.username = val;
    }
    if let Ok(val) = std::env::var("FERRY_CONNECTION_PASSWORD") {
        config.connection.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("FERRY_CONNECTION_USE_TLS") {
        config.connection.use_tls = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FERRY_CONNECTION_CA_CERT") {
        config.connection.ca_cert = Some(val);
    }

    // Transfer overrides
    if let Ok(val) = std::env::var("FERRY_TRANSFER_CHUNK_SIZE") {
        config.transfer.chunk_size = parse_override("FERRY_TRANSFER_CHUNK_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("FERRY_TRANSFER_FILE_ENCODING") {
        config.transfer.file_encoding = val;
    }
    if let Ok(val) = std::env::var("FERRY_TRANSFER_RETRY_MAX_RETRIES") {
        config.transfer.retry.max_retries =
            parse_override("FERRY_TRANSFER_RETRY_MAX_RETRIES", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FERRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FERRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        FerryError::Configuration(format!("Invalid value for {name}: '{value}'"))
    })
}
