//! CLI command implementations
//!
//! Each command applies its flags on top of the loaded configuration,
//! validates the result and runs one transfer. The summary goes to stderr
//! because stdout may carry documents.

pub mod export;
pub mod import;
pub mod validate;

use crate::config::{secret_string, ConnectionConfig, FerryConfig};
use crate::core::encoding::{self, FileEncoding};
use crate::core::summary::RunSummary;
use crate::domain::{FerryError, Result};
use clap::Args;

/// Store connection flags shared by `import` and `export`
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Store host name
    #[arg(long)]
    pub host: Option<String>,

    /// Store port
    #[arg(long)]
    pub port: Option<u16>,

    /// User name for basic authentication
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(short, long, env = "FERRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long)]
    pub insecure: bool,

    /// PEM file with the CA certificate that signed the store's certificate
    #[arg(long, value_name = "PATH")]
    pub ca_cert: Option<String>,
}

impl ConnectionArgs {
    /// Apply the flags that were given onto `config`
    pub fn apply(&self, config: &mut ConnectionConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = Some(secret_string(password.clone()));
        }
        if self.insecure {
            config.use_tls = false;
        }
        if let Some(ca_cert) = &self.ca_cert {
            config.ca_cert = Some(ca_cert.clone());
        }
    }
}

/// Validate the merged configuration and resolve its file encoding
pub(crate) fn prepare(config: &FerryConfig) -> Result<FileEncoding> {
    config.validate().map_err(|e| {
        FerryError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    encoding::resolve(&config.transfer.file_encoding)
}

/// Print the outcome of a run and pick the exit code
pub(crate) fn report(outcome: Result<RunSummary>) -> i32 {
    match outcome {
        Ok(summary) => {
            eprintln!();
            eprint!("{}", summary.render());
            summary.exit_code()
        }
        Err(e) => fail(&e),
    }
}

/// Print a run-level error and pick the exit code
pub(crate) fn fail(error: &FerryError) -> i32 {
    crate::log_error_with_context!(error, "Transfer aborted");
    eprintln!("Error: {error}");
    error.exit_code()
}
