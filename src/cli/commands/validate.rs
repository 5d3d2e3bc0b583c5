//! Validate config command implementation
//!
//! This module implements the `validate-config` command for checking the
//! configuration file, environment overrides included.

use crate::cli::exit_codes;
use crate::config::load_or_default;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let shown_path = config_path.unwrap_or("ferry.toml (if present)");
        tracing::info!(config_path = %shown_path, "Validating configuration");

        println!("🔍 Validating configuration: {shown_path}");
        println!();

        let config = match load_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        let has_password = config
            .connection
            .password
            .as_ref()
            .map(|p| !p.expose_secret().is_empty())
            .unwrap_or(false);

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Store: {}", config.connection.base_url());
        println!(
            "  Username: {}",
            if config.connection.username.is_empty() {
                "(none)"
            } else {
                config.connection.username.as_str()
            }
        );
        println!("  Password: {}", if has_password { "***" } else { "(none)" });
        if let Some(ca_cert) = &config.connection.ca_cert {
            println!("  CA Certificate: {ca_cert}");
        }
        println!("  Chunk Size: {}", config.transfer.chunk_size);
        println!("  File Encoding: {}", config.transfer.file_encoding);
        println!("  Scroll Keep-Alive: {}", config.transfer.scroll_keep_alive);
        println!("  Max Retries: {}", config.transfer.retry.max_retries);
        println!(
            "  Retryable Statuses: {:?}",
            config.transfer.retry.retryable_statuses
        );
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(exit_codes::SUCCESS)
    }
}
