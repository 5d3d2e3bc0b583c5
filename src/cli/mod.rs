//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Ferry using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_codes {
    /// Every record accepted, or a dry run
    pub const SUCCESS: i32 = 0;

    /// Finished with item-level failures
    pub const PARTIAL_FAILURE: i32 = 1;

    /// Configuration or argument error
    pub const CONFIGURATION: i32 = 2;

    /// Store unreachable or credentials refused
    pub const CONNECTION: i32 = 4;

    /// Any other run-level failure
    pub const FATAL: i32 = 5;

    /// Stopped by SIGINT/SIGTERM (standard Unix convention)
    pub const INTERRUPTED: i32 = 130;
}

/// Ferry - streaming bulk import and scroll export for Elasticsearch
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(version, about, long_about = None)]
#[command(author = "Ferry Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./ferry.toml when present)
    #[arg(long, global = true, env = "FERRY_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FERRY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a JSON lines or CSV file into an index
    Import(commands::import::ImportArgs),

    /// Export the results of a query to a file
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
