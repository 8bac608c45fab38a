//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Bindery using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Bindery - wiki to PDF exporter
#[derive(Parser, Debug)]
#[command(name = "bindery")]
#[command(version, about, long_about = None)]
#[command(author = "Bindery Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bindery.toml", env = "BINDERY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BINDERY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the wiki into a single merged PDF
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show merged documents and leftover temporary files
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
