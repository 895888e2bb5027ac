//! CLI interface and argument parsing
//!
//! Exit codes: 0 success, 1 some records rejected, 2 configuration error,
//! 3 policy error, 5 fatal error, 130 interrupted.

pub mod commands;

use clap::{Parser, Subcommand};

/// Procedure-driven DICOM de-identification
#[derive(Parser, Debug)]
#[command(name = "dicom-deid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "dicom-deid.toml", env = "DEID_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DEID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// De-identify DICOM JSON files
    Process(commands::process::ProcessArgs),

    /// Load a procedure and print its summary
    ValidateProcedure(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
