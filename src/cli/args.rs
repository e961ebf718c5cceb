//! Command line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Backup Janitor - Clean up old and broken backup generations
#[derive(Parser, Debug)]
#[command(name = "backup-janitor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what would be cleaned up, without touching anything
    DryRun {
        /// Only run this profile
        #[arg(short, long, value_name = "NAME")]
        profile: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Clean up the selected generations
    Cleanup {
        /// Only run this profile
        #[arg(short, long, value_name = "NAME")]
        profile: Option<String>,
    },

    /// Print version information
    Version,
}

/// Output format for dry runs.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
