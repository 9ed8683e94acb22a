//! CLI commands and argument parsing

use crate::pipeline::AmbiguityPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sparkify star-schema loader
#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// DuckDB database file (`:memory:` for a throwaway database)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Multiple-match policy for songplay lookups
    #[arg(long, global = true, value_enum)]
    pub ambiguity: Option<AmbiguityPolicy>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the star schema
    Init {
        /// Drop every table first
        #[arg(long)]
        reset: bool,
    },

    /// Load song-metadata files, then activity logs
    Run {
        /// Root of the song-metadata files
        #[arg(long)]
        song_data: Option<PathBuf>,

        /// Root of the activity log files
        #[arg(long)]
        log_data: Option<PathBuf>,
    },

    /// Load song-metadata files only
    Songs {
        /// Root of the song-metadata files (defaults to the configured one)
        path: Option<PathBuf>,
    },

    /// Load activity log files only
    Logs {
        /// Root of the activity log files (defaults to the configured one)
        path: Option<PathBuf>,
    },

    /// Show row counts per table
    Summary,

    /// Export every table to Parquet
    Export {
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
