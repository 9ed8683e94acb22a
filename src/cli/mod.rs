//! CLI module
//!
//! Command-line interface for running loads.
//!
//! # Commands
//!
//! - `init` - Create (or reset) the star schema
//! - `run` - Load song-metadata files, then activity logs
//! - `songs` - Load song-metadata files only
//! - `logs` - Load activity logs only
//! - `summary` - Row counts per table
//! - `export` - Write every table to Parquet

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
