// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::float_cmp)]

//! # Sparkify ETL
//!
//! Loads song-metadata snapshots and user-activity logs (newline-delimited
//! JSON) into a DuckDB star schema for song-play analytics.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sparkify_etl::orchestrator::BatchOrchestrator;
//! use sparkify_etl::pipeline::Pipeline;
//! use sparkify_etl::store::DuckDbStore;
//! use std::path::Path;
//!
//! fn main() -> sparkify_etl::Result<()> {
//!     let store = DuckDbStore::open("sparkifydb.duckdb")?;
//!     store.create_schema()?;
//!
//!     let pipeline = Pipeline::default();
//!     let report = BatchOrchestrator::new(&store, &pipeline)
//!         .run(Path::new("data/song_data"), Path::new("data/log_data"))?;
//!
//!     println!("{} files loaded", report.files_processed());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      BatchOrchestrator                       │
//! │        discover *.json → handler → commit, per file          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                         ┌──────┴──────┐
//!                         │RecordSource │
//!                         └──────┬──────┘
//!                ┌───────────────┴────────────────┐
//!          song files                        log files
//!                │                      filter page = NextSong
//!      ┌─────────┴─────────┐     ┌──────────┬─────┴─────┬──────────────┐
//!      │SongDimensionLoader│     │   Time   │   User    │   Songplay   │
//!      │  songs + artists  │     │  Builder │  Loader   │   Resolver   │
//!      └─────────┬─────────┘     └────┬─────┴─────┬─────┴──────┬───────┘
//!                └────────────────────┴─────┬─────┴────────────┘
//!                                   WarehouseStore (DuckDB)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the loader
pub mod error;

/// Star schema rows and typed input records
pub mod types;

/// Loader configuration
pub mod config;

/// Newline-delimited JSON record source
pub mod decode;

/// Storage adapter and DuckDB implementation
pub mod store;

/// Per-file transform / resolve / load handlers
pub mod pipeline;

/// File discovery and per-file commits
pub mod orchestrator;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::EtlConfig;
pub use orchestrator::{BatchOrchestrator, BatchReport, RunReport};
pub use pipeline::{AmbiguityPolicy, FileKind, Pipeline};
pub use store::{DuckDbStore, WarehouseStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
