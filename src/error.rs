//! Error types for the Sparkify loader
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! No error is recovered locally: every variant aborts the current run.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the loader
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Input Errors
    // ============================================================================
    /// Malformed or unreadable input file
    #[error("Failed to parse '{}'{}: {message}", path.display(), line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// Expected field missing from (or mistyped in) a record
    #[error("Field '{field}' of {record} record {reason}")]
    SchemaField {
        record: &'static str,
        field: String,
        reason: String,
    },

    #[error("Failed to walk '{}': {message}", root.display())]
    Walk { root: PathBuf, message: String },

    // ============================================================================
    // Lookup Errors
    // ============================================================================
    /// More than one song/artist pair matched a play event
    #[error("{matches} songs match title '{title}' by '{artist}' with duration {duration}")]
    LookupAmbiguity {
        title: String,
        artist: String,
        duration: f64,
        matches: usize,
    },

    // ============================================================================
    // Store Errors
    // ============================================================================
    #[error("Store error: {0}")]
    Store(#[from] duckdb::Error),

    // ============================================================================
    // Orchestration Errors
    // ============================================================================
    /// A per-file handler failed; wraps the cause with the file that triggered it
    #[error("Failed to process '{}': {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error for a whole file
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    /// Create a parse error pointing at a 1-based line
    pub fn parse_line(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(record: &'static str, field: impl Into<String>) -> Self {
        Self::SchemaField {
            record,
            field: field.into(),
            reason: "is missing".to_string(),
        }
    }

    /// Create a field error for a value of the wrong shape
    pub fn invalid_field(
        record: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaField {
            record,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach the failing file to an error
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping any per-file context
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::File { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for the loader
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }
}
