//! Loader configuration
//!
//! Settings come from an optional YAML file; every field has a default so an
//! empty file (or no file) is a valid configuration. Command-line flags
//! override file values.

use crate::error::{Error, Result};
use crate::pipeline::AmbiguityPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// DuckDB database file, or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,

    /// Root of the song-metadata files
    #[serde(default = "default_song_data")]
    pub song_data: PathBuf,

    /// Root of the activity log files
    #[serde(default = "default_log_data")]
    pub log_data: PathBuf,

    /// What to do when a play event matches several songs
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,

    /// Create missing tables before loading
    #[serde(default = "default_true")]
    pub create_schema: bool,
}

fn default_database() -> String {
    "sparkifydb.duckdb".to_string()
}

fn default_song_data() -> PathBuf {
    PathBuf::from("data/song_data")
}

fn default_log_data() -> PathBuf {
    PathBuf::from("data/log_data")
}

fn default_true() -> bool {
    true
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            song_data: default_song_data(),
            log_data: default_log_data(),
            ambiguity: AmbiguityPolicy::default(),
            create_schema: default_true(),
        }
    }
}

impl EtlConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Load a YAML file if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Set the database location
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the song-metadata root
    #[must_use]
    pub fn with_song_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.song_data = path.into();
        self
    }

    /// Set the activity log root
    #[must_use]
    pub fn with_log_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_data = path.into();
        self
    }

    /// Set the multiple-match policy
    #[must_use]
    pub fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::config("database cannot be empty"));
        }

        if self.song_data == self.log_data {
            return Err(Error::config(format!(
                "song_data and log_data must differ (both are '{}')",
                self.song_data.display()
            )));
        }

        Ok(())
    }
}
