//! Run reports

use crate::pipeline::{FileKind, FileStats};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Progress of one batch (one data root)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub kind: FileKind,
    pub root: PathBuf,
    pub files_found: usize,
    pub files_processed: usize,
    /// Rows written, summed over every committed file
    pub stats: FileStats,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn new(kind: FileKind, root: &Path) -> Self {
        Self {
            kind,
            root: root.to_path_buf(),
            files_found: 0,
            files_processed: 0,
            stats: FileStats::default(),
            duration_ms: 0,
        }
    }

    /// Account for one committed file
    pub fn record(&mut self, stats: FileStats) {
        self.files_processed += 1;
        self.stats += stats;
    }
}

/// Every batch of a run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    pub fn push(&mut self, batch: BatchReport) {
        self.batches.push(batch);
    }

    /// Files processed across all batches
    pub fn files_processed(&self) -> usize {
        self.batches.iter().map(|b| b.files_processed).sum()
    }

    /// Row counters across all batches
    pub fn totals(&self) -> FileStats {
        let mut totals = FileStats::default();
        for batch in &self.batches {
            totals += batch.stats;
        }
        totals
    }
}
