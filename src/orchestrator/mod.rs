//! Batch orchestration
//!
//! Walks a data root, runs the per-file handler on every `.json` file and
//! commits after each one.
//!
//! # Failure model
//!
//! Each file is one unit of work: its writes are committed together after
//! the handler succeeds, or rolled back if it fails. Files committed before
//! a failure stay committed. The first failure halts the batch; later files
//! are not attempted.

mod discovery;
mod types;

pub use discovery::{discover_files, is_data_file};
pub use types::{BatchReport, RunReport};

use crate::error::Result;
use crate::pipeline::{FileKind, FileStats, Pipeline};
use crate::store::WarehouseStore;
use std::path::Path;
use std::time::Instant;

/// Sequential file-by-file loader
pub struct BatchOrchestrator<'a> {
    store: &'a dyn WarehouseStore,
    pipeline: &'a Pipeline,
}

impl<'a> BatchOrchestrator<'a> {
    /// Create an orchestrator writing through `store`
    pub fn new(store: &'a dyn WarehouseStore, pipeline: &'a Pipeline) -> Self {
        Self { store, pipeline }
    }

    /// Load every file of one family under `root`
    pub fn process_data(&self, root: &Path, kind: FileKind) -> Result<BatchReport> {
        self.process_with(root, kind, |path| {
            self.pipeline.process_file(kind, self.store, path)
        })
    }

    /// Run `handler` on every data file under `root`, one unit of work each
    pub fn process_with<F>(&self, root: &Path, kind: FileKind, mut handler: F) -> Result<BatchReport>
    where
        F: FnMut(&Path) -> Result<FileStats>,
    {
        let start = Instant::now();
        let files = discover_files(root)?;
        let total = files.len();

        tracing::info!("{} files found in {}", total, root.display());

        let mut report = BatchReport::new(kind, root);
        report.files_found = total;

        for (i, path) in files.iter().enumerate() {
            let stats = self
                .run_unit(path, &mut handler)
                .map_err(|e| e.in_file(path))?;
            report.record(stats);

            tracing::info!("{}/{} files processed.", i + 1, total);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Song-metadata files first, then activity logs
    pub fn run(&self, song_root: &Path, log_root: &Path) -> Result<RunReport> {
        let mut report = RunReport::default();
        report.push(self.process_data(song_root, FileKind::Song)?);
        report.push(self.process_data(log_root, FileKind::Log)?);
        Ok(report)
    }

    fn run_unit<F>(&self, path: &Path, handler: &mut F) -> Result<FileStats>
    where
        F: FnMut(&Path) -> Result<FileStats>,
    {
        self.store.begin()?;

        match handler(path) {
            Ok(stats) => {
                self.store.commit()?;
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::warn!(
                        "Rollback after failure in {} failed: {}",
                        path.display(),
                        rollback_err
                    );
                }
                Err(e)
            }
        }
    }
}
