//! Data file discovery

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Whether a file name is a loadable data file
///
/// Names must end in `.json` (case-sensitive) and must not be hidden.
pub fn is_data_file(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    !name.starts_with('.') && name.ends_with(".json")
}

/// Every data file below `root`, as absolute paths
///
/// Traversal is depth-first with the entries of each directory sorted by
/// file name, so the order is stable across runs and platforms. Hidden
/// directories are still descended.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::Walk {
            root: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let root = root.canonicalize()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Walk {
            root: root.clone(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() && is_data_file(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Discovered {} data files under {}", files.len(), root.display());
    Ok(files)
}
