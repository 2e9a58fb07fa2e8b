//! Filesystem primitives shared by every store operation: a filtered,
//! flattening copy and a files-only delete. Both keep going after a
//! per-file failure and record it in their report.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

impl FileFailure {
    fn new(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    /// File names written into the destination, in walk order.
    pub copied: Vec<String>,
    /// Regular files that did not match the predicate.
    pub skipped: usize,
    pub failed: Vec<FileFailure>,
}

impl CopyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub removed: usize,
    /// Nested directories that were left in place.
    pub kept_dirs: Vec<PathBuf>,
    pub failed: Vec<FileFailure>,
    pub snapshot_removed: bool,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.snapshot_removed
    }
}

// Creates `dir` (and parents) if it is not there yet.
pub fn ensure_dir(dir: &Path) -> Result<bool, StoreError> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    Ok(true)
}

/// Copies every regular file below `src` (any depth) whose name passes
/// `keep` directly into `dst`, overwriting files of the same name.
///
/// Subdirectories are walked but not recreated, so the result is flat.
/// Files are visited in file-name order; when two files in different
/// subdirectories share a name, the one visited last wins. If `dst` lies
/// inside `src` it is not walked.
pub fn copy_matching<F>(src: &Path, dst: &Path, keep: F) -> Result<CopyReport, StoreError>
where
    F: Fn(&str) -> bool,
{
    fs::metadata(src).map_err(|e| StoreError::io(src, e))?;
    ensure_dir(dst)?;

    let mut report = CopyReport::default();
    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != dst);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
                warn!("skipping {}: {}", path.display(), e);
                report.failed.push(FileFailure::new(path, e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            report.skipped += 1;
            continue;
        };
        if !keep(name) {
            report.skipped += 1;
            continue;
        }
        let target = dst.join(name);
        match fs::copy(entry.path(), &target) {
            Ok(_) => {
                debug!("copied {} -> {}", entry.path().display(), target.display());
                report.copied.push(name.to_string());
            }
            Err(e) => {
                warn!("failed to copy {}: {}", entry.path().display(), e);
                report.failed.push(FileFailure::new(entry.path(), e));
            }
        }
    }
    Ok(report)
}

/// Deletes every regular file below `dir`, then `dir` itself.
///
/// Nested directories are never removed; they are listed in
/// `kept_dirs` and, when present, `dir` stays behind as well.
pub fn remove_files(dir: &Path) -> Result<DeleteReport, StoreError> {
    fs::metadata(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut report = DeleteReport::default();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                warn!("skipping {}: {}", path.display(), e);
                report.failed.push(FileFailure::new(path, e));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            report.kept_dirs.push(entry.path().to_path_buf());
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                debug!("removed {}", entry.path().display());
                report.removed += 1;
            }
            Err(e) => {
                warn!("failed to remove {}: {}", entry.path().display(), e);
                report.failed.push(FileFailure::new(entry.path(), e));
            }
        }
    }

    match fs::remove_dir(dir) {
        Ok(()) => report.snapshot_removed = true,
        Err(e) => {
            warn!("failed to remove {}: {}", dir.display(), e);
            report.failed.push(FileFailure::new(dir, e));
        }
    }
    Ok(report)
}
