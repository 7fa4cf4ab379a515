//! Pre-flight check that refuses directories likely to make a snapshot slow
//! or enormous.
//!
//! The check is a heuristic over the whole subtree: the number of files and
//! their average size. A directory holding one huge file among
//! many small ones can still pass.

use crate::error::{Blocked, TreecatError};
use crate::options::SafetyLimits;
use ignore::WalkBuilder;
use std::io;
use std::path::Path;

const MIB: f64 = 1024.0 * 1024.0;

/// File totals of a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirStats {
    pub file_count: u64,
    pub total_size: u64,
}

impl DirStats {
    pub fn average_file_size(&self) -> Option<f64> {
        (self.file_count > 0).then(|| self.total_size as f64 / self.file_count as f64)
    }
}

/// Counts every non-directory entry below `path`, hidden and ignored ones
/// included. Symlinks are followed the same way the tree builder follows
/// them, so linked files and linked directories count toward the limits.
/// Dangling links and link cycles are skipped.
pub fn scan(path: &Path) -> Result<DirStats, TreecatError> {
    let walker = WalkBuilder::new(path)
        .standard_filters(false)
        .follow_links(true)
        .build();
    let mut stats = DirStats::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_skippable(&e) => {
                tracing::debug!("safety scan skipped: {}", e);
                continue;
            }
            Err(e) => {
                return Err(TreecatError::Scan {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        if entry.file_type().is_none_or(|t| t.is_dir()) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if is_skippable(&e) => continue,
            Err(e) => {
                return Err(TreecatError::Scan {
                    path: entry.path().to_path_buf(),
                    source: e,
                });
            }
        };
        stats.file_count += 1;
        stats.total_size += metadata.len();
    }
    Ok(stats)
}

/// Dangling symlinks and symlink cycles.
fn is_skippable(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_skippable(err),
        _ => false,
    }
}

/// Checks `stats` against `limits`.
pub fn check(stats: DirStats, limits: &SafetyLimits) -> Result<(), Blocked> {
    let Some(average) = stats.average_file_size() else {
        return Ok(());
    };
    if stats.file_count > limits.max_files {
        return Err(Blocked::TooManyFiles {
            count: stats.file_count,
            limit: limits.max_files,
        });
    }
    if average > limits.max_average_file_size as f64 {
        return Err(Blocked::FilesTooLarge {
            average_mib: average / MIB,
            limit_mib: limits.max_average_file_size as f64 / MIB,
        });
    }
    Ok(())
}

/// Runs the gate for `path`. With `force` set nothing is scanned.
pub fn validate(path: &Path, force: bool, limits: &SafetyLimits) -> Result<(), TreecatError> {
    if force {
        return Ok(());
    }
    let stats = scan(path)?;
    tracing::debug!(
        "safety scan of {}: {} files, {} bytes",
        path.display(),
        stats.file_count,
        stats.total_size
    );
    check(stats, limits)?;
    Ok(())
}
