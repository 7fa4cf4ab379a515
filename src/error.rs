use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreecatError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("invalid depth {0}: use -1 for unlimited")]
    InvalidDepth(i64),
    #[error("error checking directory size of {path}: {source}")]
    Scan {
        path: PathBuf,
        source: ignore::Error,
    },
    #[error(transparent)]
    Blocked(#[from] Blocked),
    #[error("tree build exceeded the {limit:?} deadline")]
    DeadlineExceeded { limit: Duration },
    #[error("start path {0} is excluded by the active filters")]
    Excluded(PathBuf),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "parallel")]
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why the safety gate refused to start a build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Blocked {
    #[error("directory contains {count} files (max safe limit is {limit}). Use --force to override")]
    TooManyFiles { count: u64, limit: u64 },
    #[error(
        "average file size {average_mib:.2}MB exceeds safe limit of {limit_mib:.2}MB. Use --force to override"
    )]
    FilesTooLarge { average_mib: f64, limit_mib: f64 },
}

impl TreecatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TreecatError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying I/O error means the entry disappeared.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreecatError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
