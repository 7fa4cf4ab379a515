use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Depth used when the caller does not pick one: the start directory and its
/// direct entries.
pub const DEFAULT_MAX_DEPTH: usize = 1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Worker threads for one build. The pool is shared by every directory level,
/// so this bounds the whole build, not each directory separately.
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryDetection {
    /// Printable-ASCII ratio heuristic.
    #[default]
    Ratio,
    /// `content_inspector` (NUL bytes and byte-order marks).
    Accurate,
    None,
}

/// Thresholds applied by the pre-flight size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyLimits {
    pub max_files: u64,
    pub max_average_file_size: u64,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_files: 1000,
            max_average_file_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreecatOptions {
    pub root: PathBuf,
    /// Base for pattern matching and displayed paths; `root` when unset.
    pub start_dir: Option<PathBuf>,
    pub exclude: Option<String>,
    pub include: Option<String>,
    /// `None` walks the whole subtree.
    pub max_depth: Option<usize>,
    pub force: bool,
    pub binary_detection: BinaryDetection,
    pub timeout: Duration,
    pub limits: SafetyLimits,
    pub workers: usize,
}

impl Default for TreecatOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            start_dir: None,
            exclude: None,
            include: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            force: false,
            binary_detection: BinaryDetection::Ratio,
            timeout: DEFAULT_TIMEOUT,
            limits: SafetyLimits::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Default)]
pub struct TreecatBuilder {
    options: TreecatOptions,
}

impl TreecatBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            options: TreecatOptions {
                root: root.into(),
                ..Default::default()
            },
        }
    }
    pub fn start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.start_dir = Some(dir.into());
        self
    }
    pub fn exclude(mut self, pattern: Option<String>) -> Self {
        self.options.exclude = pattern.filter(|p| !p.is_empty());
        self
    }
    pub fn include(mut self, pattern: Option<String>) -> Self {
        self.options.include = pattern.filter(|p| !p.is_empty());
        self
    }
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = Some(depth);
        self
    }
    pub fn no_limit_depth(mut self) -> Self {
        self.options.max_depth = None;
        self
    }
    pub fn force(mut self, yes: bool) -> Self {
        self.options.force = yes;
        self
    }
    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.options.binary_detection = method;
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }
    pub fn limits(mut self, limits: SafetyLimits) -> Self {
        self.options.limits = limits;
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.options.workers = workers.max(1);
        self
    }
    pub fn build(self) -> TreecatOptions {
        self.options
    }
}
