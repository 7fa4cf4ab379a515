use crate::error::TreecatError;
use crate::filter::{Filter, is_hidden};
use crate::options::{BinaryDetection, TreecatBuilder, TreecatOptions};
use crate::safety;
use crate::types::{BINARY_PLACEHOLDER, Node};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Wall-clock limit shared by every step of one build.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn check(&self) -> Result<(), TreecatError> {
        if self.started.elapsed() >= self.limit {
            return Err(TreecatError::DeadlineExceeded { limit: self.limit });
        }
        Ok(())
    }
}

/// What visiting one path produced.
enum Visited {
    Node(Node),
    /// Kept in the tree, with a problem worth reporting.
    Degraded(Node, TreecatError),
    /// Filtered out or vanished.
    Absent,
}

struct Walker {
    filter: Filter,
    max_depth: Option<usize>,
    binary_detection: BinaryDetection,
    deadline: Deadline,
}

impl Walker {
    fn visit(&self, path: &Path, depth: usize) -> Result<Visited, TreecatError> {
        self.deadline.check()?;
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && depth > 0 => {
                return Ok(Visited::Absent);
            }
            Err(e) => return Err(TreecatError::io(path, e)),
        };
        if metadata.is_dir() {
            self.visit_dir(path, depth)
        } else {
            Ok(self.visit_file(path))
        }
    }

    fn visit_file(&self, path: &Path) -> Visited {
        if !self.filter.should_include(path) {
            return Visited::Absent;
        }
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Visited::Absent,
            Err(e) => {
                return Visited::Degraded(
                    Node::file(path, Some(String::new())),
                    TreecatError::io(path, e),
                );
            }
        };
        let content = if self.binary_detection.is_binary(&bytes) {
            BINARY_PLACEHOLDER.to_string()
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };
        Visited::Node(Node::file(path, Some(content)))
    }

    fn visit_dir(&self, path: &Path, depth: usize) -> Result<Visited, TreecatError> {
        if depth > 0 && is_hidden(path) {
            return Ok(Visited::Absent);
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(Visited::Node(Node::dir(path, Vec::new())));
        }

        let mut entries = fs::read_dir(path)
            .and_then(|dir| {
                dir.map(|entry| entry.map(|e| e.path()))
                    .collect::<Result<Vec<PathBuf>, _>>()
            })
            .map_err(|e| TreecatError::io(path, e))?;
        entries.sort();

        let results = self.visit_children(&entries, depth + 1);

        let mut children = Vec::with_capacity(results.len());
        let mut warnings = Vec::new();
        for result in results {
            match result {
                Ok(Visited::Node(node)) => children.push(node),
                Ok(Visited::Degraded(node, warning)) => {
                    children.push(node);
                    warnings.push(warning);
                }
                Ok(Visited::Absent) => {}
                Err(e @ TreecatError::DeadlineExceeded { .. }) => return Err(e),
                Err(e) if e.is_not_found() => {}
                Err(e) => warnings.push(e),
            }
        }
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        Ok(Visited::Node(Node::dir(path, children)))
    }

    /// Visits every entry, waiting for all of them. Results keep entry order.
    #[cfg(feature = "parallel")]
    fn visit_children(
        &self,
        entries: &[PathBuf],
        depth: usize,
    ) -> Vec<Result<Visited, TreecatError>> {
        entries
            .par_iter()
            .map(|entry| self.visit(entry, depth))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn visit_children(
        &self,
        entries: &[PathBuf],
        depth: usize,
    ) -> Vec<Result<Visited, TreecatError>> {
        entries
            .iter()
            .map(|entry| self.visit(entry, depth))
            .collect()
    }
}

fn resolve(path: &Path) -> Result<PathBuf, TreecatError> {
    fs::canonicalize(path).map_err(|e| TreecatError::io(path, e))
}

/// Builds the tree described by `options`.
///
/// The safety gate runs first unless `options.force` is set. Entries that
/// vanish mid-build are left out; files that cannot be read appear with
/// empty content. Per-entry problems are logged as warnings. Failing to list
/// the start directory, a blocked safety check and an expired deadline abort
/// the whole build.
pub fn build(options: &TreecatOptions) -> Result<Node, TreecatError> {
    let root = resolve(&options.root)?;
    let start_dir = match &options.start_dir {
        Some(dir) => resolve(dir)?,
        None => root.clone(),
    };
    tracing::debug!("Starting treecat with root: {}", root.display());

    safety::validate(&root, options.force, &options.limits)?;

    let walker = Walker {
        filter: Filter::new(
            options.exclude.as_deref(),
            options.include.as_deref(),
            &start_dir,
        )?,
        max_depth: options.max_depth,
        binary_detection: options.binary_detection,
        deadline: Deadline::start(options.timeout),
    };

    #[cfg(feature = "parallel")]
    let visited = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .thread_name(|i| format!("treecat-worker-{i}"))
        .build()?
        .install(|| walker.visit(&root, 0))?;
    #[cfg(not(feature = "parallel"))]
    let visited = walker.visit(&root, 0)?;

    match visited {
        Visited::Node(node) => {
            tracing::debug!(
                "Tree built in {:?}: {} files, {} directories",
                walker.deadline.started.elapsed(),
                node.file_count(),
                node.dir_count()
            );
            Ok(node)
        }
        Visited::Degraded(node, warning) => {
            tracing::warn!("{}", warning);
            Ok(node)
        }
        Visited::Absent => Err(TreecatError::Excluded(root)),
    }
}

/// Builds a tree from loose arguments. `max_depth` of `-1` means unlimited.
pub fn build_tree(
    path: impl Into<PathBuf>,
    exclude: Option<&str>,
    include: Option<&str>,
    start_dir: impl Into<PathBuf>,
    max_depth: i64,
    force: bool,
) -> Result<Node, TreecatError> {
    let builder = TreecatBuilder::new(path)
        .start_dir(start_dir)
        .exclude(exclude.map(str::to_string))
        .include(include.map(str::to_string))
        .force(force);
    let builder = match usize::try_from(max_depth) {
        Ok(depth) => builder.max_depth(depth),
        Err(_) if max_depth == -1 => builder.no_limit_depth(),
        Err(_) => {
            return Err(TreecatError::InvalidDepth(max_depth));
        }
    };
    build(&builder.build())
}
