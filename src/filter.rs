//! Decides which files take part in a snapshot.
//!
//! Patterns are shell-style globs matched against the path relative to the
//! start directory, always written with `/` separators, so `src/*.rs` and
//! `*.txt` behave the same on every platform. Any path with a dot-prefixed
//! component, the start directory's own ancestors included, is left out no
//! matter what the patterns say.

use crate::error::TreecatError;
use globset::{Glob, GlobMatcher};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
enum Pattern {
    Valid(GlobMatcher),
    /// Failed to compile; never matches.
    Invalid,
}

impl Pattern {
    fn compile(kind: &str, pattern: &str) -> Self {
        match Glob::new(&to_slash_pattern(pattern)) {
            Ok(glob) => Pattern::Valid(glob.compile_matcher()),
            Err(e) => {
                tracing::warn!("invalid {} pattern '{}': {}", kind, pattern, e);
                Pattern::Invalid
            }
        }
    }

    fn is_match(&self, relative: &str) -> bool {
        match self {
            Pattern::Valid(matcher) => matcher.is_match(relative),
            Pattern::Invalid => false,
        }
    }
}

/// Compiled include/exclude rules for one start directory.
#[derive(Debug, Clone)]
pub struct Filter {
    start_dir: PathBuf,
    exclude: Option<Pattern>,
    include: Option<Pattern>,
}

impl Filter {
    /// Compiles the patterns once. An empty pattern counts as unset.
    ///
    /// A malformed pattern is logged and kept as one that matches nothing:
    /// a broken exclude removes nothing, a broken include admits nothing.
    pub fn new(
        exclude: Option<&str>,
        include: Option<&str>,
        start_dir: impl AsRef<Path>,
    ) -> Result<Self, TreecatError> {
        let start_dir = start_dir.as_ref();
        let start_dir = std::path::absolute(start_dir).map_err(|e| {
            TreecatError::InvalidPath(format!("{}: {}", start_dir.display(), e))
        })?;
        Ok(Self {
            start_dir,
            exclude: exclude
                .filter(|p| !p.is_empty())
                .map(|p| Pattern::compile("exclude", p)),
            include: include
                .filter(|p| !p.is_empty())
                .map(|p| Pattern::compile("include", p)),
        })
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    pub fn should_include(&self, path: &Path) -> bool {
        let absolute = match std::path::absolute(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("cannot resolve {}: {}", path.display(), e);
                return false;
            }
        };
        if is_hidden(&absolute) {
            return false;
        }
        let relative = absolute.strip_prefix(&self.start_dir).unwrap_or(&absolute);
        let relative = if relative.as_os_str().is_empty() {
            // the start path itself
            absolute
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            to_slash(relative)
        };

        if let Some(exclude) = &self.exclude {
            if exclude.is_match(&relative) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(&relative),
            None => true,
        }
    }
}

/// One-shot form of [`Filter::should_include`].
pub fn should_include(
    path: &Path,
    exclude: Option<&str>,
    include: Option<&str>,
    start_dir: &Path,
) -> bool {
    match Filter::new(exclude, include, start_dir) {
        Ok(filter) => filter.should_include(path),
        Err(e) => {
            tracing::warn!("{}", e);
            false
        }
    }
}

/// True if any component of `path` starts with a dot.
pub fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(windows)]
fn to_slash_pattern(pattern: &str) -> String {
    pattern.replace('\\', "/")
}

#[cfg(not(windows))]
fn to_slash_pattern(pattern: &str) -> String {
    pattern.to_string()
}
