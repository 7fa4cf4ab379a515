use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder stored as the content of files classified as binary.
pub const BINARY_PLACEHOLDER: &str = "[binary data omitted]";

/// One file or directory in a built tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Final path component, kept for display.
    pub name: String,
    pub is_dir: bool,
    /// Always empty for files, and for directories at the depth cutoff.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// File text, or [`BINARY_PLACEHOLDER`].
    ///
    /// `None` for directories. A file that exists but could not be read
    /// carries `Some("")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Node {
    pub fn file(path: impl Into<PathBuf>, content: Option<String>) -> Self {
        let path = path.into();
        Self {
            name: base_name(&path),
            path,
            is_dir: false,
            children: Vec::new(),
            content,
        }
    }

    pub fn dir(path: impl Into<PathBuf>, children: Vec<Node>) -> Self {
        let path = path.into();
        Self {
            name: base_name(&path),
            path,
            is_dir: true,
            children,
            content: None,
        }
    }

    /// Pre-order, depth-first walk over this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn file_count(&self) -> usize {
        self.iter().filter(|n| !n.is_dir).count()
    }

    pub fn dir_count(&self) -> usize {
        self.iter().filter(|n| n.is_dir).count()
    }

    /// Recursively orders children by name.
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.name.cmp(&b.name));
        for child in &mut self.children {
            child.sort_children();
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
