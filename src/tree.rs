//! Draws a built [`Node`] tree with connector glyphs and inlined content.

use crate::types::Node;
use std::io::{self, Write};
use std::path::Path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Writes `node` and everything below it to `sink`, depth first.
///
/// Each node gets one line: `prefix`, a connector, an icon and its path
/// relative to `start_dir`. File content follows, one line per content line,
/// indented one level deeper and closed by an empty continuation line.
/// Children are drawn in the order they are stored.
pub fn render<W: Write + ?Sized>(
    node: &Node,
    prefix: &str,
    is_last: bool,
    sink: &mut W,
    start_dir: &Path,
) -> io::Result<()> {
    let connector = if is_last { LAST_BRANCH } else { BRANCH };
    writeln!(
        sink,
        "{}{}{} {}",
        prefix,
        connector,
        icon(node),
        display_path(node, start_dir)
    )?;

    let child_prefix = format!("{}{}", prefix, if is_last { SPACE_INDENT } else { PIPE_INDENT });

    if let Some(content) = node.content.as_deref().filter(|c| !c.is_empty()) {
        for line in content.split('\n') {
            writeln!(sink, "{}{}", child_prefix, line)?;
        }
        writeln!(sink, "{}", child_prefix)?;
    }

    if node.is_dir && !node.children.is_empty() {
        writeln!(sink)?;
    }

    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        render(child, &child_prefix, i == last, sink, start_dir)?;
    }
    Ok(())
}

/// Renders the tree without a header line.
pub fn render_to_string(node: &Node, start_dir: &Path) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = render(node, "", true, &mut out, start_dir);
    String::from_utf8_lossy(&out).into_owned()
}

fn icon(node: &Node) -> &'static str {
    match (node.is_dir, node.children.is_empty()) {
        (false, _) => "📄",
        (true, true) => "📁",
        (true, false) => "📂",
    }
}

pub(crate) fn display_path(node: &Node, start_dir: &Path) -> String {
    match node.path.strip_prefix(start_dir) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => node.path.display().to_string(),
    }
}
