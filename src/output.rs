//! Output formatting for built trees.
//!
//! Text is the annotated tree itself. Markdown lists the bare tree followed by
//! one fenced section per file. JSON serializes the [`Node`] tree.

use crate::tree::{display_path, render};
use crate::{Node, TreecatError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    /// Returns the conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    root: &'a Path,
    tree: &'a Node,
}

/// Writes `node` in `format`. `start_dir` is the absolute start path, printed
/// first and used to shorten every other path.
pub fn write_output<W: Write>(
    start_dir: &Path,
    node: &Node,
    format: OutputFormat,
    pretty: bool,
    sink: &mut W,
) -> Result<(), TreecatError> {
    match format {
        OutputFormat::Text => write_text(start_dir, node, sink),
        OutputFormat::Markdown => write_markdown(start_dir, node, sink),
        OutputFormat::Json => write_json(start_dir, node, pretty, sink),
    }
}

/// Writes the formatted tree to a newly created file at `path`.
pub fn write_output_to_file(
    start_dir: &Path,
    node: &Node,
    format: OutputFormat,
    pretty: bool,
    path: impl AsRef<Path>,
) -> Result<(), TreecatError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| TreecatError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_output(start_dir, node, format, pretty, &mut writer)?;
    writer.flush().map_err(|e| TreecatError::io(path, e))
}

// ----------------------- Internal formatting -----------------------

fn write_text<W: Write>(start_dir: &Path, node: &Node, sink: &mut W) -> Result<(), TreecatError> {
    writeln!(sink, "{}", start_dir.display()).map_err(TreecatError::Output)?;
    render(node, "", true, sink, start_dir).map_err(TreecatError::Output)
}

fn write_markdown<W: Write>(
    start_dir: &Path,
    node: &Node,
    sink: &mut W,
) -> Result<(), TreecatError> {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("# {}\n\n```text\n", start_dir.display()));
    let outline = strip_content(node);
    let mut tree = Vec::new();
    render(&outline, "", true, &mut tree, start_dir).map_err(TreecatError::Output)?;
    out.push_str(&String::from_utf8_lossy(&tree));
    out.push_str("```\n\n");

    for file in node.iter().filter(|n| !n.is_dir) {
        let content = file.content.as_deref().unwrap_or_default();
        let lang = file
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(language_from_extension)
            .unwrap_or("");
        let fence = fence_for(content);

        out.push_str(&format!("## {}\n\n{}{}\n", display_path(file, start_dir), fence, lang));
        out.push_str(content);
        if !content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&fence);
        out.push_str("\n\n");
    }
    sink.write_all(out.as_bytes()).map_err(TreecatError::Output)
}

fn write_json<W: Write>(
    start_dir: &Path,
    node: &Node,
    pretty: bool,
    sink: &mut W,
) -> Result<(), TreecatError> {
    let snapshot = Snapshot {
        root: start_dir,
        tree: node,
    };
    if pretty {
        serde_json::to_writer_pretty(&mut *sink, &snapshot)?;
    } else {
        serde_json::to_writer(&mut *sink, &snapshot)?;
    }
    writeln!(sink).map_err(TreecatError::Output)
}

/// Copy of the tree without file content, for the Markdown outline.
fn strip_content(node: &Node) -> Node {
    Node {
        path: node.path.clone(),
        name: node.name.clone(),
        is_dir: node.is_dir,
        children: node.children.iter().map(strip_content).collect(),
        content: None,
    }
}

/// A backtick fence longer than any run of backticks inside `content`.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn language_from_extension(ext: &str) -> &'static str {
    match ext {
        "rs" => "rust", "toml" => "toml", "json" => "json", "md" | "markdown" => "markdown",
        "txt" => "text", "html" | "htm" => "html", "css" => "css", "js" => "javascript",
        "ts" => "typescript", "py" => "python", "sh" | "bash" => "bash",
        "yml" | "yaml" => "yaml", "xml" => "xml", "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp", "go" => "go", "rb" => "ruby", "php" => "php",
        "java" => "java", "kt" | "kts" => "kotlin", "swift" => "swift", "sql" => "sql",
        _ => "",
    }
}
