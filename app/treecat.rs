//! Command-line interface for treecat.
//!
//! Builds the tree for one directory and writes the annotated snapshot to
//! standard output or a file.

use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use treecat::output::{self, OutputFormat};
use treecat::{BinaryDetection, Node, TreecatBuilder, TreecatError, TreecatOptions, build};

/// treecat — display a directory tree with file contents
#[derive(Parser)]
#[command(name = "treecat", version, about, long_about = None)]
struct Cli {
    /// Start directory (default current dir)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Pattern to exclude (glob, relative to the start directory)
    #[arg(short, long)]
    exclude: Option<String>,

    /// Pattern to include (glob, relative to the start directory)
    #[arg(short, long)]
    include: Option<String>,

    /// Output file path (default stdout)
    #[arg(short, long, visible_alias = "out")]
    output: Option<PathBuf>,

    /// Maximum depth, -1 for unlimited
    #[arg(
        short,
        long,
        default_value_t = 1,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-1..)
    )]
    depth: i64,

    /// Skip the file count and size safety check
    #[arg(short, long)]
    force: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Indented JSON
    #[arg(long)]
    pretty: bool,

    /// Binary detection strategy
    #[arg(long, default_value = "ratio", value_parser = parse_binary_detection)]
    binary_detection: BinaryDetection,

    /// Abort the build after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Markdown => OutputFormat::Markdown,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Parse string into BinaryDetection enum.
fn parse_binary_detection(s: &str) -> Result<BinaryDetection, String> {
    match s {
        "ratio" => Ok(BinaryDetection::Ratio),
        "accurate" => Ok(BinaryDetection::Accurate),
        "none" => Ok(BinaryDetection::None),
        _ => Err(format!("invalid binary detection method: {}", s)),
    }
}

impl Cli {
    fn into_options(self, start: &Path) -> (TreecatOptions, OutputFormat, Option<PathBuf>, bool) {
        let mut builder = TreecatBuilder::new(start)
            .start_dir(start)
            .exclude(self.exclude)
            .include(self.include)
            .force(self.force)
            .binary_detection(self.binary_detection)
            .timeout(Duration::from_secs(self.timeout));

        builder = match usize::try_from(self.depth) {
            Ok(depth) => builder.max_depth(depth),
            Err(_) => builder.no_limit_depth(),
        };

        (builder.build(), self.format.into(), self.output, self.pretty)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<(), TreecatError> {
    let start = std::fs::canonicalize(&cli.path).map_err(|e| {
        TreecatError::InvalidPath(format!(
            "error getting absolute path of {}: {}",
            cli.path.display(),
            e
        ))
    })?;
    let (options, format, output_path, pretty) = cli.into_options(&start);

    let root = build(&options)?;
    write_result(&start, &root, format, pretty, output_path.as_deref())
}

fn write_result(
    start: &Path,
    root: &Node,
    format: OutputFormat,
    pretty: bool,
    output_path: Option<&Path>,
) -> Result<(), TreecatError> {
    match output_path {
        Some(path) => {
            output::write_output_to_file(start, root, format, pretty, path)?;
            tracing::info!("Wrote {} to {}", format.extension(), path.display());
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut handle = BufWriter::new(stdout.lock());
            output::write_output(start, root, format, pretty, &mut handle)?;
            handle.flush().map_err(TreecatError::Output)
        }
    }
}
