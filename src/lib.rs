//! # Treecat
//!
//! `treecat` walks a directory, draws it as a tree and inlines the text of
//! every included file underneath its entry, producing one annotated snapshot
//! of a codebase that can be pasted or shared as a single artifact.
//!
//! A build runs in three steps:
//!
//! - a safety check refuses directories with more than 1000 files or an
//!   average file size above 10 MiB, unless forced;
//! - the tree is built with entries of each directory processed in parallel,
//!   filtered by hidden-entry rules and optional include/exclude globs, and
//!   cut off at a maximum depth, all under a 30 second deadline;
//! - the tree is rendered with [`tree::render`] or one of the formats in
//!   [`output`].
//!
//! # Features
//!
//! - `parallel` (default): processes directory entries on a Rayon pool.
//!
//! # Example
//!
//! ```no_run
//! use treecat::{TreecatBuilder, build, tree};
//!
//! let options = TreecatBuilder::new(".")
//!     .include(Some("src/*.rs".into()))
//!     .no_limit_depth()
//!     .build();
//!
//! let root = build(&options).expect("Failed to build tree");
//! print!("{}", tree::render_to_string(&root, &root.path));
//! println!("{} files", root.file_count());
//! ```

mod engine;
mod error;
pub mod filter;
mod options;
pub mod output;
pub mod safety;
pub mod sniff;
pub mod tree;
mod types;

pub use engine::{build, build_tree};
pub use error::{Blocked, TreecatError};
pub use filter::{Filter, should_include};
pub use options::{
    BinaryDetection, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT, DEFAULT_WORKERS, SafetyLimits,
    TreecatBuilder, TreecatOptions,
};
pub use sniff::is_likely_binary;
pub use types::{BINARY_PLACEHOLDER, Node};
