//! Codelens Repository - acquisition and static analysis of code repositories
//!
//! Responsible for cloning a repository into an ephemeral workspace and reading its structure,
//! entry points, dependencies and statistics

pub mod acquirer;
pub mod analyzer;
pub mod entry_points;
pub mod filter;
pub mod language;
pub mod manifest;
pub mod statistics;
pub mod tree;

pub use acquirer::*;
pub use analyzer::*;
pub use entry_points::*;
pub use filter::*;
pub use language::*;
pub use manifest::{parse_manifest, ManifestParser, ParsedManifest};
pub use statistics::*;
pub use tree::*;
