//! Core data type definitions
//!
//! These are the in-memory structures the analysis pipeline hands to its consumers. All of them
//! serialize deterministically (ordered maps, ordered children) so two scans of the same
//! workspace produce byte-identical output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a node in the repository tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
}

/// A file or directory of the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    /// Path relative to the workspace root, `/`-separated; the root itself is `.`
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Language derived from the extension (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Size in bytes (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Children ordered by name (directories only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Number of file nodes in this subtree, including `self`
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(TreeNode::file_count).sum(),
        }
    }

    /// Iterate over this node and all of its descendants, pre-order
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// A conventional entry-point filename found in the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Path relative to the workspace root
    pub file: String,
    /// Always `application_entry`
    #[serde(rename = "type")]
    pub category: String,
    pub language: String,
    pub description: String,
}

/// Whether a dependency is needed at runtime or only for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Production,
    Development,
}

/// A dependency declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Declared version or requirement, `unknown` when the manifest gives none
    pub version: String,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
    /// Ecosystem of the manifest the dependency came from
    pub language: String,
}

/// Version placeholder for dependencies declared without one
pub const UNKNOWN_VERSION: &str = "unknown";

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        kind: DependencyKind,
        language: &str,
    ) -> Self {
        Self {
            name: name.into(),
            version: version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            kind,
            language: language.to_string(),
        }
    }
}

/// Aggregate counts over every non-ignored file of the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatistics {
    pub total_files: usize,
    pub total_lines: usize,
    /// Language -> number of files
    pub languages: BTreeMap<String, usize>,
    /// Extension (with leading dot, empty for none) -> number of files
    pub file_types: BTreeMap<String, usize>,
}

/// Why part of the workspace contributed nothing (or less than usual) to a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// A directory could not be listed; it is reported without children
    UnreadableDirectory(String),
    /// A file could not be read; it still counts but contributes no lines
    UnreadableFile(String),
    /// A manifest could not be parsed; it contributes no dependencies
    MalformedManifest(String),
    /// A single entry inside an otherwise readable manifest was ignored
    MalformedEntry(String),
}

/// A degraded, non-fatal result for one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    /// Path relative to the workspace root
    pub path: String,
    pub reason: SkipReason,
}

impl Skipped {
    pub fn new(path: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// A best-effort result together with everything that was skipped while producing it.
///
/// An empty `skipped` list is not proof that nothing was skipped by the caller's own filters;
/// it only covers read and parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scanned<T> {
    pub value: T,
    pub skipped: Vec<Skipped>,
}

impl<T> Scanned<T> {
    pub fn new(value: T, skipped: Vec<Skipped>) -> Self {
        Self { value, skipped }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Everything the read phase extracts from one workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryProfile {
    pub tree: TreeNode,
    pub entry_points: Vec<EntryPoint>,
    pub dependencies: Vec<Dependency>,
    pub statistics: RepositoryStatistics,
    /// Diagnostics from all four readers, in reader order
    #[serde(default)]
    pub skipped: Vec<Skipped>,
}

/// Configuration root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodelensConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: crate::LoggingConfig,
}

/// Settings for the workspace acquirer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Ceiling on the size of a checkout, in megabytes
    pub max_size_mb: u64,
    /// Branch cloned when the caller names none
    pub default_branch: String,
    /// Parent directory for temporary workspaces (system temp dir when unset)
    pub workspace_dir: Option<String>,
    /// Upper bound on the clone itself
    pub clone_timeout_secs: u64,
    /// Hosts a credential may be embedded for
    pub credential_hosts: Vec<String>,
}

/// One conventional entry-point filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointRule {
    pub file_name: String,
    pub language: String,
    pub description: String,
}

impl EntryPointRule {
    pub fn new(file_name: &str, language: &str, description: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            language: language.to_string(),
            description: description.to_string(),
        }
    }
}

/// Manifest formats the dependency parser knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestFormat {
    PackageJson,
    Requirements,
    Pipfile,
    Pyproject,
    Cargo,
    GoMod,
    Gemfile,
}

impl ManifestFormat {
    pub const ALL: [ManifestFormat; 7] = [
        ManifestFormat::PackageJson,
        ManifestFormat::Requirements,
        ManifestFormat::Pipfile,
        ManifestFormat::Pyproject,
        ManifestFormat::Cargo,
        ManifestFormat::GoMod,
        ManifestFormat::Gemfile,
    ];

    /// File name the format is dispatched on
    pub fn file_name(self) -> &'static str {
        match self {
            Self::PackageJson => "package.json",
            Self::Requirements => "requirements.txt",
            Self::Pipfile => "Pipfile",
            Self::Pyproject => "pyproject.toml",
            Self::Cargo => "Cargo.toml",
            Self::GoMod => "go.mod",
            Self::Gemfile => "Gemfile",
        }
    }

    /// Ecosystem reported as each dependency's language
    pub fn ecosystem(self) -> &'static str {
        match self {
            Self::PackageJson => "javascript",
            Self::Requirements | Self::Pipfile | Self::Pyproject => "python",
            Self::Cargo => "rust",
            Self::GoMod => "go",
            Self::Gemfile => "ruby",
        }
    }
}

/// Settings for the read phase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Deepest level the tree walker descends to; the root is depth 0
    pub max_depth: usize,
    /// Directory names (or glob patterns) pruned by every reader
    pub ignored_dirs: Vec<String>,
    /// Extension including its leading dot -> language
    pub languages: BTreeMap<String, String>,
    /// Language reported for extensions missing from `languages`
    pub unknown_language: String,
    pub entry_points: Vec<EntryPointRule>,
    pub manifests: Vec<ManifestFormat>,
}
