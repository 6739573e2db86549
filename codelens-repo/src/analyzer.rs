//! Repository analyzer
//!
//! Runs the four read-only readers over one workspace and assembles a [`RepositoryProfile`].
//! The readers share nothing but the workspace path, so the async entry point runs them on
//! separate blocking threads.

use crate::acquirer::Workspace;
use crate::entry_points::EntryPointDetector;
use crate::manifest::ManifestParser;
use crate::statistics::StatisticsCollector;
use crate::tree::TreeWalker;
use codelens_core::{
    performance, AnalysisConfig, CodelensError, CodelensResult, Dependency, EntryPoint,
    ErrorContext, RepositoryProfile, RepositoryStatistics, Scanned, TreeNode,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
struct Readers {
    tree: TreeWalker,
    entry_points: EntryPointDetector,
    manifests: ManifestParser,
    statistics: StatisticsCollector,
    max_depth: usize,
}

impl Readers {
    fn tree(&self, root: &Path) -> Scanned<TreeNode> {
        performance::measure_sync("build_tree", || self.tree.build_tree(root, self.max_depth))
    }

    fn entry_points(&self, root: &Path) -> Scanned<Vec<EntryPoint>> {
        performance::measure_sync("find_entry_points", || {
            self.entry_points.find_entry_points(root)
        })
    }

    fn dependencies(&self, root: &Path) -> Scanned<Vec<Dependency>> {
        performance::measure_sync("parse_dependencies", || {
            self.manifests.parse_dependencies(root)
        })
    }

    fn statistics(&self, root: &Path) -> Scanned<RepositoryStatistics> {
        performance::measure_sync("collect_statistics", || {
            self.statistics.collect_statistics(root)
        })
    }
}

/// Builds repository profiles with one fixed analysis configuration
#[derive(Debug, Clone)]
pub struct ProfileAnalyzer {
    readers: Arc<Readers>,
}

impl ProfileAnalyzer {
    /// Validate `config` and compile its tables. Fails before any filesystem work.
    pub fn new(config: &AnalysisConfig) -> CodelensResult<Self> {
        config.validate()?;

        Ok(Self {
            readers: Arc::new(Readers {
                tree: TreeWalker::from_config(config)?,
                entry_points: EntryPointDetector::from_config(config)?,
                manifests: ManifestParser::from_config(config),
                statistics: StatisticsCollector::from_config(config)?,
                max_depth: config.max_depth,
            }),
        })
    }

    pub fn build_tree(&self, workspace: &Workspace) -> Scanned<TreeNode> {
        self.readers.tree(workspace.root_path())
    }

    pub fn find_entry_points(&self, workspace: &Workspace) -> Scanned<Vec<EntryPoint>> {
        self.readers.entry_points(workspace.root_path())
    }

    pub fn parse_dependencies(&self, workspace: &Workspace) -> Scanned<Vec<Dependency>> {
        self.readers.dependencies(workspace.root_path())
    }

    pub fn collect_statistics(&self, workspace: &Workspace) -> Scanned<RepositoryStatistics> {
        self.readers.statistics(workspace.root_path())
    }

    /// Run all readers one after another on the current thread
    pub fn analyze_blocking(&self, workspace: &Workspace) -> RepositoryProfile {
        let root = workspace.root_path();
        let profile = assemble(
            self.readers.tree(root),
            self.readers.entry_points(root),
            self.readers.dependencies(root),
            self.readers.statistics(root),
        );
        log_profile(root, &profile);
        profile
    }

    /// Run all readers concurrently on the blocking thread pool
    pub async fn analyze(&self, workspace: &Workspace) -> CodelensResult<RepositoryProfile> {
        let root: PathBuf = workspace.root_path().to_path_buf();

        let tree = spawn_reader(&self.readers, &root, |readers, root| readers.tree(root));
        let entry_points =
            spawn_reader(&self.readers, &root, |readers, root| readers.entry_points(root));
        let dependencies =
            spawn_reader(&self.readers, &root, |readers, root| readers.dependencies(root));
        let statistics =
            spawn_reader(&self.readers, &root, |readers, root| readers.statistics(root));

        let (tree, entry_points, dependencies, statistics) =
            tokio::try_join!(tree, entry_points, dependencies, statistics).map_err(|e| {
                CodelensError::Internal {
                    message: format!("Analysis task failed: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("profile_analyzer").with_operation("analyze"),
                }
            })?;

        let profile = assemble(tree, entry_points, dependencies, statistics);
        log_profile(&root, &profile);
        Ok(profile)
    }
}

fn spawn_reader<T, F>(
    readers: &Arc<Readers>,
    root: &Path,
    read: F,
) -> tokio::task::JoinHandle<Scanned<T>>
where
    T: Send + 'static,
    F: FnOnce(&Readers, &Path) -> Scanned<T> + Send + 'static,
{
    let readers = Arc::clone(readers);
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || read(&readers, &root))
}

fn assemble(
    tree: Scanned<TreeNode>,
    entry_points: Scanned<Vec<EntryPoint>>,
    dependencies: Scanned<Vec<Dependency>>,
    statistics: Scanned<RepositoryStatistics>,
) -> RepositoryProfile {
    let mut skipped = tree.skipped;
    skipped.extend(entry_points.skipped);
    skipped.extend(dependencies.skipped);
    skipped.extend(statistics.skipped);

    RepositoryProfile {
        tree: tree.value,
        entry_points: entry_points.value,
        dependencies: dependencies.value,
        statistics: statistics.value,
        skipped,
    }
}

fn log_profile(root: &Path, profile: &RepositoryProfile) {
    info!(
        root = %root.display(),
        total_files = profile.statistics.total_files,
        total_lines = profile.statistics.total_lines,
        entry_points = profile.entry_points.len(),
        dependencies = profile.dependencies.len(),
        skipped = profile.skipped.len(),
        "📊 Repository analysis complete"
    );
}

/// Analyze a local directory with the given configuration
pub async fn analyze_repository<P: AsRef<Path>>(
    repo_path: P,
    config: &AnalysisConfig,
) -> CodelensResult<RepositoryProfile> {
    let workspace = Workspace::local(repo_path)?;
    let analyzer = ProfileAnalyzer::new(config)?;
    let profile = analyzer.analyze(&workspace).await?;
    workspace.release()?;
    Ok(profile)
}
