//! Integration tests for the read phase of the pipeline

mod common;

use codelens_core::{AnalysisConfig, DependencyKind, NodeKind, SkipReason};
use codelens_repo::{ProfileAnalyzer, StatisticsCollector, TreeWalker, Workspace};
use common::{init_logging, sample_project, write_file};

fn analyzer() -> ProfileAnalyzer {
    ProfileAnalyzer::new(&AnalysisConfig::default()).unwrap()
}

#[tokio::test]
async fn test_full_profile_of_sample_project() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    sample_project(dir.path());
    let workspace = Workspace::local(dir.path()).unwrap();

    let profile = analyzer().analyze(&workspace).await.unwrap();

    let entry_files: Vec<&str> = profile.entry_points.iter().map(|e| e.file.as_str()).collect();
    assert_eq!(
        entry_files,
        vec!["src/main.py", "src/app.py", "web/index.js", "cmd/tool/main.go"]
    );

    let deps: Vec<(&str, &str, DependencyKind)> = profile
        .dependencies
        .iter()
        .map(|d| (d.name.as_str(), d.version.as_str(), d.kind))
        .collect();
    assert_eq!(
        deps,
        vec![
            ("express", "^4.18.2", DependencyKind::Production),
            ("jest", "^29.0.0", DependencyKind::Development),
            ("flask", "3.0.0", DependencyKind::Production),
            ("requests", "unknown", DependencyKind::Production),
        ]
    );

    assert_eq!(profile.statistics.total_files, 9);
    assert_eq!(profile.statistics.languages.get("python"), Some(&2));
    assert!(profile.skipped.is_empty());
    assert!(profile
        .tree
        .iter()
        .all(|node| !node.path.starts_with("vendor") && !node.path.starts_with("node_modules")));

    workspace.release().unwrap();
    assert!(dir.path().exists());
}

#[test]
fn test_total_files_matches_tree_when_depth_is_not_hit() {
    let dir = tempfile::tempdir().unwrap();
    sample_project(dir.path());
    let config = AnalysisConfig::default();

    let tree = TreeWalker::from_config(&config)
        .unwrap()
        .build_tree(dir.path(), 64)
        .into_value();
    let stats = StatisticsCollector::from_config(&config)
        .unwrap()
        .collect_statistics(dir.path())
        .into_value();

    assert_eq!(stats.total_files, tree.file_count());

    let per_language: usize = stats.languages.values().sum();
    let per_type: usize = stats.file_types.values().sum();
    assert_eq!(per_language, stats.total_files);
    assert_eq!(per_type, stats.total_files);
}

#[test]
fn test_depth_ceiling_may_hide_files_from_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    sample_project(dir.path());
    let config = AnalysisConfig::default();

    let tree = TreeWalker::from_config(&config)
        .unwrap()
        .build_tree(dir.path(), 1)
        .into_value();
    let stats = StatisticsCollector::from_config(&config)
        .unwrap()
        .collect_statistics(dir.path())
        .into_value();

    // only root-level files survive depth 1
    assert_eq!(tree.file_count(), 4);
    assert!(stats.total_files > tree.file_count());
}

#[test]
fn test_depth_zero_yields_childless_root() {
    let dir = tempfile::tempdir().unwrap();
    sample_project(dir.path());

    let tree = TreeWalker::from_config(&AnalysisConfig::default())
        .unwrap()
        .build_tree(dir.path(), 0)
        .into_value();

    assert_eq!(tree.kind, NodeKind::Directory);
    assert!(tree.children.is_empty());
}

#[test]
fn test_vendor_tree_is_absent_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "vendor/deeply/nested/file.go", "package nested\n");
    write_file(dir.path(), "src/main.py", "print(1)\n");
    write_file(dir.path(), "vendor/main.py", "print(2)\n");
    let workspace = Workspace::local(dir.path()).unwrap();

    let profile = analyzer().analyze_blocking(&workspace);

    assert!(profile.tree.iter().all(|node| !node.path.contains("vendor")));
    assert_eq!(profile.statistics.total_files, 1);
    assert_eq!(profile.entry_points.len(), 1);
    assert_eq!(profile.entry_points[0].file, "src/main.py");
}

#[tokio::test]
async fn test_analysis_is_idempotent_and_matches_blocking_run() {
    let dir = tempfile::tempdir().unwrap();
    sample_project(dir.path());
    let workspace = Workspace::local(dir.path()).unwrap();
    let analyzer = analyzer();

    let first = analyzer.analyze(&workspace).await.unwrap();
    let second = analyzer.analyze(&workspace).await.unwrap();
    let blocking = analyzer.analyze_blocking(&workspace);

    assert_eq!(first, second);
    assert_eq!(first, blocking);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_malformed_manifest_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "package.json", "{ broken");
    write_file(dir.path(), "requirements.txt", "django==5.0\n");
    let workspace = Workspace::local(dir.path()).unwrap();

    let profile = analyzer().analyze_blocking(&workspace);

    assert_eq!(profile.dependencies.len(), 1);
    assert_eq!(profile.dependencies[0].name, "django");
    assert!(profile
        .skipped
        .iter()
        .any(|s| s.path == "package.json" && matches!(s.reason, SkipReason::MalformedManifest(_))));
    assert_eq!(profile.statistics.total_files, 2);
}

#[test]
fn test_custom_ignore_patterns_apply_to_every_reader() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "mypkg.egg-info/main.py", "");
    write_file(dir.path(), "pkg/main.py", "x = 1\n");

    let mut config = AnalysisConfig::default();
    config.ignored_dirs.push("*.egg-info".to_string());
    let workspace = Workspace::local(dir.path()).unwrap();

    let profile = ProfileAnalyzer::new(&config).unwrap().analyze_blocking(&workspace);

    assert_eq!(profile.tree.file_count(), 1);
    assert_eq!(profile.statistics.total_files, 1);
    assert_eq!(profile.entry_points.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "locked/secret.py", "x = 1\n");
    write_file(dir.path(), "open/main.py", "print(1)\n");
    let locked = dir.path().join("locked");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits
    if std::fs::read_dir(&locked).is_ok() {
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let workspace = Workspace::local(dir.path()).unwrap();
    let profile = analyzer().analyze_blocking(&workspace);
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    let locked_node = profile.tree.iter().find(|n| n.path == "locked").unwrap();
    assert!(locked_node.children.is_empty());
    assert_eq!(profile.statistics.total_files, 1);
    assert!(profile
        .skipped
        .iter()
        .any(|s| matches!(s.reason, SkipReason::UnreadableDirectory(_))));
}
