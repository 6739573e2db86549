//! Entry-Point Detector

use crate::filter::{relative_path, IgnoreRules};
use codelens_core::{AnalysisConfig, CodelensResult, EntryPoint, EntryPointRule, Scanned};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Category reported for every detected entry point
pub const APPLICATION_ENTRY: &str = "application_entry";

/// Finds files named after conventional program entry points
#[derive(Debug, Clone)]
pub struct EntryPointDetector {
    rules: IgnoreRules,
    conventions: Vec<EntryPointRule>,
}

impl EntryPointDetector {
    pub fn new(rules: IgnoreRules, conventions: Vec<EntryPointRule>) -> Self {
        Self { rules, conventions }
    }

    pub fn from_config(config: &AnalysisConfig) -> CodelensResult<Self> {
        Ok(Self::new(
            IgnoreRules::new(&config.ignored_dirs)?,
            config.entry_points.clone(),
        ))
    }

    /// Every file whose name matches a convention, ordered by convention and then by walk
    /// order. Multiple matches for one convention are all reported.
    pub fn find_entry_points(&self, root: &Path) -> Scanned<Vec<EntryPoint>> {
        let mut skipped = Vec::new();
        let mut matches: HashMap<String, Vec<String>> = HashMap::new();

        self.rules.walk_files(root, &mut skipped, |entry| {
            let name = entry.file_name().to_string_lossy();
            if self.conventions.iter().any(|c| c.file_name == name) {
                matches
                    .entry(name.into_owned())
                    .or_default()
                    .push(relative_path(root, entry.path()));
            }
        });

        let mut entry_points = Vec::new();
        for convention in &self.conventions {
            let Some(files) = matches.get(&convention.file_name) else {
                continue;
            };
            entry_points.extend(files.iter().map(|file| EntryPoint {
                file: file.clone(),
                category: APPLICATION_ENTRY.to_string(),
                language: convention.language.clone(),
                description: convention.description.clone(),
            }));
        }

        debug!(
            root = %root.display(),
            count = entry_points.len(),
            "Entry points detected"
        );

        Scanned::new(entry_points, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_ordered_by_convention_then_walk_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("services/api")).unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/index.js"), "").unwrap();
        fs::write(root.join("services/api/main.py"), "").unwrap();
        fs::write(root.join("main.py"), "").unwrap();

        let detector = EntryPointDetector::from_config(&AnalysisConfig::default()).unwrap();
        let found = detector.find_entry_points(root).into_value();

        let files: Vec<&str> = found.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["main.py", "services/api/main.py", "web/index.js"]);
        assert!(found.iter().all(|e| e.category == APPLICATION_ENTRY));
        assert_eq!(found[2].language, "javascript");
    }

    #[test]
    fn test_matches_below_ignored_directories_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("src/main.py"), "").unwrap();
        fs::write(root.join("vendor/main.py"), "").unwrap();

        let detector = EntryPointDetector::from_config(&AnalysisConfig::default()).unwrap();
        let found = detector.find_entry_points(root).into_value();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, "src/main.py");
        assert_eq!(found[0].language, "python");
    }

    #[test]
    fn test_custom_conventions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("server.rb"), "").unwrap();

        let detector = EntryPointDetector::new(
            IgnoreRules::default(),
            vec![EntryPointRule::new("server.rb", "ruby", "Ruby server")],
        );
        let found = detector.find_entry_points(dir.path()).into_value();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Ruby server");
    }
}
