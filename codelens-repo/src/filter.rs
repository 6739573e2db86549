//! Ignore rules shared by every reader of a workspace
//!
//! A path is excluded when one of its directory components, relative to the workspace root,
//! matches an ignored name. Entries may be plain names (`node_modules`) or glob patterns
//! (`*.egg-info`). Files are never pruned by their own name.

use codelens_core::{CodelensError, CodelensResult, ErrorContext, SkipReason, Skipped};
use glob::Pattern;
use std::collections::HashSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Compiled set of ignored directory names
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    names: HashSet<String>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    /// Compile ignore entries; anything containing glob metacharacters becomes a pattern
    pub fn new<S: AsRef<str>>(entries: &[S]) -> CodelensResult<Self> {
        let mut rules = Self::default();
        for entry in entries {
            rules.add(entry.as_ref())?;
        }
        Ok(rules)
    }

    /// Add one more ignored name or pattern
    pub fn add(&mut self, entry: &str) -> CodelensResult<()> {
        if !entry.contains(['*', '?', '[']) {
            self.names.insert(entry.to_string());
            return Ok(());
        }

        match Pattern::new(entry) {
            Ok(compiled) => {
                self.patterns.push(compiled);
                Ok(())
            }
            Err(e) => Err(Box::new(CodelensError::Config {
                message: format!("Invalid ignore pattern '{}': {}", entry, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("ignore_rules").with_operation("compile_patterns"),
            })),
        }
    }

    /// Whether a directory with this name is pruned
    pub fn is_ignored_name(&self, name: &str) -> bool {
        self.names.contains(name) || self.patterns.iter().any(|p| p.matches(name))
    }

    /// Depth-first walk of `root` in name order, pruning ignored directories. Symlinks are
    /// reported as entries but never followed.
    pub fn walk(
        &self,
        root: &Path,
        max_depth: usize,
    ) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| self.keep_entry(entry))
    }

    /// Visit every regular file under `root` that survives the rules, depth-first with siblings in
    /// name order. Directories that cannot be listed are recorded in `skipped`.
    pub fn walk_files<F>(&self, root: &Path, skipped: &mut Vec<Skipped>, mut visit: F)
    where
        F: FnMut(&DirEntry),
    {
        for result in self.walk(root, usize::MAX) {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        visit(&entry);
                    }
                }
                Err(err) => skipped.push(walk_error(root, &err)),
            }
        }
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        // The workspace root itself is never pruned, whatever its name
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        !self.is_ignored_name(&entry.file_name().to_string_lossy())
    }
}

/// Skip record for a path the walker could not read
pub(crate) fn walk_error(root: &Path, err: &walkdir::Error) -> Skipped {
    let path = err
        .path()
        .map(|p| relative_path(root, p))
        .unwrap_or_else(|| ".".to_string());
    Skipped::new(path, SkipReason::UnreadableDirectory(err.to_string()))
}

/// Workspace-relative, `/`-separated form of `path`; the root itself is `.`
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rules() -> IgnoreRules {
        IgnoreRules::new(&["node_modules", "vendor", ".git", "*.egg-info"]).unwrap()
    }

    #[test]
    fn test_names_and_patterns() {
        let rules = rules();
        assert!(rules.is_ignored_name("node_modules"));
        assert!(rules.is_ignored_name("mypkg.egg-info"));
        assert!(!rules.is_ignored_name("src"));
        assert!(!rules.is_ignored_name("vendored"));
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let err = IgnoreRules::new(&["[unclosed"]).unwrap_err();
        assert!(matches!(*err, CodelensError::Config { .. }));
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/work/repo");
        assert_eq!(relative_path(root, root), ".");
        assert_eq!(relative_path(root, &root.join("src").join("lib.rs")), "src/lib.rs");
    }

    #[test]
    fn test_walk_files_prunes_ignored_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("vendor/deeply/nested")).unwrap();
        fs::write(root.join("src/b.rs"), "").unwrap();
        fs::write(root.join("src/a.rs"), "").unwrap();
        fs::write(root.join("vendor/deeply/nested/file.go"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        // a file named like an ignored directory is kept
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/vendor"), "").unwrap();

        let mut seen = Vec::new();
        let mut skipped = Vec::new();
        rules().walk_files(root, &mut skipped, |entry| {
            seen.push(relative_path(root, entry.path()));
        });

        assert_eq!(seen, vec!["README.md", "docs/vendor", "src/a.rs", "src/b.rs"]);
        assert!(skipped.is_empty());
    }
}
