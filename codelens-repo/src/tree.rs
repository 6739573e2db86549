//! Tree Walker
//!
//! Builds a depth-bounded, name-ordered tree of the workspace. Ignored directories are absent
//! from the tree together with everything below them. Symbolic links are neither followed nor
//! reported.

use crate::filter::{relative_path, walk_error, IgnoreRules};
use crate::language::LanguageTable;
use codelens_core::{
    AnalysisConfig, CodelensResult, NodeKind, Scanned, SkipReason, Skipped, TreeNode,
};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TreeWalker {
    rules: IgnoreRules,
    languages: LanguageTable,
}

impl TreeWalker {
    pub fn new(rules: IgnoreRules, languages: LanguageTable) -> Self {
        Self { rules, languages }
    }

    pub fn from_config(config: &AnalysisConfig) -> CodelensResult<Self> {
        Ok(Self::new(
            IgnoreRules::new(&config.ignored_dirs)?,
            LanguageTable::from_config(config),
        ))
    }

    /// Build the tree rooted at `root`.
    ///
    /// The root is depth 0; children of a directory at depth `d` are listed only while
    /// `d < max_depth`, so `max_depth == 0` yields a childless root.
    pub fn build_tree(&self, root: &Path, max_depth: usize) -> Scanned<TreeNode> {
        let mut skipped = Vec::new();
        let mut tree = TreeNode {
            name: display_name(root),
            path: ".".to_string(),
            kind: NodeKind::Directory,
            language: None,
            size: None,
            children: Vec::new(),
        };
        // Directories still receiving children; `open[i]` sits at depth `i + 1`
        let mut open: Vec<TreeNode> = Vec::new();

        for result in self.rules.walk(root, max_depth) {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    let skip = walk_error(root, &err);
                    warn!(path = %skip.path, error = %err, "Cannot list directory");
                    skipped.push(skip);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            while open.len() >= entry.depth() {
                close_directory(&mut tree, &mut open);
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let rel = relative_path(root, entry.path());
            let file_type = entry.file_type();

            if file_type.is_dir() {
                open.push(TreeNode {
                    name,
                    path: rel,
                    kind: NodeKind::Directory,
                    language: None,
                    size: None,
                    children: Vec::new(),
                });
            } else if file_type.is_file() {
                let size = match entry.metadata() {
                    Ok(metadata) => metadata.len(),
                    Err(e) => {
                        skipped.push(Skipped::new(
                            rel.clone(),
                            SkipReason::UnreadableFile(e.to_string()),
                        ));
                        0
                    }
                };
                let node = TreeNode {
                    language: Some(self.languages.language_for(entry.path()).to_string()),
                    name,
                    path: rel,
                    kind: NodeKind::File,
                    size: Some(size),
                    children: Vec::new(),
                };
                match open.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => tree.children.push(node),
                }
            }
        }

        while !open.is_empty() {
            close_directory(&mut tree, &mut open);
        }

        debug!(
            root = %root.display(),
            max_depth,
            files = tree.file_count(),
            skipped = skipped.len(),
            "Tree built"
        );

        Scanned::new(tree, skipped)
    }
}

/// Attach the innermost open directory to its parent
fn close_directory(tree: &mut TreeNode, open: &mut Vec<TreeNode>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => tree.children.push(done),
        }
    }
}

fn display_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}
