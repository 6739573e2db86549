//! Extension -> language classification

use codelens_core::AnalysisConfig;
use std::collections::HashMap;
use std::path::Path;

/// Lookup table shared by the tree walker and the statistics collector
#[derive(Debug, Clone)]
pub struct LanguageTable {
    /// Lowercased extension (with dot) -> language
    by_extension: HashMap<String, String>,
    unknown: String,
}

impl LanguageTable {
    pub fn new<I, K, V>(entries: I, unknown: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            by_extension: entries
                .into_iter()
                .map(|(ext, lang)| (ext.as_ref().to_ascii_lowercase(), lang.into()))
                .collect(),
            unknown: unknown.into(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.languages.iter().map(|(k, v)| (k, v.clone())),
            config.unknown_language.clone(),
        )
    }

    /// The suffix of the file name including its dot, or `""` when there is none.
    ///
    /// Dotfiles such as `.gitignore` have no extension.
    pub fn extension_of(path: &Path) -> String {
        match path.extension().map(|ext| ext.to_string_lossy()) {
            Some(ext) if !ext.is_empty() => format!(".{}", ext),
            _ => String::new(),
        }
    }

    /// Language for an extension as returned by [`Self::extension_of`]
    pub fn language_for_extension(&self, extension: &str) -> &str {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or(&self.unknown)
    }

    pub fn language_for(&self, path: &Path) -> &str {
        self.language_for_extension(&Self::extension_of(path))
    }

    /// Sentinel reported for unrecognized extensions
    pub fn unknown(&self) -> &str {
        &self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(LanguageTable::extension_of(Path::new("src/main.rs")), ".rs");
        assert_eq!(LanguageTable::extension_of(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(LanguageTable::extension_of(Path::new("Makefile")), "");
        assert_eq!(LanguageTable::extension_of(Path::new(".gitignore")), "");
        assert_eq!(LanguageTable::extension_of(Path::new("trailing.")), "");
    }

    #[test]
    fn test_lookup_is_case_insensitive_with_sentinel() {
        let table = LanguageTable::from_config(&AnalysisConfig::default());
        assert_eq!(table.language_for(Path::new("app.py")), "python");
        assert_eq!(table.language_for(Path::new("LEGACY.PY")), "python");
        assert_eq!(table.language_for(Path::new("notes.txt")), "unknown");
        assert_eq!(table.unknown(), "unknown");
    }
}
