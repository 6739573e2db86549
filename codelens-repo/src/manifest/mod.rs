//! Manifest Dependency Parser
//!
//! Each manifest format is an independent extraction path. A manifest that is missing, unreadable
//! or malformed contributes nothing and never affects its siblings.

mod cargo;
mod go;
mod npm;
mod python;
mod ruby;


use codelens_core::{
    AnalysisConfig, Dependency, DependencyKind, ManifestFormat, Scanned, SkipReason, Skipped,
};
use std::path::Path;
use tracing::{debug, warn};

/// Dependencies extracted from one manifest, plus the entries that had to be ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub dependencies: Vec<Dependency>,
    /// Human-readable description of each ignored entry
    pub rejected: Vec<String>,
}

impl ParsedManifest {
    pub(crate) fn push(
        &mut self,
        name: impl Into<String>,
        version: Option<String>,
        kind: DependencyKind,
        format: ManifestFormat,
    ) {
        self.dependencies
            .push(Dependency::new(name, version, kind, format.ecosystem()));
    }

    pub(crate) fn reject(&mut self, entry: impl Into<String>) {
        self.rejected.push(entry.into());
    }
}

/// Parses the manifests found at the workspace root
#[derive(Debug, Clone)]
pub struct ManifestParser {
    formats: Vec<ManifestFormat>,
}

impl Default for ManifestParser {
    fn default() -> Self {
        Self::new(ManifestFormat::ALL.to_vec())
    }
}

impl ManifestParser {
    pub fn new(formats: Vec<ManifestFormat>) -> Self {
        Self { formats }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.manifests.clone())
    }

    /// Dependencies of every configured manifest present at `root`, in format order and then in
    /// declaration order within each manifest.
    pub fn parse_dependencies(&self, root: &Path) -> Scanned<Vec<Dependency>> {
        let mut dependencies = Vec::new();
        let mut skipped = Vec::new();

        for &format in &self.formats {
            let file_name = format.file_name();
            let path = root.join(file_name);
            if !path.is_file() {
                continue;
            }

            let content = match std::fs::read(&path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!(manifest = file_name, error = %e, "Cannot read manifest");
                    skipped.push(Skipped::new(file_name, SkipReason::UnreadableFile(e.to_string())));
                    continue;
                }
            };

            match parse_manifest(format, &content) {
                Ok(parsed) => {
                    debug!(
                        manifest = file_name,
                        dependencies = parsed.dependencies.len(),
                        rejected = parsed.rejected.len(),
                        "Manifest parsed"
                    );
                    dependencies.extend(parsed.dependencies);
                    skipped.extend(
                        parsed
                            .rejected
                            .into_iter()
                            .map(|entry| Skipped::new(file_name, SkipReason::MalformedEntry(entry))),
                    );
                }
                Err(reason) => {
                    warn!(manifest = file_name, reason = %reason, "Malformed manifest ignored");
                    skipped.push(Skipped::new(file_name, SkipReason::MalformedManifest(reason)));
                }
            }
        }

        Scanned::new(dependencies, skipped)
    }
}

/// Parse the text of a single manifest.
///
/// `Err` means the document as a whole is unusable; individual bad entries end up in
/// [`ParsedManifest::rejected`] instead.
pub fn parse_manifest(format: ManifestFormat, content: &str) -> Result<ParsedManifest, String> {
    match format {
        ManifestFormat::PackageJson => npm::parse_package_json(content),
        ManifestFormat::Requirements => Ok(python::parse_requirements(content)),
        ManifestFormat::Pipfile => python::parse_pipfile(content),
        ManifestFormat::Pyproject => python::parse_pyproject(content),
        ManifestFormat::Cargo => cargo::parse_cargo_toml(content),
        ManifestFormat::GoMod => Ok(go::parse_go_mod(content)),
        ManifestFormat::Gemfile => Ok(ruby::parse_gemfile(content)),
    }
}

/// Parse a TOML manifest into a generic table
pub(crate) fn parse_toml_table(content: &str) -> Result<toml::Table, String> {
    toml::from_str::<toml::Table>(content).map_err(|e| e.to_string())
}

/// Version requirement of a TOML dependency value: `"1.0"` or `{ version = "1.0", .. }`.
///
/// Returns `Err` for values that are neither.
pub(crate) fn toml_version(value: &toml::Value) -> Result<Option<String>, ()> {
    match value {
        toml::Value::String(version) => Ok(Some(version.clone())),
        toml::Value::Table(table) => Ok(table
            .get("version")
            .and_then(toml::Value::as_str)
            .map(str::to_string)),
        _ => Err(()),
    }
}
