//! Configuration management

use crate::error::{CodelensError, CodelensResult};
use crate::types::{
    AnalysisConfig, CodelensConfig, EntryPointRule, ManifestFormat, RepositoryConfig,
};
use crate::LoggingConfig;

use std::collections::BTreeMap;
use std::path::Path;

/// Deepest `analysis.max_depth` accepted by [`CodelensConfig::validate`]
pub const MAX_DEPTH_CEILING: usize = 64;

/// Directory names pruned by default
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    "venv",
    "env",
    "dist",
    "build",
    ".next",
    "out",
    "target",
    "vendor",
];

const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    (".py", "python"),
    (".js", "javascript"),
    (".ts", "typescript"),
    (".tsx", "typescript"),
    (".jsx", "javascript"),
    (".java", "java"),
    (".go", "go"),
    (".rs", "rust"),
    (".rb", "ruby"),
    (".php", "php"),
    (".cpp", "cpp"),
    (".c", "c"),
    (".cs", "csharp"),
];

impl Default for CodelensConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 500,
            default_branch: "main".to_string(),
            workspace_dir: None,
            clone_timeout_secs: 300,
            credential_hosts: vec![
                "github.com".to_string(),
                "gitlab.com".to_string(),
                "bitbucket.org".to_string(),
            ],
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            languages: DEFAULT_LANGUAGES
                .iter()
                .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
                .collect::<BTreeMap<_, _>>(),
            unknown_language: "unknown".to_string(),
            entry_points: vec![
                EntryPointRule::new("main.py", "python", "Python application entry"),
                EntryPointRule::new("app.py", "python", "Python Flask/FastAPI app"),
                EntryPointRule::new("__main__.py", "python", "Python module entry"),
                EntryPointRule::new("index.js", "javascript", "JavaScript entry"),
                EntryPointRule::new("index.ts", "typescript", "TypeScript entry"),
                EntryPointRule::new("main.go", "go", "Go application entry"),
                EntryPointRule::new("main.rs", "rust", "Rust application entry"),
                EntryPointRule::new("Main.java", "java", "Java application entry"),
            ],
            manifests: ManifestFormat::ALL.to_vec(),
        }
    }
}

impl RepositoryConfig {
    /// Size ceiling in bytes
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

fn invalid(message: String, suggestion: &str) -> Box<CodelensError> {
    Box::new(CodelensError::Config {
        message,
        source: None,
        context: crate::ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    })
}

impl CodelensConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CodelensResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CodelensError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: CodelensConfig = toml::from_str(&content).map_err(|e| CodelensError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CodelensResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CodelensError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| CodelensError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> CodelensResult<()> {
        self.repository.validate()?;
        self.analysis.validate()
    }
}

impl RepositoryConfig {
    pub fn validate(&self) -> CodelensResult<()> {
        if self.max_size_mb == 0 {
            return Err(invalid(
                "Repository max_size_mb must be greater than 0".to_string(),
                "Set repository.max_size_mb to a positive value",
            ));
        }

        if self.clone_timeout_secs == 0 {
            return Err(invalid(
                "Repository clone_timeout_secs must be greater than 0".to_string(),
                "Set repository.clone_timeout_secs to a positive value",
            ));
        }

        if self.default_branch.trim().is_empty() {
            return Err(invalid(
                "Repository default_branch must not be empty".to_string(),
                "Set repository.default_branch, e.g. \"main\"",
            ));
        }

        Ok(())
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> CodelensResult<()> {
        if self.max_depth > MAX_DEPTH_CEILING {
            return Err(invalid(
                format!(
                    "Analysis max_depth {} exceeds the ceiling of {}",
                    self.max_depth, MAX_DEPTH_CEILING
                ),
                "Lower analysis.max_depth",
            ));
        }

        for dir in &self.ignored_dirs {
            if dir.is_empty() || dir.contains('/') || dir.contains('\\') {
                return Err(invalid(
                    format!("Ignored directory entry '{}' must be a single path component", dir),
                    "List directory names such as \"node_modules\", not paths",
                ));
            }
        }

        for extension in self.languages.keys() {
            if !extension.starts_with('.') || extension.len() < 2 {
                return Err(invalid(
                    format!("Language table key '{}' must be an extension like \".rs\"", extension),
                    "Prefix every extension in analysis.languages with a dot",
                ));
            }
        }

        if self.unknown_language.is_empty() {
            return Err(invalid(
                "Analysis unknown_language must not be empty".to_string(),
                "Set analysis.unknown_language, e.g. \"unknown\"",
            ));
        }

        if self.entry_points.iter().any(|rule| rule.file_name.is_empty()) {
            return Err(invalid(
                "Entry point rules need a file name".to_string(),
                "Remove or complete the empty analysis.entry_points entry",
            ));
        }

        Ok(())
    }
}
