//! Workspace Acquirer
//!
//! Materializes a remote repository as a shallow, single-branch checkout inside a freshly
//! generated temporary directory. Every failure after the directory exists removes it again
//! before the error is returned, so a failed acquisition never leaves residue on disk.

use chrono::{DateTime, Utc};
use codelens_core::{
    validation_error, with_timeout, AcquisitionFailure, CodelensError, CodelensResult,
    ErrorContext, RepositoryConfig,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

const COMPONENT: &str = "workspace_acquirer";
const WORKSPACE_PREFIX: &str = "codelens-";

/// Access token for a private repository. Its value is never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Hosted git platforms with known token conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHost {
    GitHub,
    GitLab,
    Bitbucket,
    Other,
}

impl GitHost {
    /// Detect the platform from a URL host
    pub fn detect(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host == "github.com" || host.ends_with(".github.com") {
            GitHost::GitHub
        } else if host.contains("gitlab") {
            GitHost::GitLab
        } else if host == "bitbucket.org" || host.ends_with(".bitbucket.org") {
            GitHost::Bitbucket
        } else {
            GitHost::Other
        }
    }

    /// Environment variable conventionally holding a token for this platform
    pub fn token_env_var(self) -> Option<&'static str> {
        match self {
            GitHost::GitHub => Some("GITHUB_TOKEN"),
            GitHost::GitLab => Some("GITLAB_TOKEN"),
            GitHost::Bitbucket => Some("BITBUCKET_TOKEN"),
            GitHost::Other => None,
        }
    }
}

/// An isolated local directory holding one checkout.
///
/// Dropping an acquired workspace deletes its directory; [`Workspace::release`] does the same
/// explicitly and reports failures. Consuming `self` makes a second release impossible.
#[derive(Debug)]
pub struct Workspace {
    root_path: PathBuf,
    source_url: String,
    branch: Option<String>,
    acquired_at: DateTime<Utc>,
    guard: Option<TempDir>,
}

impl Workspace {
    /// Wrap an existing directory. Releasing it never deletes anything.
    pub fn local<P: AsRef<Path>>(path: P) -> CodelensResult<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Box::new(CodelensError::Validation {
                message: format!("Local directory does not exist: {}", path.display()),
                field: Some("path".to_string()),
                context: ErrorContext::new(COMPONENT)
                    .with_operation("local")
                    .with_suggestion("Ensure the directory path exists and is accessible"),
            }));
        }

        Ok(Self {
            root_path: path.to_path_buf(),
            source_url: path.display().to_string(),
            branch: None,
            acquired_at: Utc::now(),
            guard: None,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Repository location with any credential stripped
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Checked-out branch; `None` for local workspaces
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Whether the directory is deleted on release
    pub fn is_ephemeral(&self) -> bool {
        self.guard.is_some()
    }

    /// Delete the workspace directory (no-op for local workspaces)
    pub fn release(self) -> CodelensResult<()> {
        let Some(guard) = self.guard else {
            debug!(root_path = %self.root_path.display(), "Local workspace released, nothing to delete");
            return Ok(());
        };

        guard.close().map_err(|e| CodelensError::Internal {
            message: format!("Failed to remove workspace {}: {}", self.root_path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new(COMPONENT).with_operation("release"),
        })?;

        info!(root_path = %self.root_path.display(), "Workspace released");
        Ok(())
    }
}

/// Clones repositories into fresh temporary workspaces
#[derive(Debug, Clone)]
pub struct WorkspaceAcquirer {
    config: RepositoryConfig,
}

impl WorkspaceAcquirer {
    pub fn new(config: RepositoryConfig) -> CodelensResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Main entry point: produce a workspace holding a depth-1 checkout of `branch`
    ///
    /// `branch` falls back to the configured default branch. The credential, if any, is only
    /// embedded into the clone URL for configured hosts and only for the lifetime of the git
    /// invocation.
    pub async fn acquire(
        &self,
        repo_url: &str,
        branch: Option<&str>,
        credential: Option<&Credential>,
    ) -> CodelensResult<Workspace> {
        let repo_url = repo_url.trim();
        if repo_url.is_empty() {
            return Err(Box::new(validation_error!(
                "Repository URL must not be empty",
                "repo_url",
                COMPONENT
            )));
        }

        let branch = branch
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.config.default_branch)
            .to_string();
        if branch.starts_with('-') {
            return Err(Box::new(validation_error!(
                format!("Invalid branch name '{}'", branch),
                "branch",
                COMPONENT
            )));
        }

        let source_url = redact_url(repo_url);
        info!(
            repo_url = %source_url,
            branch = %branch,
            authenticated = credential.is_some(),
            "🚀 Starting repository acquisition"
        );

        let workspace_dir = self.create_workspace_dir()?;
        let root_path = workspace_dir.path().to_path_buf();

        if let Err(err) = self
            .clone_repository(repo_url, &branch, credential, &root_path)
            .await
        {
            discard(workspace_dir);
            return Err(err);
        }

        if let Err(err) = self.enforce_size_limit(&root_path).await {
            discard(workspace_dir);
            return Err(err);
        }

        info!(
            repo_url = %source_url,
            branch = %branch,
            root_path = %root_path.display(),
            "✅ Repository acquired"
        );

        Ok(Workspace {
            root_path,
            source_url,
            branch: Some(branch),
            acquired_at: Utc::now(),
            guard: Some(workspace_dir),
        })
    }

    /// Uniquely named directory under the configured parent (or the system temp dir)
    fn create_workspace_dir(&self) -> CodelensResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let created = match &self.config.workspace_dir {
            Some(parent) => std::fs::create_dir_all(parent).and_then(|_| builder.tempdir_in(parent)),
            None => builder.tempdir(),
        };

        created.map_err(|e| {
            Box::new(CodelensError::Internal {
                message: format!("Failed to create workspace directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new(COMPONENT)
                    .with_operation("create_workspace_dir")
                    .with_suggestion("Check that repository.workspace_dir is writable"),
            })
        })
    }

    /// Clone repository using the git command
    async fn clone_repository(
        &self,
        repo_url: &str,
        branch: &str,
        credential: Option<&Credential>,
        target_path: &Path,
    ) -> CodelensResult<()> {
        let clone_url =
            authenticated_url(repo_url, credential, &self.config.credential_hosts)?;

        let mut cmd = Command::new("git");
        cmd.arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--single-branch")
            .arg("--branch")
            .arg(branch)
            .arg("--")
            .arg(&clone_url)
            .arg(target_path)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        drop(clone_url);

        let timeout_ms = self.config.clone_timeout_secs.saturating_mul(1000);
        let output = with_timeout(cmd.output(), timeout_ms, "git_clone")
            .await
            .map_err(|e| CodelensError::Acquisition {
                kind: AcquisitionFailure::Network,
                message: format!("Git clone did not finish within {} ms", timeout_ms),
                source: Some(e),
                context: ErrorContext::new(COMPONENT)
                    .with_operation("clone_repository")
                    .with_suggestion("Increase repository.clone_timeout_secs"),
            })?
            .map_err(|e| CodelensError::Internal {
                message: format!("Failed to execute git clone: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new(COMPONENT)
                    .with_operation("clone_repository")
                    .with_suggestion("Ensure git is installed and accessible"),
            })?;

        if !output.status.success() {
            let stderr = scrub(&String::from_utf8_lossy(&output.stderr), credential);
            let kind = classify_clone_failure(&stderr);
            warn!(kind = %kind, branch = %branch, "Git clone failed");

            return Err(Box::new(CodelensError::Acquisition {
                kind,
                message: format!("Git clone failed: {}", stderr.trim()),
                source: None,
                context: ErrorContext::new(COMPONENT)
                    .with_operation("clone_repository")
                    .with_metadata("branch", branch)
                    .with_suggestion("Check repository URL, branch and access permissions"),
            }));
        }

        debug!(target_path = %target_path.display(), "Clone finished");
        Ok(())
    }

    async fn enforce_size_limit(&self, root_path: &Path) -> CodelensResult<()> {
        let limit = self.config.max_size_bytes();
        let path = root_path.to_path_buf();
        let size = tokio::task::spawn_blocking(move || directory_size(&path))
            .await
            .map_err(|e| CodelensError::Internal {
                message: format!("Size check task failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new(COMPONENT).with_operation("enforce_size_limit"),
            })?;

        debug!(size_bytes = size, limit_bytes = limit, "Workspace size measured");

        if size > limit {
            return Err(Box::new(CodelensError::Acquisition {
                kind: AcquisitionFailure::SizeLimitExceeded,
                message: format!(
                    "Workspace is {} bytes, limit is {} MB",
                    size, self.config.max_size_mb
                ),
                source: None,
                context: ErrorContext::new(COMPONENT)
                    .with_operation("enforce_size_limit")
                    .with_metadata("size_bytes", &size.to_string())
                    .with_suggestion("Raise repository.max_size_mb or pick a smaller repository"),
            }));
        }

        Ok(())
    }
}

/// Best-effort removal of a partially populated workspace; failures are logged, not returned
fn discard(workspace_dir: TempDir) {
    let path = workspace_dir.path().to_path_buf();
    match workspace_dir.close() {
        Ok(()) => debug!(path = %path.display(), "Removed partial workspace"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial workspace"),
    }
}

/// Total size of all regular files below `root`, symlinks not followed
fn directory_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// URL handed to git. The credential goes into the authority component, using the
/// platform's convention, only for http(s) URLs on one of `credential_hosts`.
fn authenticated_url(
    repo_url: &str,
    credential: Option<&Credential>,
    credential_hosts: &[String],
) -> CodelensResult<String> {
    let Some(credential) = credential else {
        return Ok(repo_url.to_string());
    };

    let Ok(mut url) = Url::parse(repo_url) else {
        debug!("Repository location is not a URL, credential not embedded");
        return Ok(repo_url.to_string());
    };

    let host = match url.host_str() {
        Some(host) if is_credential_host(host, credential_hosts) => host.to_string(),
        _ => {
            debug!(host = ?url.host_str(), "Host not eligible for credentials");
            return Ok(repo_url.to_string());
        }
    };

    if !matches!(url.scheme(), "https" | "http") {
        return Ok(repo_url.to_string());
    }

    let (username, password) = match GitHost::detect(&host) {
        GitHost::GitLab => ("oauth2", Some(credential.expose())),
        GitHost::Bitbucket => ("x-token-auth", Some(credential.expose())),
        GitHost::GitHub | GitHost::Other => (credential.expose(), None),
    };

    url.set_username(username)
        .and_then(|_| url.set_password(password))
        .map_err(|_| {
            Box::new(validation_error!(
                "Repository URL cannot carry credentials",
                "repo_url",
                COMPONENT
            ))
        })?;

    Ok(url.to_string())
}

fn is_credential_host(host: &str, credential_hosts: &[String]) -> bool {
    let host = host.to_ascii_lowercase();
    credential_hosts.iter().any(|allowed| {
        let allowed = allowed.to_ascii_lowercase();
        host == allowed || host.ends_with(&format!(".{}", allowed))
    })
}

/// `repo_url` with any userinfo removed, safe to log
pub fn redact_url(repo_url: &str) -> String {
    match Url::parse(repo_url) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.to_string()
        }
        _ => repo_url.to_string(),
    }
}

fn scrub(text: &str, credential: Option<&Credential>) -> String {
    match credential.map(Credential::expose) {
        Some(secret) if !secret.is_empty() => text.replace(secret, "***"),
        _ => text.to_string(),
    }
}

/// Map git's stderr onto a failure kind.
///
/// Hosted platforms answer "repository not found" for private repositories the caller cannot
/// see, so that message counts as an authentication failure.
fn classify_clone_failure(stderr: &str) -> AcquisitionFailure {
    let message = stderr.to_ascii_lowercase();

    const BRANCH_MARKERS: &[&str] = &["not found in upstream", "couldn't find remote ref"];
    const AUTH_MARKERS: &[&str] = &[
        "authentication failed",
        "could not read username",
        "could not read password",
        "terminal prompts disabled",
        "invalid username or password",
        "permission denied",
        "access denied",
        "returned error: 401",
        "returned error: 403",
        "repository not found",
    ];

    if BRANCH_MARKERS.iter().any(|m| message.contains(m))
        || (message.contains("remote branch") && message.contains("not found"))
    {
        AcquisitionFailure::BranchNotFound
    } else if AUTH_MARKERS.iter().any(|m| message.contains(m)) {
        AcquisitionFailure::Auth
    } else {
        AcquisitionFailure::Network
    }
}
