//! Common test utilities for repository pipeline tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("codelens=debug,info")
            .with_test_writer()
            .try_init();
    });
}

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A small polyglot project with an ignored vendor tree and a few manifests
pub fn sample_project(root: &Path) {
    write_file(root, "README.md", "# sample\n\nA fixture.\n");
    write_file(root, "src/main.py", "import app\n\napp.run()\n");
    write_file(root, "src/app.py", "def run():\n    pass\n");
    write_file(root, "src/lib/util.ts", "export const x = 1;\n");
    write_file(root, "web/index.js", "console.log('hi')\n");
    write_file(root, "cmd/tool/main.go", "package main\n\nfunc main() {}\n");
    write_file(root, "vendor/main.py", "raise SystemExit\n");
    write_file(root, "vendor/deeply/nested/file.go", "package nested\n");
    write_file(root, "node_modules/left-pad/index.js", "module.exports = 1\n");
    write_file(root, "Makefile", "all:\n\tpython src/main.py\n");
    write_file(
        root,
        "package.json",
        r#"{"name": "sample", "dependencies": {"express": "^4.18.2"}, "devDependencies": {"jest": "^29.0.0"}}"#,
    );
    write_file(root, "requirements.txt", "flask==3.0.0\nrequests\n");
}

/// Whether a usable `git` binary is on the PATH
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(["-c", "user.name=Codelens Tests", "-c", "user.email=tests@example.com"])
        .args(["-c", "init.defaultBranch=main", "-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a git repository with one commit on `main` containing the sample project
pub fn sample_git_repository(dir: &Path) {
    sample_project(dir);
    git(dir, &["init", "--quiet"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["add", "--all"]);
    git(dir, &["commit", "--quiet", "-m", "initial"]);
}

/// `file://` URL for a local path
pub fn file_url(path: &Path) -> String {
    url::Url::from_file_path(path)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("file://{}", path.display()))
}

/// Number of entries directly inside `dir`
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
}
