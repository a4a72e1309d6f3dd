//! Blob-less sparse clones through the `git` binary

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::fetch::{EXTENSIONS_DIR, RemoteSource, SparseFetcher, SparseScope};

/// Fetcher driving the `git` CLI.
///
/// Clones are shallow (`--depth 1`), blob-less (`--filter=blob:none`) and
/// sparse, so only the blobs inside the requested scope are downloaded.
#[derive(Debug, Clone)]
pub struct GitCliFetcher {
    git: PathBuf,
    timeout: Duration,
}

impl GitCliFetcher {
    pub fn new(git: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            git: git.into(),
            timeout,
        }
    }

    /// Arguments for the initial clone.
    fn clone_args(source: &RemoteSource, dest: &Path) -> Vec<String> {
        let mut args = vec![
            "clone".to_string(),
            "--depth".to_string(),
            "1".to_string(),
            "--filter=blob:none".to_string(),
            "--sparse".to_string(),
            "--single-branch".to_string(),
        ];
        if let Some(branch) = &source.branch {
            args.push("--branch".to_string());
            args.push(branch.clone());
        }
        args.push(clone_url(&source.url));
        args.push(dest.to_string_lossy().into_owned());
        args
    }

    /// Arguments narrowing the working tree to `scope`.
    fn sparse_args(scope: &SparseScope) -> Vec<String> {
        match scope {
            SparseScope::Manifests => vec![
                "sparse-checkout".to_string(),
                "set".to_string(),
                "--no-cone".to_string(),
                format!("/{}/*/package.json", EXTENSIONS_DIR),
            ],
            SparseScope::Extension(name) => vec![
                "sparse-checkout".to_string(),
                "set".to_string(),
                format!("{}/{}", EXTENSIONS_DIR, name),
            ],
        }
    }

    async fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<()> {
        let display = format!("git {}", args.first().map(String::as_str).unwrap_or(""));
        let mut cmd = Command::new(&self.git);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!("Running {:?}", args);
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout {
                operation: display.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|_| Error::CommandNotFound {
                command: self.git.display().to_string(),
                hint: None,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: display,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Local paths are turned into `file://` URLs so `--depth` is honoured.
fn clone_url(url: &str) -> String {
    let path = Path::new(url);
    if !url.contains("://") && path.is_absolute() && path.exists() {
        format!("file://{}", url.replace('\\', "/"))
    } else {
        url.to_string()
    }
}

#[async_trait]
impl SparseFetcher for GitCliFetcher {
    fn name(&self) -> &'static str {
        "git-cli"
    }

    async fn fetch(&self, source: &RemoteSource, scope: &SparseScope, dest: &Path) -> Result<()> {
        self.run(&Self::clone_args(source, dest), None).await?;
        self.run(&Self::sparse_args(scope), Some(dest)).await?;

        let root = dest.join(scope.root());
        if !root.exists() {
            return Err(Error::MissingInRemote {
                path: scope.root(),
                source_url: source.url.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clone_args_are_shallow_blobless_sparse() {
        let source = RemoteSource::new("https://example.com/ext.git").with_branch("main");
        let args = GitCliFetcher::clone_args(&source, Path::new("/tmp/ws"));
        assert_eq!(
            args,
            vec![
                "clone",
                "--depth",
                "1",
                "--filter=blob:none",
                "--sparse",
                "--single-branch",
                "--branch",
                "main",
                "https://example.com/ext.git",
                "/tmp/ws",
            ]
        );
    }

    #[test]
    fn manifest_scope_uses_non_cone_pattern() {
        let args = GitCliFetcher::sparse_args(&SparseScope::Manifests);
        assert_eq!(args.last().unwrap(), "/extensions/*/package.json");
        assert!(args.contains(&"--no-cone".to_string()));
    }

    #[test]
    fn extension_scope_uses_cone_directory() {
        let args = GitCliFetcher::sparse_args(&SparseScope::Extension("weather".into()));
        assert_eq!(args, vec!["sparse-checkout", "set", "extensions/weather"]);
    }

    #[test]
    fn network_urls_pass_through() {
        assert_eq!(
            clone_url("https://example.com/ext.git"),
            "https://example.com/ext.git"
        );
    }
}
