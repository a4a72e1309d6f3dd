//! Fetch strategy interface
//!
//! The remote repository is laid out as `extensions/<name>/package.json`
//! plus sources and assets. Two subsets are ever retrieved: every manifest
//! (for the catalog) or one extension's full tree (for installation).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::binary::check_binary_on_path;
use crate::cli::GitCliFetcher;
use crate::error::Result;
use crate::libgit::Git2Fetcher;
use crate::local::LocalMirrorFetcher;

/// Directory under the repository root that holds one folder per extension.
pub const EXTENSIONS_DIR: &str = "extensions";

/// Where to fetch from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    /// Clone URL, or a local directory path.
    pub url: String,
    /// Branch to check out; the remote default when `None`.
    pub branch: Option<String>,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Whether the URL refers to the network rather than the local disk.
    pub fn is_network(&self) -> bool {
        let url = self.url.as_str();
        (url.contains("://") && !url.starts_with("file://")) || url.starts_with("git@")
    }
}

/// Which subset of the repository to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparseScope {
    /// Only `extensions/*/package.json`.
    Manifests,
    /// The complete `extensions/<name>` tree.
    Extension(String),
}

impl SparseScope {
    /// Repository-relative path of the scope's root.
    pub fn root(&self) -> PathBuf {
        match self {
            SparseScope::Manifests => PathBuf::from(EXTENSIONS_DIR),
            SparseScope::Extension(name) => Path::new(EXTENSIONS_DIR).join(name),
        }
    }

    /// Whether the scope can be served without file contents beyond manifests.
    pub fn is_manifest_only(&self) -> bool {
        matches!(self, SparseScope::Manifests)
    }
}

/// A way of retrieving part of the remote repository into a local directory.
#[async_trait]
pub trait SparseFetcher: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Populate `dest` with `scope` from `source`.
    ///
    /// `dest` must not exist yet. On success the scope's files are found under
    /// `dest.join(scope.root())`.
    async fn fetch(&self, source: &RemoteSource, scope: &SparseScope, dest: &Path) -> Result<()>;
}

/// Choose the fetch strategy for `source`.
///
/// A plain local directory (no `.git`) is read as a mirror. Otherwise the
/// `git` binary is preferred because it supports blob-less sparse clones;
/// libgit2 is the fallback when no binary is installed.
pub fn resolve_fetcher(source: &RemoteSource, timeout: Duration) -> Arc<dyn SparseFetcher> {
    let local = Path::new(&source.url);
    if !source.is_network() && local.is_dir() && !local.join(".git").exists() {
        tracing::debug!("Using local mirror fetcher for {}", source.url);
        return Arc::new(LocalMirrorFetcher::new());
    }

    match check_binary_on_path("git") {
        Ok(git) => {
            tracing::debug!("Using git CLI at {}", git.display());
            Arc::new(GitCliFetcher::new(git, timeout))
        }
        Err(_) => {
            tracing::debug!("git not on PATH, falling back to libgit2");
            Arc::new(Git2Fetcher::new(timeout))
        }
    }
}
