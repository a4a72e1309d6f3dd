//! Path-restricted clones through libgit2
//!
//! libgit2 cannot filter blobs, so every object of the shallow commit is
//! transferred; only the checkout is restricted to the requested scope.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::FetchOptions;

use crate::error::{Error, Result};
use crate::fetch::{EXTENSIONS_DIR, RemoteSource, SparseFetcher, SparseScope};

/// Fetcher used when no `git` binary is available.
#[derive(Debug, Clone)]
pub struct Git2Fetcher {
    timeout: Duration,
}

impl Git2Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Checkout pathspecs for `scope`.
    fn pathspecs(scope: &SparseScope) -> Vec<String> {
        match scope {
            SparseScope::Manifests => vec![format!("{}/*/package.json", EXTENSIONS_DIR)],
            SparseScope::Extension(name) => vec![format!("{}/{}", EXTENSIONS_DIR, name)],
        }
    }
}

fn clone_restricted(source: &RemoteSource, scope: &SparseScope, dest: &Path) -> Result<()> {
    let mut fetch = FetchOptions::new();
    // libgit2's local transport cannot serve shallow fetches.
    if source.is_network() {
        fetch.depth(1);
    }

    let mut checkout = CheckoutBuilder::new();
    for spec in Git2Fetcher::pathspecs(scope) {
        checkout.path(spec);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch).with_checkout(checkout);
    if let Some(branch) = &source.branch {
        builder.branch(branch);
    }
    builder.clone(&source.url, dest)?;
    Ok(())
}

#[async_trait]
impl SparseFetcher for Git2Fetcher {
    fn name(&self) -> &'static str {
        "libgit2"
    }

    async fn fetch(&self, source: &RemoteSource, scope: &SparseScope, dest: &Path) -> Result<()> {
        let task_source = source.clone();
        let task_scope = scope.clone();
        let task_dest: PathBuf = dest.to_path_buf();
        let handle = tokio::task::spawn_blocking(move || {
            clone_restricted(&task_source, &task_scope, &task_dest)
        });

        tokio::time::timeout(self.timeout, handle)
            .await
            .map_err(|_| Error::Timeout {
                operation: format!("libgit2 clone of {}", source.url),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| Error::Join(e.to_string()))??;

        if !dest.join(scope.root()).exists() {
            return Err(Error::MissingInRemote {
                path: scope.root(),
                source_url: source.url.clone(),
            });
        }
        Ok(())
    }
}
