//! Reading a plain directory laid out like the remote repository

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use extkit_fs::copy_dir_all;

use crate::error::{Error, Result};
use crate::fetch::{EXTENSIONS_DIR, RemoteSource, SparseFetcher, SparseScope};

const MANIFEST: &str = "package.json";

/// Fetcher for an on-disk mirror such as an unpacked archive of the
/// repository. Useful offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct LocalMirrorFetcher;

impl LocalMirrorFetcher {
    pub fn new() -> Self {
        Self
    }
}

fn copy_manifests(mirror: &Path, dest: &Path) -> Result<()> {
    let src_root = mirror.join(EXTENSIONS_DIR);
    let dest_root = dest.join(EXTENSIONS_DIR);
    fs::create_dir_all(&dest_root).map_err(|e| extkit_fs::Error::io(&dest_root, e))?;

    let entries = fs::read_dir(&src_root).map_err(|e| extkit_fs::Error::io(&src_root, e))?;
    for entry in entries.flatten() {
        let manifest = entry.path().join(MANIFEST);
        if !manifest.is_file() {
            continue;
        }
        let target_dir = dest_root.join(entry.file_name());
        fs::create_dir_all(&target_dir).map_err(|e| extkit_fs::Error::io(&target_dir, e))?;
        fs::copy(&manifest, target_dir.join(MANIFEST))
            .map_err(|e| extkit_fs::Error::io(&manifest, e))?;
    }
    Ok(())
}

#[async_trait]
impl SparseFetcher for LocalMirrorFetcher {
    fn name(&self) -> &'static str {
        "local-mirror"
    }

    async fn fetch(&self, source: &RemoteSource, scope: &SparseScope, dest: &Path) -> Result<()> {
        let mirror = Path::new(source.url.trim_start_matches("file://"));
        let scope_root = mirror.join(scope.root());
        if !scope_root.is_dir() {
            return Err(Error::MissingInRemote {
                path: scope.root(),
                source_url: source.url.clone(),
            });
        }

        match scope {
            SparseScope::Manifests => copy_manifests(mirror, dest)?,
            SparseScope::Extension(_) => {
                copy_dir_all(&scope_root, &dest.join(scope.root()))?;
            }
        }
        Ok(())
    }
}
