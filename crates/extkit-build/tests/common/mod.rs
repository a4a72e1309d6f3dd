//! Shared helpers for extkit-build integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use extkit_build::{BuildEngine, BundleRequest, Bundler, BundlerSettings, Error, Result};
use serde_json::Value;
use tempfile::TempDir;

/// Marker that makes [`FakeBundler`] fail for an entry.
pub const BROKEN_MARKER: &str = "// @broken";

/// Bundler that wraps the entry source in a CommonJS header instead of
/// running esbuild.
#[derive(Default)]
pub struct FakeBundler {
    pub calls: AtomicUsize,
}

impl FakeBundler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn bundle(&self, request: &BundleRequest<'_>) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let source = fs::read_to_string(request.entry).unwrap();
        if source.contains(BROKEN_MARKER) {
            return Err(Error::BundleFailed {
                entry: request.entry.to_path_buf(),
                code: Some(1),
                stderr: "syntax error".to_string(),
            });
        }
        Ok(format!("\"use strict\";\n// {}\n{}", request.target, source).into_bytes())
    }
}

/// An installed extension plus a build cache, both temporary.
pub struct Workspace {
    _temp: TempDir,
    pub ext_path: PathBuf,
    pub cache_root: PathBuf,
}

impl Workspace {
    pub fn new(manifest: &Value) -> Self {
        let temp = TempDir::new().unwrap();
        let ext_path = temp.path().join("extensions").join(manifest["name"].as_str().unwrap());
        let cache_root = temp.path().join("build");
        fs::create_dir_all(&ext_path).unwrap();
        fs::write(
            ext_path.join("package.json"),
            serde_json::to_string_pretty(manifest).unwrap(),
        )
        .unwrap();
        Self {
            _temp: temp,
            ext_path,
            cache_root,
        }
    }

    pub fn source(&self, relative: &str, content: &str) -> &Self {
        write(&self.ext_path.join(relative), content);
        self
    }

    pub fn engine(&self, bundler: Arc<FakeBundler>) -> BuildEngine {
        BuildEngine::new(&self.cache_root, BundlerSettings::default()).with_bundler(bundler)
    }
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
