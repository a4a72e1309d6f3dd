//! Shared harness for extkit-core integration tests.
//!
//! Every strategy is replaced by an offline double: the remote is a local
//! [`RemoteFixture`], bundling wraps the entry source, and package installs
//! are only recorded.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use extkit_build::{BundleRequest, Bundler};
use extkit_core::{ExtensionManager, ExtkitConfig, PackageManager, Services};
use extkit_git::{LocalMirrorFetcher, RemoteSource, SparseFetcher, SparseScope};
use extkit_manifest::Platform;
use extkit_test_utils::RemoteFixture;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const ASSET_BASE: &str = "https://assets.test/raycast/";
/// Nothing listens on the discard port, so listing requests fail fast.
pub const UNREACHABLE_LISTING: &str = "http://127.0.0.1:9/contents/";
pub const ENTRY_SOURCE: &str = "export default function Command() { return null; }";

/// Local mirror fetcher that counts calls and can be told to fail or to
/// plant a dangling symlink in fetched extension trees.
#[derive(Default)]
pub struct CountingFetcher {
    inner: LocalMirrorFetcher,
    calls: AtomicUsize,
    pub fail: AtomicBool,
    pub plant_dangling_symlink: AtomicBool,
}

impl CountingFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SparseFetcher for CountingFetcher {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn fetch(
        &self,
        source: &RemoteSource,
        scope: &SparseScope,
        dest: &Path,
    ) -> extkit_git::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(extkit_git::Error::CommandFailed {
                command: "fetch".to_string(),
                code: Some(128),
                stderr: "network unreachable".to_string(),
            });
        }
        self.inner.fetch(source, scope, dest).await?;

        #[cfg(unix)]
        if !scope.is_manifest_only() && self.plant_dangling_symlink.load(Ordering::SeqCst) {
            std::os::unix::fs::symlink(
                dest.join("does-not-exist"),
                dest.join(scope.root()).join("broken-link"),
            )
            .unwrap();
        }
        Ok(())
    }
}

/// Bundler that emits the entry source behind a CommonJS header.
#[derive(Default)]
pub struct FakeBundler {
    calls: AtomicUsize,
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

    async fn bundle(&self, request: &BundleRequest<'_>) -> extkit_build::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let source = fs::read_to_string(request.entry).unwrap();
        Ok(format!("\"use strict\";\n{source}\n").into_bytes())
    }
}

/// Package manager that records requests and fails on demand.
#[derive(Default)]
pub struct FakePackageManager {
    pub explicit: Mutex<Vec<Vec<String>>>,
    pub declared_calls: AtomicUsize,
    pub fail_explicit: AtomicBool,
    pub fail_declared: AtomicBool,
}

impl FakePackageManager {
    fn failure(cwd: &Path) -> extkit_core::Error {
        extkit_core::Error::DependencyInstall {
            path: cwd.to_path_buf(),
            message: "E404".to_string(),
        }
    }
}

#[async_trait]
impl PackageManager for FakePackageManager {
    fn name(&self) -> &'static str {
        "fake-npm"
    }

    async fn install_packages(&self, cwd: &Path, packages: &[String]) -> extkit_core::Result<()> {
        self.explicit.lock().unwrap().push(packages.to_vec());
        if self.fail_explicit.load(Ordering::SeqCst) {
            return Err(Self::failure(cwd));
        }
        Ok(())
    }

    async fn install_declared(&self, cwd: &Path) -> extkit_core::Result<()> {
        self.declared_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_declared.load(Ordering::SeqCst) {
            return Err(Self::failure(cwd));
        }
        Ok(())
    }
}

/// A remote, a data directory and recording doubles.
pub struct TestEnv {
    pub remote: RemoteFixture,
    pub data: TempDir,
    pub fetcher: Arc<CountingFetcher>,
    pub bundler: Arc<FakeBundler>,
    pub packages: Arc<FakePackageManager>,
    pub config: ExtkitConfig,
    pub platform: Platform,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let remote = RemoteFixture::new();
        let data = TempDir::new().unwrap();
        let mut config = ExtkitConfig::with_data_dir(data.path());
        config.remote.repository = remote.url();
        config.remote.branch = None;
        config.remote.asset_base_url = ASSET_BASE.to_string();
        config.remote.listing_base_url = UNREACHABLE_LISTING.to_string();
        config.timeouts.http_secs = 5;

        Self {
            remote,
            data,
            fetcher: Arc::new(CountingFetcher::default()),
            bundler: Arc::new(FakeBundler::default()),
            packages: Arc::new(FakePackageManager::default()),
            config,
            platform: Platform::Linux,
        }
    }

    pub fn services(&self) -> Services {
        Services {
            fetcher: self.fetcher.clone(),
            package_manager: Some(self.packages.clone()),
            bundler: Some(self.bundler.clone()),
            platform: self.platform,
        }
    }

    /// A fresh manager over the same data directory.
    pub fn manager(&self) -> ExtensionManager {
        ExtensionManager::new(self.config.clone(), self.services()).unwrap()
    }

    pub fn data_dir(&self) -> &Path {
        self.data.path()
    }

    pub fn installed_path(&self, name: &str) -> PathBuf {
        self.data_dir().join("extensions").join(name)
    }

    /// Publish an extension with one source file per command.
    pub fn publish(&self, manifest: &Value) {
        let name = manifest["name"].as_str().unwrap();
        self.remote.add_extension(manifest);
        if let Some(commands) = manifest["commands"].as_array() {
            for command in commands {
                let cmd = command["name"].as_str().unwrap();
                self.remote
                    .add_source(name, &format!("src/{cmd}.tsx"), ENTRY_SOURCE);
            }
        }
    }
}

/// The weather extension used across tests.
pub fn weather_manifest() -> Value {
    json!({
        "name": "weather",
        "title": "Weather",
        "description": "Forecasts",
        "icon": "icon.png",
        "author": { "name": "ana", "email": "ana@example.com" },
        "preferences": [
            { "name": "units", "type": "dropdown", "default": "metric",
              "data": [{ "title": "Metric", "value": "metric" }, { "title": "Imperial", "value": "imperial" }] },
            { "name": "apiKey", "type": "password", "required": true },
            { "name": "cacheDir", "type": "directory",
              "default": { "macOS": "~/Library/Caches", "Windows": "C:\\Cache", "Linux": "~/.cache" } }
        ],
        "commands": [
            { "name": "forecast", "title": "Forecast", "description": "Daily forecast",
              "keywords": ["Rain"],
              "preferences": [{ "name": "units", "default": "imperial" }],
              "arguments": [{ "name": "city", "type": "text", "required": true, "placeholder": "City" }] },
            { "name": "radar", "title": "Radar", "mode": "no-view" },
            { "name": "alerts" }
        ],
        "dependencies": { "@raycast/api": "^1.70.0", "date-fns": "^3.0.0" }
    })
}

/// Relative path to file contents for every file under `root`.
pub fn tree_snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Names of the entries directly inside `dir`, sorted.
pub fn dir_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
