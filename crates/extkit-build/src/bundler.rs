//! Bundler capability
//!
//! Where the bundler binary lives depends on how the host was shipped
//! (packaged next to the executable, installed per extension, or on PATH).
//! [`resolve_bundler`] is the single place that decides; everything else
//! only sees the [`Bundler`] trait.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Default language target for emitted bundles.
pub const DEFAULT_TARGET: &str = "es2020";

#[cfg(windows)]
const ESBUILD_BIN: &str = "esbuild.exe";
#[cfg(not(windows))]
const ESBUILD_BIN: &str = "esbuild";

#[cfg(windows)]
const ESBUILD_SHIM: &str = "esbuild.cmd";
#[cfg(not(windows))]
const ESBUILD_SHIM: &str = "esbuild";

/// Everything a bundler needs to compile one entry point.
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    pub entry: &'a Path,
    /// Directory module resolution starts from (the extension root).
    pub working_dir: &'a Path,
    pub externals: &'a BTreeSet<String>,
    pub target: &'a str,
}

/// Compiles one entry point into a self-contained CommonJS module.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Bundle `request.entry`, returning the emitted code.
    async fn bundle(&self, request: &BundleRequest<'_>) -> Result<Vec<u8>>;
}

/// How to locate and run the bundler.
#[derive(Debug, Clone)]
pub struct BundlerSettings {
    /// Explicitly configured bundler binary.
    pub program: Option<PathBuf>,
    pub target: String,
    pub timeout: Duration,
}

impl Default for BundlerSettings {
    fn default() -> Self {
        Self {
            program: None,
            target: DEFAULT_TARGET.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// The esbuild command-line bundler.
#[derive(Debug, Clone)]
pub struct EsbuildCli {
    program: PathBuf,
    timeout: Duration,
}

impl EsbuildCli {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for `request`. Output goes to stdout.
    pub fn args(request: &BundleRequest<'_>) -> Vec<String> {
        let mut args = vec![
            request.entry.to_string_lossy().into_owned(),
            "--bundle".to_string(),
            "--format=cjs".to_string(),
            "--platform=node".to_string(),
            format!("--target={}", request.target),
            "--jsx=automatic".to_string(),
            "--define:process.env.NODE_ENV=\"production\"".to_string(),
            "--log-level=error".to_string(),
        ];
        args.extend(request.externals.iter().map(|m| format!("--external:{m}")));
        args
    }
}

#[async_trait]
impl Bundler for EsbuildCli {
    fn name(&self) -> &'static str {
        "esbuild"
    }

    async fn bundle(&self, request: &BundleRequest<'_>) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::args(request))
            .current_dir(request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout {
                entry: request.entry.to_path_buf(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::BundleFailed {
                entry: request.entry.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// Candidate locations for a bundler binary shipped with the host.
fn packaged_candidates() -> Vec<PathBuf> {
    let Ok(exe) = std::env::current_exe() else {
        return Vec::new();
    };
    let Some(dir) = exe.parent() else {
        return Vec::new();
    };
    vec![
        dir.join("resources").join(ESBUILD_BIN),
        dir.join(ESBUILD_BIN),
    ]
}

/// Locate the bundler binary for the extension at `ext_path`.
///
/// Order: configured path, packaged next to the executable, the extension's
/// own `node_modules/.bin`, then PATH.
pub fn locate_bundler(settings: &BundlerSettings, ext_path: &Path) -> Result<PathBuf> {
    if let Some(program) = &settings.program {
        if program.is_file() {
            return Ok(program.clone());
        }
        tracing::warn!(
            "Configured bundler {} does not exist, searching elsewhere",
            program.display()
        );
    }

    let local = ext_path.join("node_modules").join(".bin").join(ESBUILD_SHIM);
    packaged_candidates()
        .into_iter()
        .chain(std::iter::once(local))
        .find(|candidate| candidate.is_file())
        .map(Ok)
        .unwrap_or_else(|| {
            extkit_git::check_binary_on_path("esbuild").map_err(|e| Error::BundlerUnavailable {
                hint: e.to_string(),
            })
        })
}

/// Resolve the bundler capability for the extension at `ext_path`.
pub fn resolve_bundler(settings: &BundlerSettings, ext_path: &Path) -> Result<Arc<dyn Bundler>> {
    let program = locate_bundler(settings, ext_path)?;
    tracing::debug!("Using bundler at {}", program.display());
    Ok(Arc::new(EsbuildCli::new(program, settings.timeout)))
}
