//! Runtime dependency installation
//!
//! Declared dependencies are installed first with an explicit, minimal
//! install. When that fails a broad best-effort install runs instead. A
//! failure of both leaves the extension degraded but installed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use extkit_build::externals::SHIM_PREFIX;
use extkit_manifest::ExtensionManifest;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Installs packages into an extension directory.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Install exactly `packages` (`name@version` specs) into `cwd`.
    async fn install_packages(&self, cwd: &Path, packages: &[String]) -> Result<()>;

    /// Install whatever the manifest in `cwd` declares.
    async fn install_declared(&self, cwd: &Path) -> Result<()>;
}

/// The npm command-line client.
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: PathBuf,
    timeout: Duration,
}

impl NpmCli {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Locate `npm` on PATH.
    pub fn resolve(timeout: Duration) -> Result<Self> {
        let program = extkit_git::check_binary_on_path("npm")?;
        Ok(Self::new(program, timeout))
    }

    pub fn explicit_args(packages: &[String]) -> Vec<String> {
        let mut args: Vec<String> = [
            "install",
            "--no-save",
            "--no-package-lock",
            "--legacy-peer-deps",
            "--no-audit",
            "--no-fund",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.extend(packages.iter().cloned());
        args
    }

    pub fn fallback_args() -> Vec<String> {
        [
            "install",
            "--omit=dev",
            "--legacy-peer-deps",
            "--no-audit",
            "--no-fund",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    async fn run(&self, cwd: &Path, args: &[String]) -> Result<()> {
        tracing::debug!("Running npm {:?} in {}", args, cwd.display());
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::DependencyInstall {
                path: cwd.to_path_buf(),
                message: format!("timed out after {}s", self.timeout.as_secs()),
            })?
            .map_err(|e| Error::io(&self.program, e))?;

        if !output.status.success() {
            return Err(Error::DependencyInstall {
                path: cwd.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PackageManager for NpmCli {
    fn name(&self) -> &'static str {
        "npm"
    }

    async fn install_packages(&self, cwd: &Path, packages: &[String]) -> Result<()> {
        self.run(cwd, &Self::explicit_args(packages)).await
    }

    async fn install_declared(&self, cwd: &Path) -> Result<()> {
        self.run(cwd, &Self::fallback_args()).await
    }
}

/// Declared runtime dependencies as `name@version`, without the host's
/// shim family.
pub fn runtime_dependencies(manifest: &ExtensionManifest) -> Vec<String> {
    manifest
        .dependencies
        .iter()
        .filter(|(name, _)| !name.starts_with(SHIM_PREFIX))
        .map(|(name, version)| {
            if version.trim().is_empty() {
                name.clone()
            } else {
                format!("{}@{}", name, version.trim())
            }
        })
        .collect()
}

/// How dependency installation went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOutcome {
    /// Nothing to install.
    NotNeeded,
    /// The explicit install succeeded.
    Explicit,
    /// The explicit install failed; the broad install succeeded.
    Fallback,
    /// Neither install succeeded. The extension may fail at runtime.
    Degraded,
}

/// Install the runtime dependencies of the extension at `ext_path`.
///
/// Never fails; problems downgrade the outcome and are logged.
pub async fn install_dependencies(
    package_manager: Option<&dyn PackageManager>,
    ext_path: &Path,
    manifest: &ExtensionManifest,
) -> DependencyOutcome {
    let packages = runtime_dependencies(manifest);
    if packages.is_empty() {
        return DependencyOutcome::NotNeeded;
    }
    let Some(pm) = package_manager else {
        tracing::warn!(
            "No package manager available; '{}' installed without its {} dependencies",
            manifest.name,
            packages.len()
        );
        return DependencyOutcome::Degraded;
    };

    match pm.install_packages(ext_path, &packages).await {
        Ok(()) => return DependencyOutcome::Explicit,
        Err(e) => tracing::warn!(
            "Explicit {} install failed for '{}', trying a broad install: {}",
            pm.name(),
            manifest.name,
            e
        ),
    }

    match pm.install_declared(ext_path).await {
        Ok(()) => DependencyOutcome::Fallback,
        Err(e) => {
            tracing::warn!(
                "Dependencies of '{}' are incomplete, continuing: {}",
                manifest.name,
                e
            );
            DependencyOutcome::Degraded
        }
    }
}
