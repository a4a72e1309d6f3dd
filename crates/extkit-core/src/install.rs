//! Install and uninstall into the managed extension root
//!
//! An install fetches one extension's tree into a scratch workspace, checks
//! its manifest, then replaces the installed copy through a [`StagedSwap`]:
//! copy, dependency install and pre-build all happen after the previous
//! install was moved aside, and any failure restores it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use extkit_build::BuildEngine;
use extkit_fs::{
    StagedSwap, copy_dir_all, normalize_extension_name, remove_stale_backups,
    validate_path_identifier,
};
use extkit_git::{RemoteSource, SparseFetcher, SparseScope};
use extkit_manifest::{ExtensionManifest, Platform, is_compatible};

use crate::deps::{DependencyOutcome, PackageManager, install_dependencies};
use crate::error::{Error, Result};

/// What a successful install did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub name: String,
    pub path: PathBuf,
    /// Whether an earlier install was replaced.
    pub replaced: bool,
    pub dependencies: DependencyOutcome,
    /// Commands that produced an artifact during the pre-build.
    pub built_commands: usize,
}

/// Owns the managed install root.
pub struct Installer {
    extensions_dir: PathBuf,
    source: RemoteSource,
    fetcher: Arc<dyn SparseFetcher>,
    package_manager: Option<Arc<dyn PackageManager>>,
    build: Arc<BuildEngine>,
    platform: Platform,
}

/// Validate and normalize a user-supplied extension name.
pub fn managed_name(name: &str) -> Result<String> {
    let normalized = name.trim().to_lowercase();
    validate_path_identifier(&normalized, "extension name")
        .map_err(|message| Error::InvalidName { message })?;
    Ok(normalized)
}

impl Installer {
    pub fn new(
        extensions_dir: impl Into<PathBuf>,
        source: RemoteSource,
        fetcher: Arc<dyn SparseFetcher>,
        package_manager: Option<Arc<dyn PackageManager>>,
        build: Arc<BuildEngine>,
        platform: Platform,
    ) -> Self {
        Self {
            extensions_dir: extensions_dir.into(),
            source,
            fetcher,
            package_manager,
            build,
            platform,
        }
    }

    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    /// Install or reinstall `name`. Returns `false` on any failure, in which
    /// case the previous install is left exactly as it was.
    pub async fn install_extension(&self, name: &str) -> bool {
        match self.try_install_extension(name).await {
            Ok(report) => {
                tracing::info!(
                    "Installed '{}' ({} commands built, dependencies: {:?})",
                    report.name,
                    report.built_commands,
                    report.dependencies
                );
                true
            }
            Err(e) => {
                tracing::warn!("Install of '{}' failed: {}", name, e);
                false
            }
        }
    }

    pub async fn try_install_extension(&self, name: &str) -> Result<InstallReport> {
        let name = managed_name(name)?;
        let target = self.extensions_dir.join(&name);
        let replaced = target.exists();

        // Removed on drop, on every return path.
        let workspace = tempfile::Builder::new()
            .prefix("extkit-install-")
            .tempdir()?;
        let checkout = workspace.path().join("checkout");
        let scope = SparseScope::Extension(name.clone());

        tracing::debug!("Fetching '{}' with {}", name, self.fetcher.name());
        self.fetcher.fetch(&self.source, &scope, &checkout).await?;
        let fetched = checkout.join(scope.root());

        let manifest = ExtensionManifest::from_dir(&fetched, self.platform)?;
        // Discovery and the build cache key on the manifest name.
        if normalize_extension_name(&manifest.name).as_deref() != Some(name.as_str()) {
            return Err(Error::NameMismatch {
                requested: name.clone(),
                declared: manifest.name.clone(),
            });
        }
        if !is_compatible(&manifest, None, self.platform) {
            return Err(Error::Incompatible {
                name: name.clone(),
                platform: self.platform.to_string(),
            });
        }

        let swap = StagedSwap::begin(&target)?;
        // The pre-build wipes the cache, so it is staged alongside the tree.
        let cache_swap = StagedSwap::begin(self.build.cache_dir(&name))?;
        let staged = self.populate(&name, &fetched, &target, &manifest).await;

        let resolved = match staged {
            Ok((dependencies, built_commands)) => {
                for done in [swap.commit(), cache_swap.commit()] {
                    if let Err(e) = done {
                        tracing::warn!("Could not discard backup of '{}': {}", name, e);
                    }
                }
                Ok(InstallReport {
                    name: name.clone(),
                    path: target,
                    replaced,
                    dependencies,
                    built_commands,
                })
            }
            Err(e) => match swap.rollback().and(cache_swap.rollback()) {
                Ok(()) => Err(e),
                Err(rollback) => {
                    // The backup is now the only copy; leave it for manual recovery.
                    tracing::warn!("Rollback of '{}' failed: {}", name, rollback);
                    return Err(e);
                }
            },
        };

        for parent in [self.extensions_dir.clone(), self.build.cache_root().to_path_buf()] {
            match remove_stale_backups(&parent, &name) {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Removed {} stale backups of '{}'", n, name),
                Err(e) => tracing::warn!("Could not remove stale backups of '{}': {}", name, e),
            }
        }
        resolved
    }

    /// Steps that run after the previous install was moved aside.
    async fn populate(
        &self,
        name: &str,
        fetched: &Path,
        target: &Path,
        manifest: &ExtensionManifest,
    ) -> Result<(DependencyOutcome, usize)> {
        copy_dir_all(fetched, target)?;
        let dependencies =
            install_dependencies(self.package_manager.as_deref(), target, manifest).await;
        let built = self.build.build_all_commands(name, target).await?;
        Ok((dependencies, built))
    }

    /// Remove `name` from the managed root along with its build cache.
    /// Removing an absent extension succeeds.
    pub async fn uninstall_extension(&self, name: &str) -> bool {
        match self.try_uninstall_extension(name) {
            Ok(removed) => {
                if removed {
                    tracing::info!("Uninstalled '{}'", name);
                }
                true
            }
            Err(e) => {
                tracing::warn!("Uninstall of '{}' failed: {}", name, e);
                false
            }
        }
    }

    /// Returns whether anything was removed.
    pub fn try_uninstall_extension(&self, name: &str) -> Result<bool> {
        let name = managed_name(name)?;
        let removed = extkit_fs::io::remove_dir_if_exists(&self.extensions_dir.join(&name))?;
        self.build.clear_cache(&name)?;
        remove_stale_backups(&self.extensions_dir, &name)?;
        remove_stale_backups(self.build.cache_root(), &name)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Weather", "weather")]
    #[case("  notes ", "notes")]
    fn names_are_normalized(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(managed_name(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("../etc")]
    #[case(".hidden")]
    #[case("a/b")]
    fn unsafe_names_are_rejected(#[case] input: &str) {
        assert!(matches!(managed_name(input), Err(Error::InvalidName { .. })));
    }
}
