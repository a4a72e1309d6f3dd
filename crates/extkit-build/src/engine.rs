//! Per-command build engine
//!
//! Each command compiles independently into `<cache_root>/<extension>/<command>.js`.
//! Artifacts are written to a temporary sibling and renamed into place, so a
//! reader only ever sees a complete file or none.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use extkit_fs::checksum::compute_file_checksum;
use extkit_fs::io::{remove_dir_if_exists, write_atomic};
use extkit_fs::validate_path_identifier;
use extkit_manifest::{CommandManifest, ExtensionManifest, Platform, is_command_compatible};

use crate::bundler::{BundleRequest, Bundler, BundlerSettings, resolve_bundler};
use crate::entry::resolve_entry_file;
use crate::error::{Error, Result};
use crate::externals::external_modules;

/// File extension of emitted artifacts.
pub const ARTIFACT_EXTENSION: &str = "js";

/// Compiles command entry points into the build cache.
pub struct BuildEngine {
    cache_root: PathBuf,
    settings: BundlerSettings,
    platform: Platform,
    bundler: Option<Arc<dyn Bundler>>,
}

impl BuildEngine {
    /// Create an engine writing under `cache_root`, resolving the bundler per
    /// extension from `settings`.
    pub fn new(cache_root: impl Into<PathBuf>, settings: BundlerSettings) -> Self {
        Self {
            cache_root: cache_root.into(),
            settings,
            platform: Platform::current(),
            bundler: None,
        }
    }

    /// Use `bundler` for every build instead of resolving one.
    pub fn with_bundler(mut self, bundler: Arc<dyn Bundler>) -> Self {
        self.bundler = Some(bundler);
        self
    }

    /// Evaluate compatibility against `platform` instead of the running OS.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Build-cache directory owned by this engine for `extension`.
    pub fn cache_dir(&self, extension: &str) -> PathBuf {
        self.cache_root.join(extension)
    }

    /// Where the artifact for `command` of `extension` lives.
    pub fn artifact_path(&self, extension: &str, command: &str) -> PathBuf {
        self.cache_dir(extension)
            .join(format!("{command}.{ARTIFACT_EXTENSION}"))
    }

    /// Checksum of an existing artifact, `None` when it is absent.
    pub fn artifact_checksum(&self, extension: &str, command: &str) -> Option<String> {
        compute_file_checksum(&self.artifact_path(extension, command)).ok()
    }

    /// Remove the whole build cache of `extension`.
    pub fn clear_cache(&self, extension: &str) -> Result<bool> {
        Ok(remove_dir_if_exists(&self.cache_dir(extension))?)
    }

    fn bundler_for(&self, ext_path: &Path) -> Result<Arc<dyn Bundler>> {
        match &self.bundler {
            Some(bundler) => Ok(Arc::clone(bundler)),
            None => resolve_bundler(&self.settings, ext_path),
        }
    }

    /// Rebuild every compatible command of the extension at `ext_path`.
    ///
    /// The cache directory is wiped first. Commands whose entry cannot be
    /// resolved or whose bundle fails are skipped with a warning. Returns the
    /// number of commands that produced a non-empty artifact.
    pub async fn build_all_commands(&self, extension: &str, ext_path: &Path) -> Result<usize> {
        let manifest = ExtensionManifest::from_dir(ext_path, self.platform)?;
        validate_identifier(extension)?;

        let cache_dir = self.cache_dir(extension);
        remove_dir_if_exists(&cache_dir)?;
        fs::create_dir_all(&cache_dir).map_err(|e| extkit_fs::Error::io(&cache_dir, e))?;

        let mut built = 0;
        for command in &manifest.commands {
            if !is_command_compatible(&manifest, command, self.platform) {
                tracing::debug!("Skipping '{}': not available on {}", command.name, self.platform);
                continue;
            }
            match self.compile(extension, ext_path, &manifest, command).await {
                Ok(path) => {
                    tracing::debug!("Built {}", path.display());
                    built += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping command '{}' of '{}': {}", command.name, extension, e)
                }
            }
        }

        tracing::info!(
            "Built {}/{} commands for '{}'",
            built,
            manifest.commands.len(),
            extension
        );
        Ok(built)
    }

    /// Build one command without touching its siblings' artifacts.
    pub async fn try_build_single_command(
        &self,
        extension: &str,
        ext_path: &Path,
        command: &str,
    ) -> Result<PathBuf> {
        let manifest = ExtensionManifest::from_dir(ext_path, self.platform)?;
        validate_identifier(extension)?;
        let cmd = manifest.command(command).ok_or_else(|| Error::UnknownCommand {
            extension: extension.to_string(),
            command: command.to_string(),
        })?;
        if !is_command_compatible(&manifest, cmd, self.platform) {
            return Err(Error::Incompatible {
                command: command.to_string(),
            });
        }
        self.compile(extension, ext_path, &manifest, cmd).await
    }

    /// On-demand build of a single command. Failures are logged.
    pub async fn build_single_command(&self, extension: &str, ext_path: &Path, command: &str) -> bool {
        match self.try_build_single_command(extension, ext_path, command).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Failed to build '{}' of '{}': {}", command, extension, e);
                false
            }
        }
    }

    async fn compile(
        &self,
        extension: &str,
        ext_path: &Path,
        manifest: &ExtensionManifest,
        command: &CommandManifest,
    ) -> Result<PathBuf> {
        validate_identifier(&command.name)?;
        let entry = resolve_entry_file(ext_path, command).ok_or_else(|| Error::EntryNotFound {
            command: command.name.clone(),
            path: ext_path.to_path_buf(),
        })?;

        let externals = external_modules(&manifest.externals);
        let bundler = self.bundler_for(ext_path)?;
        let code = bundler
            .bundle(&BundleRequest {
                entry: &entry,
                working_dir: ext_path,
                externals: &externals,
                target: &self.settings.target,
            })
            .await?;

        if code.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::EmptyOutput { entry });
        }

        let artifact = self.artifact_path(extension, &command.name);
        write_atomic(&artifact, &code)?;
        Ok(artifact)
    }
}

fn validate_identifier(value: &str) -> Result<()> {
    validate_path_identifier(value, "artifact name").map_err(|message| {
        Error::Fs(extkit_fs::Error::InvalidIdentifier { message })
    })
}
