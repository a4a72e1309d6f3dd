//! Serving built commands to the host runtime
//!
//! A bundle result is assembled on every call from the artifact and a fresh
//! read of the manifest, so manifest edits show up without a rebuild.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use extkit_build::BuildEngine;
use extkit_manifest::{
    ArgumentSchema, ExtensionManifest, Platform, PreferenceSchema, is_command_compatible,
    merge_defaults,
};
use serde::Serialize;
use serde_json::Value;

use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::icon::icon_data_url;

/// Everything the host needs to run one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionBundleResult {
    /// Compiled CommonJS module.
    pub code: String,
    pub extension_name: String,
    pub extension_title: String,
    pub command_name: String,
    pub title: String,
    pub mode: String,
    pub icon_data_url: Option<String>,
    pub owner: Option<String>,
    /// Default values with command scope overriding extension scope.
    pub preference_values: BTreeMap<String, Value>,
    pub extension_preferences: Vec<PreferenceSchema>,
    pub command_preferences: Vec<PreferenceSchema>,
    pub arguments: Vec<ArgumentSchema>,
    pub ext_path: PathBuf,
    pub assets_path: PathBuf,
    /// Writable per-extension directory, created on demand.
    pub support_path: PathBuf,
    pub artifact_path: PathBuf,
}

/// Reads artifacts, building them on demand.
pub struct BundleServer {
    discovery: Discovery,
    build: Arc<BuildEngine>,
    support_root: PathBuf,
    platform: Platform,
}

impl BundleServer {
    pub fn new(
        discovery: Discovery,
        build: Arc<BuildEngine>,
        support_root: impl Into<PathBuf>,
        platform: Platform,
    ) -> Self {
        Self {
            discovery,
            build,
            support_root: support_root.into(),
            platform,
        }
    }

    /// Bundle for `command` of `extension`, or `None` when it cannot be
    /// served. The reason is logged.
    pub async fn get_extension_bundle(
        &self,
        extension: &str,
        command: &str,
    ) -> Option<ExtensionBundleResult> {
        match self.try_get_extension_bundle(extension, command).await {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                tracing::warn!(
                    "Cannot open '{}/{}': {}. Try reinstalling the extension.",
                    extension,
                    command,
                    e
                );
                None
            }
        }
    }

    pub async fn try_get_extension_bundle(
        &self,
        extension: &str,
        command: &str,
    ) -> Result<ExtensionBundleResult> {
        let source = self
            .discovery
            .resolve_installed_extension(extension)
            .ok_or_else(|| Error::NotInstalled {
                name: extension.to_string(),
            })?;

        let artifact_path = self.build.artifact_path(&source.ext_name, command);
        if !artifact_path.is_file() {
            tracing::debug!("No artifact for '{}/{}', building", extension, command);
            self.build
                .try_build_single_command(&source.ext_name, &source.ext_path, command)
                .await?;
        }
        let code = match fs::read_to_string(&artifact_path) {
            Ok(code) => code,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::BuildMissing {
                    extension: extension.to_string(),
                    command: command.to_string(),
                });
            }
            Err(e) => return Err(Error::io(&artifact_path, e)),
        };

        let manifest = ExtensionManifest::from_dir(&source.ext_path, self.platform)?;
        let cmd = manifest
            .command(command)
            .ok_or_else(|| Error::UnknownCommand {
                extension: extension.to_string(),
                command: command.to_string(),
            })?;
        if !is_command_compatible(&manifest, cmd, self.platform) {
            return Err(Error::Incompatible {
                name: format!("{}/{}", manifest.name, command),
                platform: self.platform.to_string(),
            });
        }

        let support_path = self.support_root.join(&source.ext_name);
        fs::create_dir_all(&support_path).map_err(|e| Error::io(&support_path, e))?;

        Ok(ExtensionBundleResult {
            code,
            extension_name: manifest.name.clone(),
            extension_title: manifest.display_title().to_string(),
            command_name: cmd.name.clone(),
            title: cmd.display_title().to_string(),
            mode: cmd.mode_or_default().to_string(),
            icon_data_url: icon_data_url(&source.ext_path, manifest.icon_or_default()),
            owner: manifest.owner_name().map(str::to_string),
            preference_values: merge_defaults([
                manifest.preferences.as_slice(),
                cmd.preferences.as_slice(),
            ]),
            extension_preferences: manifest.preferences.clone(),
            command_preferences: cmd.preferences.clone(),
            arguments: cmd.arguments.clone(),
            assets_path: source.ext_path.join("assets"),
            ext_path: source.ext_path,
            support_path,
            artifact_path,
        })
    }
}
