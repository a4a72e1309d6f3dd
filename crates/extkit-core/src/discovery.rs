//! Installed extension discovery
//!
//! Roots are scanned in order (managed root, configured roots, environment
//! roots). The first root that holds a valid, compatible manifest for a
//! normalized name wins; later copies are ignored.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use extkit_fs::normalize_extension_name;
use extkit_manifest::{
    ArgumentSchema, CommandManifest, ExtensionManifest, Platform, PreferenceSchema,
    is_command_compatible, is_compatible,
};
use serde::Serialize;

use crate::icon::icon_data_url;

/// Where an installed extension lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledExtensionSource {
    /// Normalized extension name.
    pub ext_name: String,
    pub ext_path: PathBuf,
    /// The root the extension was found under.
    pub source_root: PathBuf,
}

/// A command entry for the command palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInfo {
    /// `<extension>/<command>`
    pub id: String,
    pub extension_name: String,
    pub extension_title: String,
    pub name: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub mode: String,
    /// Lowercased search terms.
    pub keywords: Vec<String>,
    pub icon_data_url: Option<String>,
    pub ext_path: PathBuf,
}

/// Settings-UI view of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSchema {
    pub name: String,
    pub title: String,
    pub description: String,
    pub mode: String,
    pub preferences: Vec<PreferenceSchema>,
    pub arguments: Vec<ArgumentSchema>,
}

/// Settings-UI view of one installed extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSchema {
    pub name: String,
    pub title: String,
    pub description: String,
    pub owner: Option<String>,
    pub icon_data_url: Option<String>,
    pub ext_path: PathBuf,
    pub preferences: Vec<PreferenceSchema>,
    pub commands: Vec<CommandSchema>,
}

/// Scans extension roots.
#[derive(Debug, Clone)]
pub struct Discovery {
    roots: Vec<PathBuf>,
    platform: Platform,
}

impl Discovery {
    pub fn new(roots: Vec<PathBuf>, platform: Platform) -> Self {
        Self { roots, platform }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every installed, compatible extension, first root winning.
    pub fn scan(&self) -> Vec<(InstalledExtensionSource, ExtensionManifest)> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for root in &self.roots {
            for dir in sorted_subdirs(root) {
                let manifest = match ExtensionManifest::from_dir(&dir, self.platform) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::debug!("Skipping {}: {}", dir.display(), e);
                        continue;
                    }
                };
                if !is_compatible(&manifest, None, self.platform) {
                    tracing::debug!("Skipping {}: not available on {}", dir.display(), self.platform);
                    continue;
                }
                let Some(key) = normalize_extension_name(&manifest.name) else {
                    continue;
                };
                if !seen.insert(key.clone()) {
                    tracing::debug!("Ignoring shadowed copy of '{}' in {}", key, root.display());
                    continue;
                }
                found.push((
                    InstalledExtensionSource {
                        ext_name: key,
                        ext_path: dir,
                        source_root: root.clone(),
                    },
                    manifest,
                ));
            }
        }
        found
    }

    pub fn installed_extensions(&self) -> Vec<InstalledExtensionSource> {
        self.scan().into_iter().map(|(source, _)| source).collect()
    }

    /// Locate an installed extension by (normalized) name.
    pub fn resolve_installed_extension(&self, name: &str) -> Option<InstalledExtensionSource> {
        let key = normalize_extension_name(name)?;
        self.scan()
            .into_iter()
            .map(|(source, _)| source)
            .find(|source| source.ext_name == key)
    }

    /// Flattened, keyword-indexed command list across every installed extension.
    pub fn discover_installed_extension_commands(&self) -> Vec<CommandInfo> {
        let mut commands = Vec::new();
        for (source, manifest) in self.scan() {
            let icon = icon_data_url(&source.ext_path, manifest.icon_or_default());
            for command in &manifest.commands {
                if !is_command_compatible(&manifest, command, self.platform) {
                    continue;
                }
                commands.push(CommandInfo {
                    id: format!("{}/{}", manifest.name, command.name),
                    extension_name: manifest.name.clone(),
                    extension_title: manifest.display_title().to_string(),
                    name: command.name.clone(),
                    title: command.display_title().to_string(),
                    subtitle: command.subtitle.clone(),
                    description: command.description.clone(),
                    mode: command.mode_or_default().to_string(),
                    keywords: keywords(&manifest, command),
                    icon_data_url: icon.clone(),
                    ext_path: source.ext_path.clone(),
                });
            }
        }
        commands
    }

    /// Preference and command schema of every installed extension, sorted by
    /// display title.
    pub fn get_installed_extensions_settings_schema(&self) -> Vec<ExtensionSchema> {
        let mut schemas: Vec<ExtensionSchema> = self
            .scan()
            .into_iter()
            .map(|(source, manifest)| ExtensionSchema {
                name: manifest.name.clone(),
                title: manifest.display_title().to_string(),
                description: manifest.description.clone(),
                owner: manifest.owner_name().map(str::to_string),
                icon_data_url: icon_data_url(&source.ext_path, manifest.icon_or_default()),
                ext_path: source.ext_path,
                preferences: manifest.preferences.clone(),
                commands: manifest
                    .commands
                    .iter()
                    .filter(|c| is_command_compatible(&manifest, c, self.platform))
                    .map(|c| CommandSchema {
                        name: c.name.clone(),
                        title: c.display_title().to_string(),
                        description: c.description.clone(),
                        mode: c.mode_or_default().to_string(),
                        preferences: c.preferences.clone(),
                        arguments: c.arguments.clone(),
                    })
                    .collect(),
            })
            .collect();

        schemas.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        schemas
    }
}

fn sorted_subdirs(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.'))
        })
        .collect();
    dirs.sort();
    dirs
}

/// Search terms for a command: extension name and title, command name,
/// title, description and declared keywords. Lowercased and deduplicated.
fn keywords(manifest: &ExtensionManifest, command: &CommandManifest) -> Vec<String> {
    let mut seen = HashSet::new();
    [
        manifest.name.as_str(),
        manifest.display_title(),
        command.name.as_str(),
        command.display_title(),
        command.description.as_str(),
    ]
    .into_iter()
    .chain(command.keywords.iter().map(String::as_str))
    .map(|k| k.trim().to_lowercase())
    .filter(|k| !k.is_empty())
    .filter(|k| seen.insert(k.clone()))
    .collect()
}
