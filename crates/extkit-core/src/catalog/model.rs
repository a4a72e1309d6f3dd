//! Catalog entry types

use chrono::{DateTime, Utc};
use extkit_manifest::ExtensionManifest;
use serde::{Deserialize, Serialize};

/// Current on-disk snapshot schema.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A command as listed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCommand {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// One installable extension as listed in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    pub name: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub contributors: Vec<String>,
    pub icon: String,
    pub icon_url: String,
    pub screenshot_urls: Vec<String>,
    pub categories: Vec<String>,
    /// Declared platforms; empty means every platform.
    pub platforms: Vec<String>,
    pub commands: Vec<CatalogCommand>,
}

impl CatalogEntry {
    /// Build an entry from a parsed manifest. Asset paths resolve against
    /// `asset_base`.
    pub fn from_manifest(manifest: &ExtensionManifest, asset_base: &str) -> Self {
        let icon = manifest.icon_or_default().to_string();
        let icon_url = asset_url(
            asset_base,
            &format!("extensions/{}/assets/{}", manifest.name, icon),
            &icon,
        );
        Self {
            name: manifest.name.clone(),
            title: manifest.display_title().to_string(),
            description: manifest.description.clone(),
            author: manifest.owner_name().unwrap_or_default().to_string(),
            contributors: manifest
                .contributors
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            icon,
            icon_url,
            screenshot_urls: Vec::new(),
            categories: manifest.categories.clone(),
            platforms: manifest.platforms.clone().unwrap_or_default(),
            commands: manifest
                .commands
                .iter()
                .map(|c| CatalogCommand {
                    name: c.name.clone(),
                    title: c.display_title().to_string(),
                    description: c.description.clone(),
                })
                .collect(),
        }
    }
}

/// Resolve `relative` against `base`. Values that are already absolute URLs
/// (`original`) are kept as-is.
pub fn asset_url(base: &str, relative: &str, original: &str) -> String {
    if original.starts_with("http://") || original.starts_with("https://") {
        return original.to_string();
    }
    let base = base.trim_end_matches('/');
    format!("{}/{}", base, relative.trim_start_matches('/'))
}

/// A complete catalog as fetched at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub entries: Vec<CatalogEntry>,
    pub fetched_at: DateTime<Utc>,
    pub version: u32,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            fetched_at: Utc::now(),
            version: SNAPSHOT_VERSION,
        }
    }

    /// Whether the snapshot is younger than `ttl`.
    pub fn is_fresh(&self, ttl: std::time::Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age < ttl,
            Err(_) => true,
        }
    }
}

/// Sort entries by title, case-insensitively, then by name.
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}
