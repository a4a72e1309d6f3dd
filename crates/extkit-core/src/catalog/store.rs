//! Two-tier catalog cache in front of the manifest-only fetch

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use extkit_fs::validate_path_identifier;
use extkit_git::{RemoteSource, SparseFetcher, SparseScope};
use extkit_manifest::{ExtensionManifest, Platform, platforms_admit};

use super::cache::{load_snapshot, save_snapshot};
use super::model::{CatalogEntry, CatalogSnapshot, sort_entries};
use super::screenshots::{listing_url, parse_listing};
use crate::config::ExtkitConfig;
use crate::error::{Error, Result};

/// Where the catalog comes from and how long it stays fresh.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub source: RemoteSource,
    pub cache_path: PathBuf,
    pub asset_base_url: String,
    pub listing_base_url: String,
    pub ttl: Duration,
    pub http_timeout: Duration,
    pub platform: Platform,
}

impl CatalogSettings {
    pub fn from_config(config: &ExtkitConfig) -> Result<Self> {
        Ok(Self {
            source: config.remote_source(),
            cache_path: config.layout()?.catalog_cache(),
            asset_base_url: config.remote.asset_base_url.clone(),
            listing_base_url: config.remote.listing_base_url.clone(),
            ttl: config.catalog_ttl(),
            http_timeout: config.http_timeout(),
            platform: Platform::current(),
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The store's view of available extensions.
///
/// Lookup order for [`get_catalog`](Self::get_catalog): fresh memory cache,
/// fresh disk cache, network. A failed or empty fetch never replaces cached
/// data; the stale disk snapshot is served instead.
pub struct CatalogStore {
    settings: CatalogSettings,
    fetcher: Arc<dyn SparseFetcher>,
    http: reqwest::Client,
    memory: Mutex<Option<CatalogSnapshot>>,
    screenshots: Mutex<HashMap<String, Vec<String>>>,
}

impl CatalogStore {
    pub fn new(settings: CatalogSettings, fetcher: Arc<dyn SparseFetcher>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(concat!("extkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self {
            settings,
            fetcher,
            http,
            memory: Mutex::new(None),
            screenshots: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Catalog entries compatible with this platform, sorted by title.
    ///
    /// Never fails: network problems fall back to cached data, possibly
    /// stale, or an empty list when nothing was ever cached.
    pub async fn get_catalog(&self, force_refresh: bool) -> Vec<CatalogEntry> {
        if !force_refresh {
            if let Some(snapshot) = lock(&self.memory).as_ref() {
                if snapshot.is_fresh(self.settings.ttl) {
                    return snapshot.entries.clone();
                }
            }
            if let Some(snapshot) = self.load_disk() {
                if snapshot.is_fresh(self.settings.ttl) {
                    tracing::debug!("Serving catalog from disk cache");
                    let entries = snapshot.entries.clone();
                    *lock(&self.memory) = Some(snapshot);
                    return entries;
                }
            }
        }

        match self.try_fetch().await {
            Ok(entries) if !entries.is_empty() => {
                tracing::info!("Fetched {} catalog entries", entries.len());
                let snapshot = CatalogSnapshot::new(entries);
                if let Err(e) = save_snapshot(&self.settings.cache_path, &snapshot) {
                    tracing::warn!("Failed to write catalog cache: {}", e);
                }
                let entries = snapshot.entries.clone();
                *lock(&self.memory) = Some(snapshot);
                return entries;
            }
            Ok(_) => tracing::warn!("Catalog fetch returned no entries, keeping cached data"),
            Err(e) => tracing::warn!("Catalog fetch failed, keeping cached data: {}", e),
        }

        if let Some(snapshot) = self.load_disk() {
            let entries = snapshot.entries.clone();
            *lock(&self.memory) = Some(snapshot);
            return entries;
        }
        lock(&self.memory)
            .as_ref()
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    fn load_disk(&self) -> Option<CatalogSnapshot> {
        let mut snapshot = load_snapshot(&self.settings.cache_path)?;
        let platform = self.settings.platform;
        snapshot
            .entries
            .retain(|e| platforms_admit(Some(e.platforms.as_slice()), platform));
        Some(snapshot)
    }

    /// Fetch every manifest and build the catalog.
    ///
    /// The scratch workspace is removed when this returns, on every path.
    pub async fn try_fetch(&self) -> Result<Vec<CatalogEntry>> {
        let workspace = tempfile::Builder::new().prefix("extkit-catalog-").tempdir()?;
        let checkout = workspace.path().join("checkout");

        tracing::debug!(
            "Fetching catalog manifests with {} from {}",
            self.fetcher.name(),
            self.settings.source.url
        );
        self.fetcher
            .fetch(&self.settings.source, &SparseScope::Manifests, &checkout)
            .await?;

        Ok(self.read_manifests(&checkout.join(SparseScope::Manifests.root())))
    }

    fn read_manifests(&self, extensions_root: &Path) -> Vec<CatalogEntry> {
        let Ok(dirs) = fs::read_dir(extensions_root) else {
            return Vec::new();
        };
        // Duplicate names resolve to the first folder in name order.
        let mut dirs: Vec<_> = dirs.flatten().map(|e| e.path()).collect();
        dirs.sort();

        let platform = self.settings.platform;
        let mut seen = std::collections::HashSet::new();
        let mut entries: Vec<CatalogEntry> = dirs
            .into_iter()
            .filter_map(|dir| match ExtensionManifest::from_dir(&dir, platform) {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|m| platforms_admit(m.platforms.as_deref(), platform))
            .filter(|m| seen.insert(m.name.clone()))
            .map(|m| CatalogEntry::from_manifest(&m, &self.settings.asset_base_url))
            .collect();

        sort_entries(&mut entries);
        entries
    }

    /// Screenshot URLs for `name`. Fetched on first use and cached in memory;
    /// failures yield an empty list and are retried next time.
    pub async fn get_extension_screenshot_urls(&self, name: &str) -> Vec<String> {
        if let Some(urls) = lock(&self.screenshots).get(name) {
            return urls.clone();
        }
        match self.try_fetch_screenshots(name).await {
            Ok(urls) => {
                lock(&self.screenshots).insert(name.to_string(), urls.clone());
                urls
            }
            Err(e) => {
                tracing::warn!("Could not list screenshots for '{}': {}", name, e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_screenshots(&self, name: &str) -> Result<Vec<String>> {
        validate_path_identifier(name, "extension name")
            .map_err(|message| Error::InvalidName { message })?;
        let url = listing_url(&self.settings.listing_base_url, name);
        let http_err = |source| Error::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_err)?;
        let listing: serde_json::Value = response.json().await.map_err(http_err)?;

        Ok(parse_listing(&listing, &self.settings.asset_base_url))
    }

    /// Drop every in-memory cache. The disk snapshot is kept.
    pub fn invalidate(&self) {
        *lock(&self.memory) = None;
        lock(&self.screenshots).clear();
    }
}
