//! Configuration loading
//!
//! Settings come from `<config_dir>/extkit/config.toml` (or an explicit path),
//! then environment overrides:
//!
//! - `EXTKIT_DATA_DIR` replaces `paths.data_dir`
//! - `EXTKIT_EXTENSION_ROOTS` (platform path-list syntax) adds extension roots
//!   searched after the configured ones
//!
//! A missing file means defaults. Invalid TOML is an error.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! extension_roots = ["~/dev/my-extensions"]
//!
//! [remote]
//! branch = "main"
//!
//! [catalog]
//! ttl_secs = 3600
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DATA_DIR_ENV: &str = "EXTKIT_DATA_DIR";
pub const EXTENSION_ROOTS_ENV: &str = "EXTKIT_EXTENSION_ROOTS";

const APP_DIR: &str = "extkit";
const CONFIG_FILENAME: &str = "config.toml";

/// Filesystem locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Root of all managed state. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Additional read-only extension roots, searched after the managed root.
    pub extension_roots: Vec<PathBuf>,
}

/// Remote repository and HTTP endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    /// Repository laid out as `extensions/<name>/package.json`. May be a
    /// local directory.
    pub repository: String,
    pub branch: Option<String>,
    /// Base URL that relative asset paths resolve against.
    pub asset_base_url: String,
    /// Directory-listing endpoint used for screenshot discovery.
    pub listing_base_url: String,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            repository: "https://github.com/raycast/extensions.git".to_string(),
            branch: Some("main".to_string()),
            asset_base_url: "https://raw.githubusercontent.com/raycast/extensions/main/"
                .to_string(),
            listing_base_url: "https://api.github.com/repos/raycast/extensions/contents/"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Freshness window of cached catalog data.
    pub ttl_secs: u64,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self { ttl_secs: 86_400 }
    }
}

/// Hard limits for out-of-process and network work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsSection {
    pub fetch_secs: u64,
    pub install_secs: u64,
    pub build_secs: u64,
    pub http_secs: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            fetch_secs: 120,
            install_secs: 120,
            build_secs: 60,
            http_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Explicit bundler binary; searched for when unset.
    pub bundler: Option<PathBuf>,
    pub target: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            bundler: None,
            target: extkit_build::DEFAULT_TARGET.to_string(),
        }
    }
}

/// Complete extkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtkitConfig {
    pub paths: PathsSection,
    pub remote: RemoteSection,
    pub catalog: CatalogSection,
    pub timeouts: TimeoutsSection,
    pub build: BuildSection,
    /// Roots contributed by the environment, searched last.
    #[serde(skip)]
    pub env_roots: Vec<PathBuf>,
}

/// Derived locations under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Managed install root, exclusively owned by the installer.
    pub fn extensions_dir(&self) -> PathBuf {
        self.data_dir.join("extensions")
    }

    /// Parent of every per-extension build cache.
    pub fn build_dir(&self) -> PathBuf {
        self.data_dir.join("build")
    }

    /// Parent of every per-extension writable support directory.
    pub fn support_dir(&self) -> PathBuf {
        self.data_dir.join("support")
    }

    pub fn catalog_cache(&self) -> PathBuf {
        self.data_dir.join("catalog-cache.json")
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
}

impl ExtkitConfig {
    /// Configuration rooted at `data_dir` with every other setting defaulted.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.paths.data_dir = Some(data_dir.into());
        config
    }

    /// Load from `path` (or the default location) and apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);
        let mut config = match path {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading configuration from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
                Self::from_toml(&content, &path)?
            }
            _ => Self::default(),
        };
        config.apply_overrides(
            std::env::var_os(DATA_DIR_ENV),
            std::env::var_os(EXTENSION_ROOTS_ENV),
        );
        Ok(config)
    }

    /// Parse TOML content; `origin` is only used in errors.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::InvalidConfig {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Apply environment-style overrides.
    pub fn apply_overrides(&mut self, data_dir: Option<OsString>, roots: Option<OsString>) {
        if let Some(dir) = data_dir.filter(|d| !d.is_empty()) {
            self.paths.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(roots) = roots {
            self.env_roots = std::env::split_paths(&roots)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
    }

    /// The data directory, falling back to the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.paths.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .ok_or(Error::NoDataDir),
        }
    }

    pub fn layout(&self) -> Result<DataLayout> {
        Ok(DataLayout::new(self.data_dir()?))
    }

    /// Extension roots in search order: managed root, configured roots,
    /// environment roots.
    pub fn extension_roots(&self) -> Result<Vec<PathBuf>> {
        let mut roots = vec![self.layout()?.extensions_dir()];
        roots.extend(self.paths.extension_roots.iter().cloned());
        roots.extend(self.env_roots.iter().cloned());
        Ok(roots)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog.ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.fetch_secs)
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.install_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.build_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.http_secs)
    }

    /// Settings handed to the build engine.
    pub fn bundler_settings(&self) -> extkit_build::BundlerSettings {
        extkit_build::BundlerSettings {
            program: self.build.bundler.clone(),
            target: self.build.target.clone(),
            timeout: self.build_timeout(),
        }
    }

    /// Remote source handed to fetch strategies.
    pub fn remote_source(&self) -> extkit_git::RemoteSource {
        let source = extkit_git::RemoteSource::new(&self.remote.repository);
        match &self.remote.branch {
            Some(branch) => source.with_branch(branch),
            None => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ExtkitConfig::from_toml("", Path::new("config.toml")).unwrap();
        assert_eq!(config, ExtkitConfig::default());
        assert_eq!(config.catalog_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.build.target, "es2020");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ExtkitConfig::from_toml(
            "[catalog]\nttl_secs = 60\n\n[timeouts]\nbuild_secs = 5\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.catalog.ttl_secs, 60);
        assert_eq!(config.timeouts.build_secs, 5);
        assert_eq!(config.timeouts.fetch_secs, 120);
        assert_eq!(config.remote, RemoteSection::default());
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let err = ExtkitConfig::from_toml("[catalog\n", Path::new("/etc/extkit.toml")).unwrap_err();
        assert!(err.to_string().contains("/etc/extkit.toml"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = ExtkitConfig::load(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.catalog, CatalogSection::default());
    }

    #[test]
    fn overrides_replace_data_dir_and_append_roots() {
        let mut config = ExtkitConfig::with_data_dir("/data");
        config.paths.extension_roots = vec![PathBuf::from("/configured")];
        let roots = std::env::join_paths(["/env-a", "/env-b"]).unwrap();

        config.apply_overrides(Some("/override".into()), Some(roots));

        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/override"));
        assert_eq!(
            config.extension_roots().unwrap(),
            vec![
                PathBuf::from("/override/extensions"),
                PathBuf::from("/configured"),
                PathBuf::from("/env-a"),
                PathBuf::from("/env-b"),
            ]
        );
    }

    #[test]
    fn layout_paths() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.extensions_dir(), PathBuf::from("/data/extensions"));
        assert_eq!(layout.build_dir(), PathBuf::from("/data/build"));
        assert_eq!(layout.support_dir(), PathBuf::from("/data/support"));
        assert_eq!(layout.catalog_cache(), PathBuf::from("/data/catalog-cache.json"));
    }
}
