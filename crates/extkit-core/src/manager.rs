//! The [`ExtensionManager`] facade
//!
//! Owns every cache and strategy for one data directory. Instances share
//! nothing, so tests can run several side by side.

use std::path::PathBuf;
use std::sync::Arc;

use extkit_build::{BuildEngine, Bundler};
use extkit_git::{SparseFetcher, resolve_fetcher};
use extkit_manifest::Platform;

use crate::bundle::{BundleServer, ExtensionBundleResult};
use crate::catalog::{CatalogEntry, CatalogSettings, CatalogStore};
use crate::config::{DataLayout, ExtkitConfig};
use crate::deps::{NpmCli, PackageManager};
use crate::discovery::{CommandInfo, Discovery, ExtensionSchema, InstalledExtensionSource};
use crate::error::Result;
use crate::install::{InstallReport, Installer};

/// Strategy implementations used by a manager.
#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn SparseFetcher>,
    /// `None` installs extensions without their npm dependencies.
    pub package_manager: Option<Arc<dyn PackageManager>>,
    /// Forces one bundler; otherwise resolved per extension.
    pub bundler: Option<Arc<dyn Bundler>>,
    pub platform: Platform,
}

impl Services {
    /// Pick the default strategies available on this machine.
    pub fn resolve(config: &ExtkitConfig) -> Self {
        let fetcher = resolve_fetcher(&config.remote_source(), config.fetch_timeout());
        let package_manager = match NpmCli::resolve(config.install_timeout()) {
            Ok(npm) => Some(Arc::new(npm) as Arc<dyn PackageManager>),
            Err(e) => {
                tracing::debug!("No package manager: {}", e);
                None
            }
        };
        Self {
            fetcher,
            package_manager,
            bundler: None,
            platform: Platform::current(),
        }
    }
}

/// Entry point for every extension operation.
pub struct ExtensionManager {
    config: ExtkitConfig,
    layout: DataLayout,
    catalog: CatalogStore,
    discovery: Discovery,
    build: Arc<BuildEngine>,
    installer: Installer,
    server: BundleServer,
}

impl ExtensionManager {
    pub fn new(config: ExtkitConfig, services: Services) -> Result<Self> {
        let layout = config.layout()?;
        let platform = services.platform;

        let mut catalog_settings = CatalogSettings::from_config(&config)?;
        catalog_settings.platform = platform;
        let catalog = CatalogStore::new(catalog_settings, Arc::clone(&services.fetcher));

        let discovery = Discovery::new(config.extension_roots()?, platform);

        let mut engine =
            BuildEngine::new(layout.build_dir(), config.bundler_settings()).with_platform(platform);
        if let Some(bundler) = services.bundler {
            engine = engine.with_bundler(bundler);
        }
        let build = Arc::new(engine);

        let installer = Installer::new(
            layout.extensions_dir(),
            config.remote_source(),
            services.fetcher,
            services.package_manager,
            Arc::clone(&build),
            platform,
        );
        let server = BundleServer::new(
            discovery.clone(),
            Arc::clone(&build),
            layout.support_dir(),
            platform,
        );

        tracing::debug!("Extension manager rooted at {}", layout.data_dir.display());
        Ok(Self {
            config,
            layout,
            catalog,
            discovery,
            build,
            installer,
            server,
        })
    }

    /// Manager with the strategies available on this machine.
    pub fn from_config(config: ExtkitConfig) -> Result<Self> {
        let services = Services::resolve(&config);
        Self::new(config, services)
    }

    pub fn config(&self) -> &ExtkitConfig {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn build_engine(&self) -> &BuildEngine {
        &self.build
    }

    pub async fn get_catalog(&self, force_refresh: bool) -> Vec<CatalogEntry> {
        self.catalog.get_catalog(force_refresh).await
    }

    pub async fn get_extension_screenshot_urls(&self, name: &str) -> Vec<String> {
        self.catalog.get_extension_screenshot_urls(name).await
    }

    pub async fn install_extension(&self, name: &str) -> bool {
        self.installer.install_extension(name).await
    }

    pub async fn try_install_extension(&self, name: &str) -> Result<InstallReport> {
        self.installer.try_install_extension(name).await
    }

    pub async fn uninstall_extension(&self, name: &str) -> bool {
        self.installer.uninstall_extension(name).await
    }

    /// Rebuild every command of an installed extension. Returns the number
    /// of commands built, zero when the extension is not installed.
    pub async fn build_all_commands(&self, name: &str) -> usize {
        let Some(source) = self.discovery.resolve_installed_extension(name) else {
            tracing::warn!("Cannot build '{}': not installed", name);
            return 0;
        };
        match self
            .build
            .build_all_commands(&source.ext_name, &source.ext_path)
            .await
        {
            Ok(built) => built,
            Err(e) => {
                tracing::warn!("Build of '{}' failed: {}", name, e);
                0
            }
        }
    }

    pub async fn build_single_command(&self, name: &str, command: &str) -> bool {
        let Some(source) = self.discovery.resolve_installed_extension(name) else {
            tracing::warn!("Cannot build '{}': not installed", name);
            return false;
        };
        self.build
            .build_single_command(&source.ext_name, &source.ext_path, command)
            .await
    }

    pub async fn get_extension_bundle(
        &self,
        name: &str,
        command: &str,
    ) -> Option<ExtensionBundleResult> {
        self.server.get_extension_bundle(name, command).await
    }

    pub async fn try_get_extension_bundle(
        &self,
        name: &str,
        command: &str,
    ) -> Result<ExtensionBundleResult> {
        self.server.try_get_extension_bundle(name, command).await
    }

    pub fn discover_installed_extension_commands(&self) -> Vec<CommandInfo> {
        self.discovery.discover_installed_extension_commands()
    }

    pub fn get_installed_extensions_settings_schema(&self) -> Vec<ExtensionSchema> {
        self.discovery.get_installed_extensions_settings_schema()
    }

    pub fn resolve_installed_extension(&self, name: &str) -> Option<InstalledExtensionSource> {
        self.discovery.resolve_installed_extension(name)
    }

    pub fn installed_extensions(&self) -> Vec<InstalledExtensionSource> {
        self.discovery.installed_extensions()
    }

    /// Path of a command's artifact, whether or not it exists yet.
    pub fn artifact_path(&self, name: &str, command: &str) -> PathBuf {
        self.build.artifact_path(name, command)
    }

    pub fn artifact_checksum(&self, name: &str, command: &str) -> Option<String> {
        self.build.artifact_checksum(name, command)
    }

    /// Drop in-memory state. On-disk caches and installs are kept.
    pub fn shutdown(&self) {
        self.catalog.invalidate();
        tracing::debug!("Extension manager shut down");
    }
}
