//! Orchestration layer for extkit
//!
//! Ties the filesystem, manifest, fetch and build crates together into the
//! operations a host application calls: browsing the catalog, installing and
//! uninstalling extensions, discovering installed commands and serving
//! built bundles.
//!
//! [`ExtensionManager`] is the usual entry point:
//!
//! ```ignore
//! use extkit_core::{ExtensionManager, ExtkitConfig};
//!
//! let manager = ExtensionManager::from_config(ExtkitConfig::load(None)?)?;
//! if manager.install_extension("weather").await {
//!     let bundle = manager.get_extension_bundle("weather", "forecast").await;
//! }
//! ```

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod deps;
pub mod discovery;
pub mod error;
pub mod icon;
pub mod install;
pub mod manager;

pub use bundle::{BundleServer, ExtensionBundleResult};
pub use catalog::{CatalogCommand, CatalogEntry, CatalogSettings, CatalogSnapshot, CatalogStore};
pub use config::{DataLayout, ExtkitConfig};
pub use deps::{DependencyOutcome, NpmCli, PackageManager};
pub use discovery::{
    CommandInfo, CommandSchema, Discovery, ExtensionSchema, InstalledExtensionSource,
};
pub use error::{Error, Result};
pub use icon::icon_data_url;
pub use install::{InstallReport, Installer};
pub use manager::{ExtensionManager, Services};
