//! Just-in-time build pipeline for extkit
//!
//! Resolves each command's entry file, then bundles it into a standalone
//! CommonJS artifact with host-supplied modules left external.
//!
//! # Modules
//!
//! - [`entry`]: command name to source file
//! - [`externals`]: modules never inlined
//! - [`bundler`]: the [`Bundler`] capability and its resolution
//! - [`engine`]: [`BuildEngine`], the per-extension build cache

pub mod bundler;
pub mod engine;
pub mod entry;
pub mod error;
pub mod externals;

pub use bundler::{
    BundleRequest, Bundler, BundlerSettings, DEFAULT_TARGET, EsbuildCli, locate_bundler,
    resolve_bundler,
};
pub use engine::{ARTIFACT_EXTENSION, BuildEngine};
pub use entry::{SOURCE_EXTENSIONS, resolve_entry_file};
pub use error::{Error, Result};
pub use externals::{external_modules, is_external};
