//! Extension manifest model for extkit.
//!
//! This crate parses the `package.json` manifest every extension carries,
//! resolves platform-keyed preference defaults for the running OS, and
//! provides the compatibility filter applied wherever manifests are read.

pub mod compat;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod preferences;

/// The canonical filename for extension manifest files.
pub const MANIFEST_FILENAME: &str = "package.json";

pub use compat::{is_command_compatible, is_compatible, platforms_admit};
pub use error::{Error, Result};
pub use manifest::{CommandManifest, ExtensionManifest, Person};
pub use platform::Platform;
pub use preferences::{
    ArgumentSchema, PreferenceDefault, PreferenceOption, PreferenceSchema, PreferenceScope,
    merge_defaults,
};
