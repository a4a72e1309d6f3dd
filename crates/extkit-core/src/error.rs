//! Error types for extkit-core

use std::path::PathBuf;

/// Result type for extkit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in extkit-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be parsed
    #[error("Invalid configuration in {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No data directory could be determined for this user
    #[error("Cannot determine a data directory; set EXTKIT_DATA_DIR")]
    NoDataDir,

    /// Extension is not installed in any configured root
    #[error("Extension '{name}' is not installed")]
    NotInstalled { name: String },

    /// Extension is installed but its manifest does not declare the command
    #[error("Extension '{extension}' has no command '{command}'")]
    UnknownCommand { extension: String, command: String },

    /// Manifest or command excludes the current platform
    #[error("'{name}' is not available on {platform}")]
    Incompatible { name: String, platform: String },

    /// No artifact exists and an on-demand build did not produce one
    #[error("No build output for '{extension}/{command}'")]
    BuildMissing { extension: String, command: String },

    /// Name cannot be used as an extension directory
    #[error("Invalid extension name: {message}")]
    InvalidName { message: String },

    /// Fetched manifest declares a different name than the one requested
    #[error("Extension '{requested}' declares the name '{declared}' in its manifest")]
    NameMismatch { requested: String, declared: String },

    /// Dependency installation failed
    #[error("Dependency install failed in {path}: {message}")]
    DependencyInstall { path: PathBuf, message: String },

    /// HTTP request failed
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from extkit-fs
    #[error(transparent)]
    Fs(#[from] extkit_fs::Error),

    /// Manifest error from extkit-manifest
    #[error(transparent)]
    Manifest(#[from] extkit_manifest::Error),

    /// Fetch error from extkit-git
    #[error(transparent)]
    Git(#[from] extkit_git::Error),

    /// Build error from extkit-build
    #[error(transparent)]
    Build(#[from] extkit_build::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Fs(extkit_fs::Error::io(path, source))
    }
}
