//! Error types for extkit-build

use std::path::PathBuf;

/// Result type for build operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or bundling command entry points
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] extkit_fs::Error),

    #[error(transparent)]
    Manifest(#[from] extkit_manifest::Error),

    #[error("no bundler available: {hint}")]
    BundlerUnavailable { hint: String },

    #[error("no entry file found for command '{command}' in {path}")]
    EntryNotFound { command: String, path: PathBuf },

    #[error("command '{command}' is not declared by extension '{extension}'")]
    UnknownCommand { extension: String, command: String },

    #[error("command '{command}' is not available on this platform")]
    Incompatible { command: String },

    #[error("bundler failed for {entry} (exit code {code:?}): {stderr}")]
    BundleFailed {
        entry: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("bundler produced no output for {entry}")]
    EmptyOutput { entry: PathBuf },

    #[error("bundling {entry} timed out after {secs}s")]
    Timeout { entry: PathBuf, secs: u64 },

    #[error("failed to run bundler {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
