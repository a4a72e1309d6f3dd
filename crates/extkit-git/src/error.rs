//! Error types for extkit-git

use std::path::PathBuf;

/// Result type for extkit-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching from the extension repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] extkit_fs::Error),

    #[error("Command not found: {command}{}", hint.as_deref().unwrap_or(""))]
    CommandNotFound {
        command: String,
        hint: Option<String>,
    },

    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("'{path}' not present in {source_url}")]
    MissingInRemote { path: PathBuf, source_url: String },

    #[error("Background fetch task failed: {0}")]
    Join(String),
}
