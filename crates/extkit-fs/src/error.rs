//! Error types for extkit-fs

use std::path::PathBuf;

/// Result type for extkit-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in extkit-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Invalid identifier: {message}")]
    InvalidIdentifier { message: String },

    #[error("Swap target {path} has no parent directory")]
    SwapWithoutParent { path: PathBuf },

    #[error("Rollback of {target} failed; backup left at {backup}: {source}")]
    RollbackFailed {
        target: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
