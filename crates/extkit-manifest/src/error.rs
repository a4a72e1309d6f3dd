use std::path::PathBuf;

/// Errors that can occur while loading extension manifests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest JSON could not be parsed into the expected shape.
    #[error("failed to parse extension manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// Extension manifest file not found at the expected path.
    #[error("extension manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Manifest parsed but its name is unusable.
    #[error("invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// I/O error reading manifest files.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
