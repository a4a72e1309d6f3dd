//! Remote extension repository access for extkit
//!
//! Retrieves either every extension manifest or a single extension's tree
//! through interchangeable [`SparseFetcher`] strategies, each bounded by a
//! timeout.

pub mod binary;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod libgit;
pub mod local;

pub use binary::check_binary_on_path;
pub use cli::GitCliFetcher;
pub use error::{Error, Result};
pub use fetch::{EXTENSIONS_DIR, RemoteSource, SparseFetcher, SparseScope, resolve_fetcher};
pub use libgit::Git2Fetcher;
pub use local::LocalMirrorFetcher;
