//! Filesystem primitives for extkit
//!
//! Provides atomic file writes, recursive tree copies, and the staged
//! directory swap used to replace installed extensions transactionally.

pub mod checksum;
pub mod copy;
pub mod error;
pub mod io;
pub mod path;
pub mod swap;

pub use copy::copy_dir_all;
pub use error::{Error, Result};
pub use path::{normalize_extension_name, validate_path_identifier};
pub use swap::{StagedSwap, remove_stale_backups};
