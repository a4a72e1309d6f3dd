//! Catalog of installable extensions
//!
//! Built from a manifest-only sparse fetch of the remote repository and
//! cached in memory and on disk. Screenshots are listed lazily per
//! extension.

mod cache;
mod model;
mod screenshots;
mod store;

pub use cache::{coerce_snapshot, load_snapshot, save_snapshot};
pub use model::{
    CatalogCommand, CatalogEntry, CatalogSnapshot, SNAPSHOT_VERSION, asset_url, sort_entries,
};
pub use screenshots::{IMAGE_EXTENSIONS, listing_url, parse_listing};
pub use store::{CatalogSettings, CatalogStore};
