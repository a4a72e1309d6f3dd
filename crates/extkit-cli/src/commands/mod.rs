//! Command implementations for extkit-cli

pub mod config;
pub mod installed;
pub mod store;

pub use config::run_config;
pub use installed::{run_build, run_bundle, run_commands, run_schema};
pub use store::{run_catalog, run_install, run_screenshots, run_uninstall};

use serde::Serialize;

use crate::error::Result;

/// Pretty-print `value` as JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
