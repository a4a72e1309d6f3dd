//! Config command implementation

use extkit_core::ExtkitConfig;

use crate::error::Result;

/// Run `extkit config`
pub fn run_config(config: &ExtkitConfig) -> Result<()> {
    let mut effective = config.clone();
    effective.paths.data_dir = Some(config.data_dir()?);
    effective.paths.extension_roots = config.extension_roots()?;
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
