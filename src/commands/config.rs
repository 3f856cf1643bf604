//! Config subcommands handler

use std::path::Path;

use anyhow::{Context, Result};

use wikiextract::ExtractionConfig;

/// Load the configuration from `path`, or from the default location.
pub fn load(path: Option<&Path>) -> Result<ExtractionConfig> {
    match path {
        Some(path) => ExtractionConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => ExtractionConfig::load().context("Failed to load config"),
    }
}

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Print where the default configuration file lives.
#[cfg(not(tarpaulin_include))]
pub fn handle_path() -> Result<()> {
    let path = ExtractionConfig::config_path()
        .context("Could not determine the configuration directory")?;
    println!("{}", path.display());
    Ok(())
}
