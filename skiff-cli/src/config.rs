//! Configuration module
//!
//! Builds the workflow configuration from the environment and global flags.

use anyhow::{Context, Result};
use skiff_workflow::Config;
use tracing::debug;

/// Loads configuration from `SKIFF_*` variables, then applies the URL flag
pub fn load(orchestrator_url: String) -> Result<Config> {
    let mut config = Config::from_env();
    config.orchestrator_url = orchestrator_url;

    config.validate().context("Invalid configuration")?;
    debug!("Loaded configuration: {:?}", config);

    Ok(config)
}
