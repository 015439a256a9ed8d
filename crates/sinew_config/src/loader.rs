//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::RouterConfig;
use std::path::Path;

/// The configuration file name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "sinew.toml";

/// Loads and validates `<dir>/sinew.toml`.
pub fn load_config(dir: &Path) -> Result<RouterConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a router configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RouterConfig) -> Result<(), ConfigError> {
    let checks = [
        ("router.jobs", config.router.jobs == 0),
        ("search.max_depth", config.search.max_depth == 0),
        ("cost.long_line_length", config.cost.long_line_length == 0),
    ];
    match checks.into_iter().find(|&(_, zero)| zero) {
        Some((key, _)) => Err(ConfigError::ValidationError {
            key,
            reason: "must be at least 1",
        }),
        None => Ok(()),
    }
}
