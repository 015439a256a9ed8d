//! Parsing and validation of `sinew.toml` router configuration files.
//!
//! Every section is optional; an empty file yields [`RouterConfig::default`],
//! which reproduces the search bounds and cost weights the router was tuned
//! with.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
