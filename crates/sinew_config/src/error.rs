//! Errors raised while loading `sinew.toml`.

/// Why a router configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML is malformed or a value has the wrong type.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A setting parsed but is outside its allowed range.
    #[error("invalid `{key}`: {reason}")]
    ValidationError {
        /// Dotted key of the offending setting, e.g. `search.max_depth`.
        key: &'static str,
        /// What is wrong with the value.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_the_key() {
        let err = ConfigError::ValidationError {
            key: "router.jobs",
            reason: "must be at least 1",
        };
        assert_eq!(format!("{err}"), "invalid `router.jobs`: must be at least 1");
    }

    #[test]
    fn parse_error_wraps_toml() {
        let toml_err = toml::from_str::<toml::Table>("jobs = = 2").unwrap_err();
        let err = ConfigError::from(toml_err);
        assert!(format!("{err}").starts_with("failed to parse configuration:"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "sinew.toml");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
