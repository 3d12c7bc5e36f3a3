//! Configuration error types.

use thiserror::Error;

/// Errors raised while building a rule table or loading options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Options without a marker class.
    #[error("target class is required: css class name expected")]
    MissingTargetClass,

    /// A key option with an empty key.
    #[error("key option has an empty key")]
    EmptyKey,

    /// A `/pattern/` key that does not compile.
    #[error("invalid key pattern {key}: {source}")]
    InvalidPattern {
        key: String,
        source: regex::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
