//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while parsing or validating hook configuration.
///
/// All of these are reported before any remote call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required keyword arguments were not supplied
    #[error("some required keyword arguments are missing: {}", .missing.join(", "))]
    MissingArguments { missing: Vec<String> },

    /// A keyword argument was malformed or carried an invalid value
    #[error("invalid argument '{key}': {message}")]
    InvalidArgument { key: String, message: String },

    /// Unknown lifecycle action
    #[error("value of \"action\" must be one of \"request\", \"delete\" (got '{0}')")]
    InvalidAction(String),

    /// Resolver called with the wrong number of positional parameters
    #[error("resolver requires either one or two positional parameters: {usage} (got {count})")]
    ResolverArguments { usage: &'static str, count: usize },

    /// Field-level validation failed
    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Stack configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// Stack configuration file has an extension we do not read
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading a configuration file
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    pub fn invalid_argument(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            key: key.into(),
            message: message.into(),
        }
    }
}
