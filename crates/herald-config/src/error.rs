use std::io;
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    ReadError {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A configuration file (or the merged result) is not valid TOML for
    /// [`HarnessConfig`](crate::HarnessConfig).
    #[error("failed to parse config at {path}: {source}")]
    ParseError {
        /// Path to the file, or a placeholder for in-memory sources.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or not one of the accepted choices.
    #[error("invalid value for '{field}': {message}")]
    ValidationError {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// An environment override could not be applied.
    #[error("environment variable '{var_name}': {message}")]
    EnvError {
        /// Name of the variable.
        var_name: String,
        /// What is wrong with its value.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
