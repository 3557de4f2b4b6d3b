//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing the logging subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A level, directive or format string did not parse.
    #[error("invalid logging configuration: {0}")]
    ConfigError(String),

    /// The subscriber or file appender could not be installed.
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    /// The log directory could not be created.
    #[error("log directory error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
