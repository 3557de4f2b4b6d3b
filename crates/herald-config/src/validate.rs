//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::HarnessConfig;

/// Largest accepted `harness.subscribers_per_model`.
pub const MAX_SUBSCRIBERS_PER_MODEL: usize = 10_000;

/// Largest accepted `harness.duration_secs` (one day).
pub const MAX_DURATION_SECS: u64 = 86_400;

/// Largest accepted `harness.max_pause_ms`.
pub const MAX_PAUSE_MS: u64 = 60_000;

/// Accepted `logging.level` values.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted `logging.format` values.
pub const LOG_FORMATS: [&str; 4] = ["pretty", "compact", "json", "full"];

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::ValidationError`] found.
pub fn validate(config: &HarnessConfig) -> ConfigResult<()> {
    validate_harness(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_harness(config: &HarnessConfig) -> ConfigResult<()> {
    let h = &config.harness;

    if h.subscribers_per_model == 0 || h.subscribers_per_model > MAX_SUBSCRIBERS_PER_MODEL {
        return Err(invalid(
            "harness.subscribers_per_model",
            format!("must be between 1 and {MAX_SUBSCRIBERS_PER_MODEL}"),
        ));
    }

    if h.duration_secs == 0 || h.duration_secs > MAX_DURATION_SECS {
        return Err(invalid(
            "harness.duration_secs",
            format!("must be between 1 and {MAX_DURATION_SECS}"),
        ));
    }

    if h.max_pause_ms > MAX_PAUSE_MS {
        return Err(invalid(
            "harness.max_pause_ms",
            format!("must not exceed {MAX_PAUSE_MS}"),
        ));
    }

    Ok(())
}

fn validate_logging(config: &HarnessConfig) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported level '{}'; expected one of: {}",
                l.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }

    if let Some(empty) = l.directives.iter().position(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            format!("directive at index {empty} is empty"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&HarnessConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_subscribers_rejected() {
        let mut config = HarnessConfig::default();
        config.harness.subscribers_per_model = 0;
        assert_eq!(field_of(validate(&config)), "harness.subscribers_per_model");
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut config = HarnessConfig::default();
        config.harness.duration_secs = 0;
        assert_eq!(field_of(validate(&config)), "harness.duration_secs");
    }

    #[test]
    fn test_excessive_pause_rejected() {
        let mut config = HarnessConfig::default();
        config.harness.max_pause_ms = 120_000;
        assert_eq!(field_of(validate(&config)), "harness.max_pause_ms");
    }

    #[test]
    fn test_zero_pause_allowed() {
        let mut config = HarnessConfig::default();
        config.harness.max_pause_ms = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_level_rejected() {
        let mut config = HarnessConfig::default();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut config = HarnessConfig::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }

    #[test]
    fn test_empty_directive_rejected() {
        let mut config = HarnessConfig::default();
        config.logging.directives = vec!["herald_events=debug".to_owned(), " ".to_owned()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }
}
