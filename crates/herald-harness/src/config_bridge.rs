//! Bridge from [`HarnessConfig`] to telemetry types.
//!
//! `herald-config` has no dependency on other herald crates, so the
//! conversion lives in the binary.

use herald_config::HarnessConfig;
use herald_telemetry::{LogConfig, LogFormat};

/// Convert the `[logging]` section to a [`LogConfig`].
///
/// Thread names are always on: the harness publishes and churns on named
/// worker threads.
#[must_use]
pub(crate) fn to_log_config(cfg: &HarnessConfig) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    let mut log_config = LogConfig::new(&cfg.logging.level)
        .with_format(format)
        .with_thread_names();

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}
