//! Configuration types for the demonstration harness.
//!
//! Every struct implements [`Default`] with the values the harness ships
//! with, so a bare `[section]` header in TOML produces a working
//! configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for `herald-harness`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Workload shape: subscriber counts, run length, churn.
    pub harness: HarnessSection,
    /// Logging level, format and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// HarnessSection
// ---------------------------------------------------------------------------

/// Workload settings for a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSection {
    /// Subscribers created for each payload model.
    pub subscribers_per_model: usize,
    /// Wall-clock length of the run in seconds.
    pub duration_secs: u64,
    /// Upper bound for the random pause between worker iterations, in
    /// milliseconds. Zero disables pausing.
    pub max_pause_ms: u64,
    /// Whether the updater thread replaces subscribers during the run.
    pub churn_enabled: bool,
    /// Log every delivered value at `info` instead of counting silently.
    pub print_deliveries: bool,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            subscribers_per_model: 50,
            duration_secs: 5,
            max_pause_ms: 10,
            churn_enabled: true,
            print_deliveries: false,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["herald_events=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
