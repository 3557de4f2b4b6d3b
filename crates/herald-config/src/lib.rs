#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration for the herald demonstration harness.
//!
//! # Usage
//!
//! ```rust,no_run
//! use herald_config::HarnessConfig;
//!
//! let resolved = HarnessConfig::load(Some(std::path::Path::new("herald.toml"))).unwrap();
//! println!("{} subscribers per model", resolved.config.harness.subscribers_per_model);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Command-line flags** (applied by the binary)
//! 2. **Environment variables** (`HERALD_*`)
//! 3. **Config file** (`--config <path>`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other herald crates. Conversion to
//! logging types happens in the binary.

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Layered loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::{HarnessConfig, HarnessSection, LoggingSection};

impl HarnessConfig {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed, an environment
    /// override does not parse, or the result fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(path)
    }

    /// Check every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }
}
