//! Layered loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge the config file, if one was given
//! 3. Apply `HERALD_*` environment overrides
//! 4. Deserialize the merged tree into [`HarnessConfig`]
//! 5. Validate
//!
//! Command-line flags are the final layer; the binary applies them to the
//! returned config and validates again.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::HarnessConfig;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum accepted config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration together with where its values came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// The validated configuration.
    pub config: HarnessConfig,
    /// Config file that was merged over the defaults, if any.
    pub loaded_file: Option<PathBuf>,
    /// Environment variables that overrode a value.
    pub env_overrides: Vec<&'static str>,
}

/// Load defaults, `path` and the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, an
/// environment variable is malformed, or the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(path, &collect_env_vars())
}

/// Like [`load`], with an explicit environment.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_with_env<S: BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged = parse_toml(DEFAULTS_TOML, "<embedded defaults>")?;

    let loaded_file = match path {
        Some(path) => {
            let overlay = read_toml_file(path)?;
            merge_tables(&mut merged, overlay);
            info!(path = %path.display(), "loaded config file");
            Some(path.to_path_buf())
        },
        None => None,
    };

    let env_overrides = apply_env_overrides(&mut merged, env_vars)?;
    if !env_overrides.is_empty() {
        debug!(count = env_overrides.len(), "applied environment overrides");
    }

    let config: HarnessConfig =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_file,
        env_overrides,
    })
}

/// Load a single config file over the built-in defaults, ignoring the
/// environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or
/// validated.
pub fn load_file(path: &Path) -> ConfigResult<HarnessConfig> {
    let no_env: HashMap<String, String> = HashMap::new();
    load_with_env(Some(path), &no_env).map(|resolved| resolved.config)
}

fn parse_toml(content: &str, origin: &str) -> ConfigResult<toml::Value> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })
}

fn read_toml_file(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Checked after reading so there is no window between stat and read.
    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }

    parse_toml(&content, &path.display().to_string())
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in `overlay` replaces the one in `base`.
fn merge_tables(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_tables(existing, value),
                    None => {
                        base.insert(key, value);
                    },
                }
            }
        },
        (base, overlay) => *base = overlay,
    }
}
