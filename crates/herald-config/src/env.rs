//! `HERALD_*` environment overrides.
//!
//! Environment variables override values from the embedded defaults and the
//! config file. They are applied to the merged TOML tree before it is
//! deserialized, so a malformed value is reported against the variable that
//! supplied it.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Prefix shared by every recognised variable.
pub const ENV_PREFIX: &str = "HERALD_";

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Integer,
    Boolean,
    Text,
    /// Comma-separated list of strings.
    List,
}

struct EnvMapping {
    var_name: &'static str,
    section: &'static str,
    key: &'static str,
    kind: FieldKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "HERALD_SUBSCRIBERS_PER_MODEL",
        section: "harness",
        key: "subscribers_per_model",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "HERALD_DURATION_SECS",
        section: "harness",
        key: "duration_secs",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "HERALD_MAX_PAUSE_MS",
        section: "harness",
        key: "max_pause_ms",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "HERALD_CHURN_ENABLED",
        section: "harness",
        key: "churn_enabled",
        kind: FieldKind::Boolean,
    },
    EnvMapping {
        var_name: "HERALD_PRINT_DELIVERIES",
        section: "harness",
        key: "print_deliveries",
        kind: FieldKind::Boolean,
    },
    EnvMapping {
        var_name: "HERALD_LOG_LEVEL",
        section: "logging",
        key: "level",
        kind: FieldKind::Text,
    },
    EnvMapping {
        var_name: "HERALD_LOG_FORMAT",
        section: "logging",
        key: "format",
        kind: FieldKind::Text,
    },
    EnvMapping {
        var_name: "HERALD_LOG_DIRECTIVES",
        section: "logging",
        key: "directives",
        kind: FieldKind::List,
    },
];

/// Names of every variable [`apply_env_overrides`] understands.
#[must_use]
pub fn known_vars() -> Vec<&'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name).collect()
}

/// Collect the `HERALD_*` variables of the current process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(name, _)| name.starts_with(ENV_PREFIX))
        .collect()
}

/// Apply overrides from `env_vars` to the merged tree.
///
/// Returns the names of the variables that were applied, in mapping order.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a numeric or boolean variable does
/// not parse.
pub fn apply_env_overrides<S: BuildHasher>(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Vec<&'static str>> {
    let mut applied = Vec::new();

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let value = coerce(mapping, raw)?;
        debug!(
            var = mapping.var_name,
            field = %format!("{}.{}", mapping.section, mapping.key),
            "applying environment override"
        );
        set_field(merged, mapping.section, mapping.key, value);
        applied.push(mapping.var_name);
    }

    Ok(applied)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let raw = raw.trim();
    let invalid = |expected: &str| ConfigError::EnvError {
        var_name: mapping.var_name.to_owned(),
        message: format!("expected {expected}, got '{raw}'"),
    };

    match mapping.kind {
        FieldKind::Integer => raw
            .parse::<u32>()
            .map(|n| toml::Value::Integer(i64::from(n)))
            .map_err(|_| invalid("a non-negative integer")),
        FieldKind::Boolean => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Ok(toml::Value::Boolean(false)),
            _ => Err(invalid("a boolean")),
        },
        FieldKind::Text => Ok(toml::Value::String(raw.to_owned())),
        FieldKind::List => Ok(toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| toml::Value::String(item.to_owned()))
                .collect(),
        )),
    }
}

fn set_field(root: &mut toml::Value, section: &str, key: &str, value: toml::Value) {
    let Some(root) = root.as_table_mut() else {
        return;
    };
    let table = root
        .entry(section.to_owned())
        .or_insert(toml::Value::Table(toml::map::Map::new()));
    if let Some(table) = table.as_table_mut() {
        table.insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn empty_tree() -> toml::Value {
        toml::Value::Table(toml::map::Map::new())
    }

    #[test]
    fn test_overrides_are_typed() {
        let mut tree = empty_tree();
        let env = make_env(&[
            ("HERALD_SUBSCRIBERS_PER_MODEL", "12"),
            ("HERALD_CHURN_ENABLED", "off"),
            ("HERALD_LOG_FORMAT", "json"),
        ]);

        let applied = apply_env_overrides(&mut tree, &env).unwrap();
        assert_eq!(
            applied,
            vec![
                "HERALD_SUBSCRIBERS_PER_MODEL",
                "HERALD_CHURN_ENABLED",
                "HERALD_LOG_FORMAT"
            ]
        );

        assert_eq!(
            tree["harness"]["subscribers_per_model"],
            toml::Value::Integer(12)
        );
        assert_eq!(tree["harness"]["churn_enabled"], toml::Value::Boolean(false));
        assert_eq!(
            tree["logging"]["format"],
            toml::Value::String("json".to_owned())
        );
    }

    #[test]
    fn test_list_override_splits_on_commas() {
        let mut tree = empty_tree();
        let env = make_env(&[("HERALD_LOG_DIRECTIVES", "herald_events=debug, ,hyper=warn")]);

        apply_env_overrides(&mut tree, &env).unwrap();
        let directives = tree["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[1].as_str(), Some("hyper=warn"));
    }

    #[test]
    fn test_invalid_integer_names_variable() {
        let mut tree = empty_tree();
        let env = make_env(&[("HERALD_DURATION_SECS", "soon")]);

        let err = apply_env_overrides(&mut tree, &env).unwrap_err();
        match err {
            ConfigError::EnvError { var_name, message } => {
                assert_eq!(var_name, "HERALD_DURATION_SECS");
                assert!(message.contains("soon"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_boolean_rejected() {
        let mut tree = empty_tree();
        let env = make_env(&[("HERALD_PRINT_DELIVERIES", "maybe")]);
        assert!(apply_env_overrides(&mut tree, &env).is_err());
    }

    #[test]
    fn test_unknown_variables_ignored() {
        let mut tree = empty_tree();
        let env = make_env(&[("HERALD_UNKNOWN", "1"), ("PATH", "/usr/bin")]);

        let applied = apply_env_overrides(&mut tree, &env).unwrap();
        assert!(applied.is_empty());
        assert!(tree.as_table().unwrap().is_empty());
    }

    #[test]
    fn test_known_vars_share_prefix() {
        assert!(known_vars().iter().all(|name| name.starts_with(ENV_PREFIX)));
    }
}
