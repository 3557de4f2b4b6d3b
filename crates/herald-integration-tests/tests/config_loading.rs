//! Integration tests for layered harness configuration.

use std::collections::HashMap;

use herald_config::loader::{load_file, load_with_env};
use herald_config::{ConfigError, HarnessConfig};
use herald_test::test_config_file;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn file_then_environment_precedence() {
    let file = test_config_file(
        r#"
        [harness]
        subscribers_per_model = 20
        duration_secs = 30
        churn_enabled = false

        [logging]
        level = "debug"
        directives = ["herald_events=trace"]
        "#,
    );

    let resolved = load_with_env(
        Some(file.path()),
        &env(&[
            ("HERALD_DURATION_SECS", "2"),
            ("HERALD_LOG_FORMAT", "compact"),
        ]),
    )
    .unwrap();

    let config = resolved.config;
    assert_eq!(config.harness.subscribers_per_model, 20);
    assert_eq!(config.harness.duration_secs, 2);
    assert!(!config.harness.churn_enabled);
    assert_eq!(config.harness.max_pause_ms, 10);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "compact");
    assert_eq!(config.logging.directives, vec!["herald_events=trace"]);
    assert_eq!(
        resolved.env_overrides,
        vec!["HERALD_DURATION_SECS", "HERALD_LOG_FORMAT"]
    );
}

#[test]
fn empty_file_yields_defaults() {
    let file = test_config_file("");
    assert_eq!(load_file(file.path()).unwrap(), HarnessConfig::default());
}

#[test]
fn environment_can_produce_invalid_config() {
    let result = load_with_env(None, &env(&[("HERALD_SUBSCRIBERS_PER_MODEL", "0")]));
    match result {
        Err(ConfigError::ValidationError { field, .. }) => {
            assert_eq!(field, "harness.subscribers_per_model");
        },
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unknown_format_in_file_rejected() {
    let file = test_config_file("[logging]\nformat = \"yaml\"\n");
    assert!(matches!(
        load_file(file.path()),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn unknown_keys_are_ignored() {
    let file = test_config_file("[harness]\nsubscribers_per_model = 3\n\n[extra]\nkey = 1\n");
    let config = load_file(file.path()).unwrap();
    assert_eq!(config.harness.subscribers_per_model, 3);
}
