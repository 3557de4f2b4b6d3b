//! Test harness helpers.

use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

/// Write `content` to a fresh `.toml` temporary file.
///
/// # Panics
///
/// Panics if the file cannot be created or written.
#[must_use]
pub fn test_config_file(content: &str) -> NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("herald-")
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Route `tracing` output to the test writer with the given filter.
///
/// Safe to call from many tests; only the first call installs a
/// subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// [`setup_test_logging`] at `warn`, which surfaces isolated panics.
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}
