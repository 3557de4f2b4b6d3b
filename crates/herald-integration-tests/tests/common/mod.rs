//! Shared helpers for integration tests.

use std::sync::Arc;

use herald_events::Subscriber;
use herald_test::setup_test_logging_default;

/// Route isolated-panic warnings to the test output.
#[allow(dead_code)]
pub fn init_logging() {
    setup_test_logging_default();
}

/// A subscriber named `name` with no handlers bound.
#[allow(dead_code)]
pub fn bare_subscriber<T>(name: &str) -> Arc<Subscriber<T>> {
    Arc::new(Subscriber::with_name(name))
}
