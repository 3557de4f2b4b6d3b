//! Test fixtures for publishers and observers.

use std::sync::Arc;

use herald_events::{Observer, Publisher, SubscriptionHandle};

use crate::mocks::RecordingObserver;

/// Payload type for tests that need something richer than an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEvent {
    /// Monotonic sequence number assigned by the test.
    pub seq: u64,
    /// Free-form label.
    pub label: String,
}

impl TestEvent {
    /// Create an event.
    #[must_use]
    pub fn new(seq: u64, label: impl Into<String>) -> Self {
        Self {
            seq,
            label: label.into(),
        }
    }
}

/// Create a shared publisher named `test-publisher`.
#[must_use]
pub fn test_publisher<T>() -> Arc<Publisher<T>> {
    Arc::new(Publisher::with_name("test-publisher"))
}

/// Create `count` recorders named `recorder-0`, `recorder-1`, ...
#[must_use]
pub fn recording_subscribers<T>(count: usize) -> Vec<Arc<RecordingObserver<T>>> {
    (0..count)
        .map(|i| Arc::new(RecordingObserver::new(format!("recorder-{i}"))))
        .collect()
}

/// Upcast a recorder for [`Publisher::subscribe`].
#[must_use]
pub fn as_observer<T>(recorder: &Arc<RecordingObserver<T>>) -> Arc<dyn Observer<T>>
where
    T: Clone + Send + 'static,
{
    Arc::clone(recorder) as Arc<dyn Observer<T>>
}

/// Subscribe every recorder to `publisher`.
///
/// # Panics
///
/// Panics if the publisher refuses any of them.
#[must_use]
pub fn subscribe_all<T>(
    publisher: &Publisher<T>,
    recorders: &[Arc<RecordingObserver<T>>],
) -> Vec<SubscriptionHandle<T>>
where
    T: Clone + Send + 'static,
{
    recorders
        .iter()
        .map(|recorder| {
            publisher
                .subscribe(as_observer(recorder))
                .expect("publisher refused subscription")
        })
        .collect()
}
