//! Observer and listener doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use herald_events::{ObservedError, Observer};

/// Observer that records every callback it receives.
///
/// Uses `std::sync::Mutex` internally so it can be inspected from any
/// thread while a publisher is still delivering to it.
#[derive(Debug)]
pub struct RecordingObserver<T> {
    name: String,
    values: Mutex<Vec<T>>,
    errors: Mutex<Vec<String>>,
    completions: AtomicUsize,
}

impl<T> Default for RecordingObserver<T> {
    fn default() -> Self {
        Self::new("recorder")
    }
}

impl<T> RecordingObserver<T> {
    /// Create a recorder reporting `name` to publishers.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            completions: AtomicUsize::new(0),
        }
    }

    /// Number of values received so far.
    #[must_use]
    pub fn received_count(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Messages of every error received, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times `on_completed` ran.
    #[must_use]
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl<T: Clone> RecordingObserver<T> {
    /// Copy of every value received, in delivery order.
    #[must_use]
    pub fn received(&self) -> Vec<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: Clone + Send> Observer<T> for RecordingObserver<T> {
    fn on_next(&self, data: &T) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(data.clone());
    }

    fn on_error(&self, error: &ObservedError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.to_string());
    }

    fn on_completed(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Observer that panics in every callback.
///
/// Used to check that one faulty observer cannot stop delivery to others.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingObserver;

impl<T> Observer<T> for PanickingObserver {
    fn on_next(&self, _data: &T) {
        panic!("PanickingObserver::on_next");
    }

    fn on_error(&self, _error: &ObservedError) {
        panic!("PanickingObserver::on_error");
    }

    fn on_completed(&self) {
        panic!("PanickingObserver::on_completed");
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "panicking"
    }
}

/// Counts how often a completion listener fired.
#[derive(Debug, Default, Clone)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a listener that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback to hand to [`Publisher::on_complete`](herald_events::Publisher::on_complete).
    #[must_use]
    pub fn callback(&self) -> impl Fn() + Send + Sync + 'static {
        let count = Arc::clone(&self.count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Number of times any callback from this listener ran.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
