//! The observer interface and the identity wrapper used by the registry.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Error value carried by [`Observer::on_error`].
pub type ObservedError = dyn std::error::Error + Send + Sync + 'static;

/// Receiver side of a publisher.
///
/// Callbacks run synchronously on the publishing thread and should return
/// quickly. A callback that panics is isolated by the publisher: the panic
/// is logged and the remaining observers still receive their call.
pub trait Observer<T>: Send + Sync {
    /// Called with each published value.
    fn on_next(&self, data: &T);

    /// Called when the publisher reports an error.
    ///
    /// Default implementation ignores the error.
    fn on_error(&self, error: &ObservedError) {
        let _ = error;
    }

    /// Called once when the publisher completes.
    ///
    /// Default implementation does nothing.
    fn on_completed(&self) {}

    /// Optional name for debugging.
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Shared observer compared by `Arc` identity.
///
/// Two `ObserverRef`s are equal only when they point at the same allocation,
/// so one observer instance can sit in a registry at most once while two
/// structurally identical observers remain distinct.
pub(crate) struct ObserverRef<T>(Arc<dyn Observer<T>>);

impl<T> ObserverRef<T> {
    pub(crate) fn new(observer: Arc<dyn Observer<T>>) -> Self {
        Self(observer)
    }

    pub(crate) fn get(&self) -> &dyn Observer<T> {
        &*self.0
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl<T> Clone for ObserverRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ObserverRef<T> {
    fn eq(&self, other: &Self) -> bool {
        // Compare data pointers only; vtable pointers for the same type may
        // differ between codegen units.
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl<T> Eq for ObserverRef<T> {}

impl<T> Hash for ObserverRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T> std::fmt::Debug for ObserverRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObserverRef").field(&self.0.name()).finish()
    }
}
