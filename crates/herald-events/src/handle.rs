//! Subscription handles.

use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::observer::{Observer, ObserverRef};
use crate::registry::ConcurrentRegistry;

/// Removes one observer from one publisher when released.
///
/// Dropping the handle releases it. The handle holds only weak references,
/// so it never keeps the publisher or the observer alive, and releasing
/// after either is gone is a harmless no-op.
#[must_use = "dropping a SubscriptionHandle unsubscribes immediately"]
pub struct SubscriptionHandle<T> {
    observer: Weak<dyn Observer<T>>,
    registry: Weak<ConcurrentRegistry<ObserverRef<T>>>,
    released: AtomicBool,
}

impl<T> SubscriptionHandle<T> {
    pub(crate) fn new(
        observer: Weak<dyn Observer<T>>,
        registry: Weak<ConcurrentRegistry<ObserverRef<T>>>,
    ) -> Self {
        Self {
            observer,
            registry,
            released: AtomicBool::new(false),
        }
    }

    /// Remove the observer from the publisher.
    ///
    /// Idempotent. Returns `true` only for the call that actually removed
    /// the observer from a live publisher.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }

        let (Some(observer), Some(registry)) = (self.observer.upgrade(), self.registry.upgrade())
        else {
            return false;
        };

        let name = observer.name().to_owned();
        let removed = registry.remove(&ObserverRef::new(observer));
        if removed {
            debug!(subscriber = %name, "Subscription released");
        }
        removed
    }

    /// Whether [`release`](Self::release) has run, explicitly or via drop.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Whether the observer is still registered with a live publisher.
    #[must_use]
    pub fn is_active(&self) -> bool {
        if self.is_released() {
            return false;
        }
        match (self.observer.upgrade(), self.registry.upgrade()) {
            (Some(observer), Some(registry)) => registry.contains(&ObserverRef::new(observer)),
            _ => false,
        }
    }
}

impl<T> Drop for SubscriptionHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> std::fmt::Debug for SubscriptionHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Nop;

    impl Observer<i32> for Nop {
        fn on_next(&self, _data: &i32) {}
    }

    fn registered() -> (
        Arc<dyn Observer<i32>>,
        Arc<ConcurrentRegistry<ObserverRef<i32>>>,
        SubscriptionHandle<i32>,
    ) {
        let observer: Arc<dyn Observer<i32>> = Arc::new(Nop);
        let registry = Arc::new(ConcurrentRegistry::new());
        registry.add(ObserverRef::new(Arc::clone(&observer)));
        let handle = SubscriptionHandle::new(Arc::downgrade(&observer), Arc::downgrade(&registry));
        (observer, registry, handle)
    }

    #[test]
    fn test_release_is_idempotent() {
        let (_observer, registry, handle) = registered();
        assert!(handle.is_active());

        assert!(handle.release());
        assert!(!handle.release());
        assert!(handle.is_released());
        assert!(!handle.is_active());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drop_releases() {
        let (_observer, registry, handle) = registered();
        drop(handle);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_after_registry_dropped() {
        let (_observer, registry, handle) = registered();
        drop(registry);

        assert!(!handle.is_active());
        assert!(!handle.release());
    }

    #[test]
    fn test_release_only_removes_own_observer() {
        let (_observer, registry, handle) = registered();
        let other: Arc<dyn Observer<i32>> = Arc::new(Nop);
        registry.add(ObserverRef::new(Arc::clone(&other)));

        assert!(handle.release());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&ObserverRef::new(other)));
    }
}
