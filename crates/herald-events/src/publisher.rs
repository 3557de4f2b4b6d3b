//! Typed publisher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::delivery::{Delivery, DeliveryStage, fan_out};
use crate::handle::SubscriptionHandle;
use crate::observer::{ObservedError, Observer, ObserverRef};
use crate::registry::ConcurrentRegistry;
use crate::signal::{CompletionSignal, ListenerId};

/// Broadcasts values of type `T` to every subscribed observer.
///
/// A publisher is either active or completed. [`dispose`](Self::dispose)
/// moves it to completed, which is terminal: the subscriber list is emptied,
/// every observer that was subscribed receives `on_completed`, and the
/// completion signal fires. Dropping an active publisher disposes it.
///
/// Delivery is synchronous. Each publish works on a snapshot of the
/// subscriber list taken at call time, so observers may subscribe or
/// unsubscribe from inside a callback.
pub struct Publisher<T> {
    name: String,
    registry: Arc<ConcurrentRegistry<ObserverRef<T>>>,
    completion: CompletionSignal,
    completed: AtomicBool,
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("name", &self.name)
            .field("subscriber_count", &self.registry.len())
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl<T> Publisher<T> {
    /// Create an active publisher named after `T`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_name(std::any::type_name::<T>())
    }

    /// Create an active publisher with a custom name for log output.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: Arc::new(ConcurrentRegistry::new()),
            completion: CompletionSignal::new(),
            completed: AtomicBool::new(false),
        }
    }

    /// Name used in log fields.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe an observer.
    ///
    /// Returns `None` when the observer is already subscribed (the existing
    /// subscription is left untouched) or when the publisher has completed.
    /// Otherwise returns a handle that removes the observer when released
    /// or dropped.
    pub fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Option<SubscriptionHandle<T>> {
        if self.is_completed() {
            debug!(
                publisher = %self.name,
                subscriber = %observer.name(),
                "Subscribe after completion ignored"
            );
            return None;
        }

        let weak = Arc::downgrade(&observer);
        let entry = ObserverRef::new(observer);
        if !self.registry.add(entry.clone()) {
            debug!(
                publisher = %self.name,
                subscriber = %entry.get().name(),
                "Duplicate subscribe ignored"
            );
            return None;
        }

        // A concurrent dispose may have drained the registry before our add.
        if self.is_completed() {
            self.registry.remove(&entry);
            return None;
        }

        debug!(
            publisher = %self.name,
            subscriber = %entry.get().name(),
            "Subscriber added"
        );
        Some(SubscriptionHandle::new(weak, Arc::downgrade(&self.registry)))
    }

    /// Whether `observer` is currently subscribed.
    #[must_use]
    pub fn contains(&self, observer: &Arc<dyn Observer<T>>) -> bool {
        self.registry.contains(&ObserverRef::new(Arc::clone(observer)))
    }

    /// Number of currently subscribed observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Deliver `data` to every observer subscribed at call time.
    ///
    /// A panic in one observer is logged and recorded in the returned
    /// [`Delivery`]; the remaining observers are still called. With no
    /// subscribers, or after completion, this is a no-op.
    pub fn publish(&self, data: &T) -> Delivery {
        let observers = self.registry.snapshot();
        trace!(publisher = %self.name, subscriber_count = observers.len(), "Publishing");
        fan_out(&self.name, &observers, DeliveryStage::Next, |observer| {
            observer.on_next(data);
        })
    }

    /// Deliver an error to every observer subscribed at call time.
    ///
    /// The publisher stays active.
    pub fn publish_error(&self, error: &ObservedError) -> Delivery {
        let observers = self.registry.snapshot();
        debug!(publisher = %self.name, error = %error, "Publishing error");
        fan_out(&self.name, &observers, DeliveryStage::Error, |observer| {
            observer.on_error(error);
        })
    }

    /// Complete the publisher.
    ///
    /// Empties the subscriber list, calls `on_completed` on every observer
    /// that was in it, then fires the completion signal. Only the first call
    /// does anything; later calls return an empty [`Delivery`].
    pub fn dispose(&self) -> Delivery {
        if self.completed.swap(true, Ordering::SeqCst) {
            return Delivery::default();
        }

        let observers = self.registry.drain();
        debug!(
            publisher = %self.name,
            subscriber_count = observers.len(),
            "Completing publisher"
        );
        let delivery = fan_out(&self.name, &observers, DeliveryStage::Completed, |observer| {
            observer.on_completed();
        });
        drop(observers);

        self.completion.fire();
        delivery
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Register a listener for the completion signal.
    ///
    /// A listener added after completion runs immediately.
    pub fn on_complete<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.completion.add_listener(Arc::new(listener))
    }

    /// Remove a completion listener that has not fired yet.
    pub fn remove_complete_listener(&self, id: ListenerId) -> bool {
        self.completion.remove_listener(id)
    }
}

impl<T> Drop for Publisher<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
