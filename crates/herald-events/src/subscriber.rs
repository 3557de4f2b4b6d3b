//! Handler-based subscriber.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::debug;

use crate::error::{PubSubError, PubSubResult};
use crate::factory::PublisherFactory;
use crate::handle::SubscriptionHandle;
use crate::observer::{ObservedError, Observer};
use crate::publisher::Publisher;

/// Handler for published values.
pub type NextHandler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handler for published errors.
pub type ErrorHandler = Arc<dyn Fn(&ObservedError) + Send + Sync>;

/// Handler for publisher completion.
pub type CompletedHandler = Arc<dyn Fn() + Send + Sync>;

/// An observer assembled from bound closures.
///
/// A subscriber is attached to at most one publisher at a time. Subscribing
/// again releases the previous subscription first. Handlers of each kind run
/// in the order they were bound.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use herald_events::{Publisher, Subscriber};
///
/// let publisher = Publisher::<String>::new();
/// let subscriber = Arc::new(Subscriber::<String>::new());
/// subscriber.bind_on_receive(|value| println!("got {value}"));
///
/// assert!(subscriber.subscribe(&publisher));
/// publisher.publish(&"hello".to_string());
///
/// subscriber.unsubscribe();
/// assert_eq!(publisher.subscriber_count(), 0);
/// ```
pub struct Subscriber<T> {
    name: String,
    handle: Mutex<Option<SubscriptionHandle<T>>>,
    next_handlers: RwLock<Vec<NextHandler<T>>>,
    error_handlers: RwLock<Vec<ErrorHandler>>,
    completed_handlers: RwLock<Vec<CompletedHandler>>,
}

impl<T> Default for Subscriber<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("name", &self.name)
            .field("subscribed", &self.is_subscribed())
            .finish_non_exhaustive()
    }
}

fn snapshot<H: Clone>(handlers: &RwLock<Vec<H>>) -> Vec<H> {
    handlers
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn append<H>(handlers: &RwLock<Vec<H>>, handler: H) {
    handlers
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(handler);
}

impl<T> Subscriber<T> {
    /// Create an unsubscribed subscriber with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_name(format!("subscriber<{}>", std::any::type_name::<T>()))
    }

    /// Create a subscriber with a custom name for log output.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: Mutex::new(None),
            next_handlers: RwLock::new(Vec::new()),
            error_handlers: RwLock::new(Vec::new()),
            completed_handlers: RwLock::new(Vec::new()),
        }
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<SubscriptionHandle<T>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind a handler for published values.
    pub fn bind_on_receive<F>(&self, handler: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        append(&self.next_handlers, Arc::new(handler) as NextHandler<T>);
    }

    /// Bind a handler for published errors.
    pub fn bind_on_error<F>(&self, handler: F)
    where
        F: Fn(&ObservedError) + Send + Sync + 'static,
    {
        append(&self.error_handlers, Arc::new(handler) as ErrorHandler);
    }

    /// Bind a handler for publisher completion.
    pub fn bind_on_completed<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        append(&self.completed_handlers, Arc::new(handler) as CompletedHandler);
    }

    /// Run every bound value handler with `data`.
    pub fn on_receive(&self, data: &T) {
        for handler in snapshot(&self.next_handlers) {
            handler(data);
        }
    }

    /// Run every bound error handler. The subscription is kept.
    pub fn on_error(&self, error: &ObservedError) {
        for handler in snapshot(&self.error_handlers) {
            handler(error);
        }
    }

    /// Run every bound completion handler, then unsubscribe.
    ///
    /// Called directly, this always drops the current subscription. A
    /// completion delivered by a publisher goes through
    /// [`Observer::on_completed`] instead, which keeps a subscription that
    /// is still active elsewhere.
    pub fn on_completed(&self) {
        for handler in snapshot(&self.completed_handlers) {
            handler();
        }
        self.unsubscribe();
    }

    /// Release the current subscription, if any.
    ///
    /// Returns `true` if an observer entry was actually removed from a
    /// publisher.
    pub fn unsubscribe(&self) -> bool {
        let handle = self.lock_handle().take();
        let Some(handle) = handle else {
            return false;
        };
        let removed = handle.release();
        if removed {
            debug!(subscriber = %self.name, "Unsubscribed");
        }
        removed
    }

    /// Equivalent to [`unsubscribe`](Self::unsubscribe).
    pub fn dispose(&self) {
        self.unsubscribe();
    }

    /// Whether the subscriber is attached to a live publisher.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.lock_handle()
            .as_ref()
            .is_some_and(SubscriptionHandle::is_active)
    }

    /// Name used in log fields.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: 'static> Subscriber<T> {
    /// Subscribe to `publisher`, releasing any previous subscription first.
    ///
    /// Returns `false` if the publisher refused the subscription, either
    /// because it has completed or because this same `Arc` is already in
    /// its subscriber list through [`Publisher::subscribe`]. The subscriber
    /// then holds no handle.
    pub fn subscribe(self: &Arc<Self>, publisher: &Publisher<T>) -> bool {
        let mut slot = self.lock_handle();
        if let Some(previous) = slot.take() {
            previous.release();
        }

        let observer: Arc<dyn Observer<T>> = Arc::clone(self) as Arc<dyn Observer<T>>;
        *slot = publisher.subscribe(observer);
        slot.is_some()
    }

    /// Subscribe to the publisher registered for `T` in `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubError::PublisherNotRegistered`] if `factory` holds no
    /// publisher for `T`. Any previous subscription is kept in that case.
    pub fn subscribe_from(self: &Arc<Self>, factory: &PublisherFactory) -> PubSubResult<bool> {
        let publisher = factory
            .resolve::<T>()
            .ok_or(PubSubError::PublisherNotRegistered {
                type_name: std::any::type_name::<T>(),
            })?;
        Ok(self.subscribe(&publisher))
    }
}

impl<T> Observer<T> for Subscriber<T> {
    fn on_next(&self, data: &T) {
        self.on_receive(data);
    }

    fn on_error(&self, error: &ObservedError) {
        Subscriber::on_error(self, error);
    }

    /// A publisher drains its list before completing its observers, so the
    /// held handle is inactive only when it belongs to the completing
    /// publisher. An active handle points at a publisher this subscriber
    /// moved to afterwards and is kept.
    fn on_completed(&self) {
        for handler in snapshot(&self.completed_handlers) {
            handler();
        }
        let detached = {
            let mut slot = self.lock_handle();
            if slot.as_ref().is_some_and(SubscriptionHandle::is_active) {
                None
            } else {
                slot.take()
            }
        };
        if let Some(handle) = detached {
            handle.release();
            debug!(subscriber = %self.name, "Unsubscribed on completion");
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(subscriber: &Subscriber<u32>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        subscriber.bind_on_receive(move |_| {
            handler_count.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_handlerless_subscriber_is_noop() {
        let publisher = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());

        assert!(subscriber.subscribe(&publisher));
        let delivery = publisher.publish(&1);
        assert_eq!(delivery.delivered, 1);
        assert!(delivery.is_clean());
    }

    #[test]
    fn test_handlers_run_in_binding_order() {
        let subscriber = Subscriber::<u32>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            subscriber.bind_on_receive(move |value| {
                order.lock().unwrap().push((tag, *value));
            });
        }

        subscriber.on_receive(&4);
        assert_eq!(*order.lock().unwrap(), vec![("first", 4), ("second", 4)]);
    }

    #[test]
    fn test_resubscribe_releases_previous() {
        let first = Publisher::<u32>::new();
        let second = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let count = counting(&subscriber);

        assert!(subscriber.subscribe(&first));
        assert!(subscriber.subscribe(&second));
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);

        first.publish(&1);
        second.publish(&2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resubscribe_same_publisher_keeps_single_entry() {
        let publisher = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let count = counting(&subscriber);

        assert!(subscriber.subscribe(&publisher));
        assert!(subscriber.subscribe(&publisher));
        assert_eq!(publisher.subscriber_count(), 1);

        publisher.publish(&1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_without_subscription() {
        let subscriber = Subscriber::<u32>::new();
        assert!(!subscriber.unsubscribe());
        subscriber.dispose();
        assert!(!subscriber.is_subscribed());
    }

    #[test]
    fn test_dispose_releases_subscription() {
        let publisher = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let count = counting(&subscriber);

        subscriber.subscribe(&publisher);
        assert!(subscriber.is_subscribed());
        subscriber.dispose();
        assert!(!subscriber.is_subscribed());

        publisher.publish(&1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_keeps_subscription() {
        let publisher = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let errors = Arc::new(Mutex::new(Vec::new()));
        let handler_errors = Arc::clone(&errors);
        subscriber.bind_on_error(move |error| {
            handler_errors.lock().unwrap().push(error.to_string());
        });

        subscriber.subscribe(&publisher);
        publisher.publish_error(&std::io::Error::other("late data"));

        assert_eq!(*errors.lock().unwrap(), vec!["late data"]);
        assert!(subscriber.is_subscribed());
    }

    #[test]
    fn test_completion_runs_handlers_then_unsubscribes() {
        let publisher = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let completions = Arc::new(AtomicUsize::new(0));
        let handler_completions = Arc::clone(&completions);
        subscriber.bind_on_completed(move || {
            handler_completions.fetch_add(1, Ordering::SeqCst);
        });

        subscriber.subscribe(&publisher);
        publisher.dispose();

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(!subscriber.is_subscribed());
        assert!(!subscriber.subscribe(&publisher));
    }

    #[test]
    fn test_late_completion_keeps_newer_subscription() {
        let first = Publisher::<u32>::with_name("first");
        let second = Publisher::<u32>::with_name("second");
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let completions = Arc::new(AtomicUsize::new(0));
        let handler_completions = Arc::clone(&completions);
        subscriber.bind_on_completed(move || {
            handler_completions.fetch_add(1, Ordering::SeqCst);
        });

        assert!(subscriber.subscribe(&first));
        assert!(subscriber.subscribe(&second));

        // Completion from `first` arriving after the move to `second`.
        Observer::on_completed(&*subscriber);

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(subscriber.is_subscribed());
        assert_eq!(second.subscriber_count(), 1);

        // Calling the inherent method still drops the subscription.
        subscriber.on_completed();
        assert!(!subscriber.is_subscribed());
        assert_eq!(second.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_refused_when_already_registered_directly() {
        let publisher = Publisher::<u32>::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let observer = Arc::clone(&subscriber) as Arc<dyn Observer<u32>>;
        let _direct = publisher.subscribe(observer).unwrap();

        assert!(!subscriber.subscribe(&publisher));
        assert!(!subscriber.is_subscribed());
        assert_eq!(publisher.subscriber_count(), 1);
    }

    #[test]
    fn test_handler_may_bind_more_handlers() {
        let subscriber = Arc::new(Subscriber::<u32>::new());
        let inner = Arc::clone(&subscriber);
        subscriber.bind_on_receive(move |_| {
            inner.bind_on_receive(|_| {});
        });

        subscriber.on_receive(&1);
        subscriber.on_receive(&2);
        assert_eq!(snapshot(&subscriber.next_handlers).len(), 3);
    }

    #[test]
    fn test_subscribe_from_unregistered_type() {
        let factory = PublisherFactory::new();
        let subscriber = Arc::new(Subscriber::<u32>::new());

        let err = subscriber.subscribe_from(&factory).unwrap_err();
        assert!(matches!(
            err,
            PubSubError::PublisherNotRegistered { type_name: "u32" }
        ));
    }

    #[test]
    fn test_subscribe_from_registered_publisher() {
        let factory = PublisherFactory::new();
        let publisher = Arc::new(Publisher::<u32>::new());
        assert!(factory.register(&publisher));

        let subscriber = Arc::new(Subscriber::<u32>::new());
        let count = counting(&subscriber);
        assert!(subscriber.subscribe_from(&factory).unwrap());

        publisher.publish(&7);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_name_mentions_type() {
        let subscriber = Subscriber::<u32>::new();
        assert_eq!(subscriber.name(), "subscriber<u32>");
        assert_eq!(Observer::name(&subscriber), "subscriber<u32>");
    }
}
