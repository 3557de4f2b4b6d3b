//! Integration tests for type-keyed publisher registration.

mod common;

use std::sync::Arc;
use std::thread;

use herald_events::prelude::*;
use herald_test::{RecordingObserver, TestEvent, as_observer};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Heartbeat(u32);

#[test]
fn register_resolve_dispose_reregister() {
    let factory = PublisherFactory::new();

    let first = Arc::new(Publisher::<TestEvent>::with_name("first"));
    assert!(factory.register(&first));
    let resolved = factory.resolve::<TestEvent>().unwrap();
    assert!(Arc::ptr_eq(&first, &resolved));
    drop(resolved);

    // A second live publisher for the same type is refused.
    let rival = Arc::new(Publisher::<TestEvent>::with_name("rival"));
    assert!(!factory.register(&rival));

    first.dispose();
    assert!(factory.resolve::<TestEvent>().is_none());
    assert!(!factory.contains::<TestEvent>());

    // The slot is free again once the first publisher completed.
    let second = Arc::new(Publisher::<TestEvent>::with_name("second"));
    assert!(factory.register(&second));
    assert_eq!(factory.resolve::<TestEvent>().unwrap().name(), "second");
}

#[test]
fn completed_publisher_cannot_be_registered() {
    let factory = PublisherFactory::new();
    let publisher = Arc::new(Publisher::<Heartbeat>::new());
    publisher.dispose();

    assert!(!factory.register(&publisher));
    assert!(factory.is_empty());
}

#[test]
fn stale_completion_does_not_evict_newer_publisher() {
    let factory = PublisherFactory::new();

    let old = Arc::new(Publisher::<Heartbeat>::with_name("old"));
    assert!(factory.register(&old));
    assert!(factory.unregister::<Heartbeat>());

    let new = Arc::new(Publisher::<Heartbeat>::with_name("new"));
    assert!(factory.register(&new));

    old.dispose();
    assert_eq!(factory.resolve::<Heartbeat>().unwrap().name(), "new");
}

#[test]
fn types_are_kept_apart() {
    let factory = PublisherFactory::new();
    let events = Arc::new(Publisher::<TestEvent>::new());
    let beats = Arc::new(Publisher::<Heartbeat>::new());

    assert!(factory.register(&events));
    assert!(factory.register(&beats));
    assert_eq!(factory.len(), 2);

    beats.dispose();
    assert!(factory.contains::<TestEvent>());
    assert!(!factory.contains::<Heartbeat>());
    assert_eq!(factory.len(), 1);
}

#[test]
fn subscribe_from_uses_registered_publisher() {
    let factory = PublisherFactory::new();
    let publisher = Arc::new(Publisher::<Heartbeat>::new());
    assert!(factory.register(&publisher));

    let recorder = Arc::new(RecordingObserver::<Heartbeat>::new("direct"));
    let _handle = publisher.subscribe(as_observer(&recorder)).unwrap();

    let subscriber = Arc::new(Subscriber::<Heartbeat>::with_name("via-factory"));
    assert!(subscriber.subscribe_from(&factory).unwrap());

    let delivery = publisher.publish(&Heartbeat(1));
    assert_eq!(delivery.delivered, 2);
    assert_eq!(recorder.received(), vec![Heartbeat(1)]);
}

#[test]
fn subscribe_from_without_publisher_fails() {
    let factory = PublisherFactory::new();
    let subscriber = common::bare_subscriber::<Heartbeat>("orphan");

    let err = subscriber.subscribe_from(&factory).unwrap_err();
    assert!(matches!(err, PubSubError::PublisherNotRegistered { .. }));
    assert!(err.to_string().contains("Heartbeat"));
    assert!(!subscriber.is_subscribed());
}

#[test]
fn concurrent_registration_admits_one_publisher() {
    let factory = PublisherFactory::new();
    let candidates: Vec<Arc<Publisher<TestEvent>>> = (0..8)
        .map(|i| Arc::new(Publisher::with_name(format!("candidate-{i}"))))
        .collect();

    let accepted = thread::scope(|scope| {
        let workers: Vec<_> = candidates
            .iter()
            .map(|candidate| {
                let factory = &factory;
                scope.spawn(move || factory.register(candidate))
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .filter(|registered| *registered)
            .count()
    });

    assert_eq!(accepted, 1);
    assert_eq!(factory.len(), 1);
}

#[test]
fn global_factory_is_shared() {
    let publisher = Arc::new(Publisher::<Heartbeat>::with_name("global"));
    assert!(PublisherFactory::global().register(&publisher));

    let seen = thread::spawn(|| {
        PublisherFactory::global()
            .resolve::<Heartbeat>()
            .map(|p| p.name().to_owned())
    })
    .join()
    .unwrap();
    assert_eq!(seen.as_deref(), Some("global"));

    publisher.dispose();
    assert!(!PublisherFactory::global().contains::<Heartbeat>());
}
