//! Herald Events - typed in-process publish/subscribe.
//!
//! This crate provides:
//! - [`Publisher`]: broadcasts values of one type to a dynamic set of observers
//! - [`Subscriber`]: an observer built from bound closures, attached to at
//!   most one publisher at a time
//! - [`SubscriptionHandle`]: a scoped token that unsubscribes when released
//!   or dropped
//! - [`PublisherFactory`]: a type-keyed registry holding the single live
//!   publisher for each payload type
//!
//! # Architecture
//!
//! Each publisher owns a [`ConcurrentRegistry`] of observers. Publishing
//! takes a snapshot of that registry and calls every observer in insertion
//! order on the calling thread. No lock is held while observer code runs, so
//! callbacks may subscribe, unsubscribe or publish again.
//!
//! A panicking observer is isolated: the panic is logged with `tracing` and
//! recorded in the returned [`Delivery`], and the other observers are still
//! called.
//!
//! Disposing a publisher is terminal. Every observer receives
//! `on_completed`, then the publisher's completion signal fires. A
//! [`PublisherFactory`] listens for that signal and drops the publisher
//! from its map.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use herald_events::prelude::*;
//!
//! #[derive(Debug)]
//! struct Quote {
//!     name: String,
//! }
//!
//! let factory = PublisherFactory::new();
//! let publisher = Arc::new(Publisher::<Quote>::new());
//! assert!(factory.register(&publisher));
//!
//! let subscriber = Arc::new(Subscriber::<Quote>::new());
//! subscriber.bind_on_receive(|quote| println!("quote from {}", quote.name));
//! subscriber.subscribe_from(&factory).unwrap();
//!
//! let delivery = publisher.publish(&Quote { name: "ada".into() });
//! assert_eq!(delivery.delivered, 1);
//!
//! publisher.dispose();
//! assert!(factory.resolve::<Quote>().is_none());
//! assert!(!subscriber.is_subscribed());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod delivery;
mod error;
mod factory;
mod handle;
mod observer;
mod publisher;
mod registry;
mod signal;
mod subscriber;

pub use delivery::{Delivery, DeliveryFault, DeliveryStage};
pub use error::{PubSubError, PubSubResult};
pub use factory::PublisherFactory;
pub use handle::SubscriptionHandle;
pub use observer::{ObservedError, Observer};
pub use publisher::Publisher;
pub use registry::ConcurrentRegistry;
pub use signal::{CompletionListener, CompletionSignal, ListenerId};
pub use subscriber::{CompletedHandler, ErrorHandler, NextHandler, Subscriber};
