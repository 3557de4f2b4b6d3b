//! Prelude module - commonly used types for convenient import.
//!
//! Use `use herald_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use herald_events::prelude::*;
//!
//! let publisher = Publisher::<u32>::new();
//! let subscriber = Arc::new(Subscriber::<u32>::new());
//! subscriber.subscribe(&publisher);
//!
//! assert!(publisher.publish(&42).is_clean());
//! ```

// Publishing
pub use crate::{Delivery, DeliveryFault, DeliveryStage, Publisher};

// Subscribing
pub use crate::{ObservedError, Observer, Subscriber, SubscriptionHandle};

// Type-keyed lookup
pub use crate::PublisherFactory;

// Errors
pub use crate::{PubSubError, PubSubResult};
