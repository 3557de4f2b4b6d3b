//! Pub/sub error types.

use thiserror::Error;

use crate::delivery::DeliveryFault;

/// Errors raised by publishers, subscribers and the factory.
#[derive(Debug, Error)]
pub enum PubSubError {
    /// No publisher is registered for the requested data type.
    #[error("no publisher registered for type {type_name}")]
    PublisherNotRegistered {
        /// Name of the requested data type.
        type_name: &'static str,
    },

    /// One or more observers panicked during a fan-out pass.
    #[error("delivery failed for {} subscriber(s)", .faults.len())]
    DeliveryFailed {
        /// Every fault from the pass, in delivery order.
        faults: Vec<DeliveryFault>,
    },
}

/// Result type for pub/sub operations.
pub type PubSubResult<T> = Result<T, PubSubError>;
