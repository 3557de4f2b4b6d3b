//! Fan-out with per-observer fault isolation.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{trace, warn};

use crate::observer::{Observer, ObserverRef};

/// Which callback a fan-out pass was invoking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStage {
    /// `on_next` during a publish.
    Next,
    /// `on_error` during an error broadcast.
    Error,
    /// `on_completed` during disposal.
    Completed,
}

impl std::fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Self::Next => "next",
            Self::Error => "error",
            Self::Completed => "completed",
        };
        f.write_str(stage)
    }
}

/// A single observer callback that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFault {
    /// Name reported by the faulting observer.
    pub subscriber: String,
    /// Callback that panicked.
    pub stage: DeliveryStage,
    /// Panic message, if it carried one.
    pub message: String,
}

impl std::fmt::Display for DeliveryFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subscriber '{}' panicked in on_{}: {}",
            self.subscriber, self.stage, self.message
        )
    }
}

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Observers whose callback returned normally.
    pub delivered: usize,
    /// Observers whose callback panicked.
    pub faults: Vec<DeliveryFault>,
}

impl Delivery {
    /// Total observers the pass reached, faulted or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.saturating_add(self.faults.len())
    }

    /// Whether every observer returned normally.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// Convert into a result, failing if any observer faulted.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubError::DeliveryFailed`](crate::PubSubError::DeliveryFailed)
    /// carrying every fault from the pass.
    pub fn into_result(self) -> crate::PubSubResult<usize> {
        if self.faults.is_empty() {
            Ok(self.delivered)
        } else {
            Err(crate::PubSubError::DeliveryFailed {
                faults: self.faults,
            })
        }
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Run `f`, converting a panic into its message.
pub(crate) fn isolate<F: FnOnce()>(f: F) -> Result<(), String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(&*payload))
}

/// Invoke `callback` on every observer in `observers`, in order.
///
/// No lock is held here; `observers` is always a snapshot.
pub(crate) fn fan_out<T, F>(
    publisher: &str,
    observers: &[ObserverRef<T>],
    stage: DeliveryStage,
    callback: F,
) -> Delivery
where
    F: Fn(&dyn Observer<T>),
{
    let mut delivery = Delivery::default();

    for observer in observers {
        let observer = observer.get();
        trace!(
            publisher,
            subscriber = %observer.name(),
            stage = %stage,
            "Notifying subscriber"
        );

        match isolate(|| callback(observer)) {
            Ok(()) => delivery.delivered = delivery.delivered.saturating_add(1),
            Err(message) => {
                warn!(
                    publisher,
                    subscriber = %observer.name(),
                    stage = %stage,
                    error = %message,
                    "Subscriber panicked"
                );
                delivery.faults.push(DeliveryFault {
                    subscriber: observer.name().to_owned(),
                    stage,
                    message,
                });
            },
        }
    }

    delivery
}
