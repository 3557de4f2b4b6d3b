//! One-shot completion signal raised when a publisher is disposed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::delivery::isolate;

/// Callback invoked when a publisher completes.
pub type CompletionListener = Arc<dyn Fn() + Send + Sync>;

/// Registration handle for a completion listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Default)]
struct SignalState {
    fired: bool,
    listeners: Vec<(ListenerId, CompletionListener)>,
}

/// A latch that fires its listeners exactly once.
///
/// A listener added after the signal has fired is invoked immediately on the
/// adding thread. Listeners always run without the internal lock held.
#[derive(Default)]
pub struct CompletionSignal {
    state: Mutex<SignalState>,
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CompletionSignal")
            .field("fired", &state.fired)
            .field("listener_count", &state.listeners.len())
            .finish()
    }
}

impl CompletionSignal {
    /// Create an unfired signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a listener.
    ///
    /// If the signal has already fired, `listener` runs before this returns.
    pub fn add_listener(&self, listener: CompletionListener) -> ListenerId {
        let id = ListenerId::new();
        let late = {
            let mut state = self.lock();
            if state.fired {
                Some(listener)
            } else {
                state.listeners.push((id, listener));
                None
            }
        };

        if let Some(listener) = late {
            debug!("Completion listener added after signal fired; invoking now");
            run_listener(&listener);
        }
        id
    }

    /// Remove a listener that has not fired yet.
    ///
    /// Returns `true` if the listener was found.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = {
            let mut state = self.lock();
            state
                .listeners
                .iter()
                .position(|(existing, _)| *existing == id)
                .map(|index| state.listeners.remove(index))
        };
        removed.is_some()
    }

    /// Fire the signal.
    ///
    /// Only the first call invokes listeners; it returns `true`. Later calls
    /// return `false` and do nothing.
    pub fn fire(&self) -> bool {
        let listeners = {
            let mut state = self.lock();
            if state.fired {
                return false;
            }
            state.fired = true;
            std::mem::take(&mut state.listeners)
        };

        debug!(listener_count = listeners.len(), "Firing completion signal");
        for (_, listener) in &listeners {
            run_listener(listener);
        }
        true
    }

    /// Whether [`fire`](Self::fire) has been called.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.lock().fired
    }

    /// Number of listeners still waiting for the signal.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

fn run_listener(listener: &CompletionListener) {
    if let Err(message) = isolate(|| listener()) {
        warn!(error = %message, "Completion listener panicked");
    }
}
