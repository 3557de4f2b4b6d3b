//! Thread-safe set backing a publisher's subscriber list.

use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexSet;

/// A mutex-guarded set with point-in-time snapshots.
///
/// Every operation serializes through one lock. Nothing user-supplied runs
/// while that lock is held: snapshots are copied out before iteration, and
/// items leaving the set are moved out of the critical section before they
/// are dropped, so an item whose `Drop` re-enters the registry cannot
/// deadlock.
///
/// Iteration order is insertion order.
pub struct ConcurrentRegistry<T> {
    items: Mutex<IndexSet<T>>,
}

impl<T> std::fmt::Debug for ConcurrentRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .items
            .lock()
            .map(|items| items.len())
            .unwrap_or_default();
        f.debug_struct("ConcurrentRegistry")
            .field("item_count", &count)
            .finish()
    }
}

impl<T> Default for ConcurrentRegistry<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(IndexSet::new()),
        }
    }
}

impl<T> ConcurrentRegistry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a panic happened on another thread while the
    // set was borrowed; every mutation here is a single `IndexSet` call, so
    // the set itself is never left half-updated.
    fn lock(&self) -> MutexGuard<'_, IndexSet<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of items currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every item out, leaving the registry empty.
    ///
    /// The returned items are dropped by the caller, outside the lock.
    #[must_use = "drained items are dropped immediately if unused"]
    pub fn drain(&self) -> Vec<T> {
        let items = std::mem::take(&mut *self.lock());
        items.into_iter().collect()
    }

    /// Remove every item.
    pub fn clear(&self) {
        drop(self.drain());
    }
}

impl<T: Eq + Hash> ConcurrentRegistry<T> {
    /// Insert `item` if it is not already present.
    ///
    /// Returns `true` if the item was inserted. A duplicate insert leaves the
    /// registry unchanged.
    pub fn add(&self, item: T) -> bool {
        let rejected = {
            let mut items = self.lock();
            if items.contains(&item) {
                Some(item)
            } else {
                items.insert(item);
                None
            }
        };
        rejected.is_none()
    }

    /// Remove `item` if present, returning whether a removal happened.
    pub fn remove(&self, item: &T) -> bool {
        let removed = self.lock().shift_take(item);
        removed.is_some()
    }

    /// Whether `item` is currently present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.lock().contains(item)
    }
}

impl<T: Clone> ConcurrentRegistry<T> {
    /// Copy the current contents for lock-free iteration.
    ///
    /// Later mutations of the registry do not affect the returned vector.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }
}
