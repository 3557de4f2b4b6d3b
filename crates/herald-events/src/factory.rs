//! Type-keyed publisher registry.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use crate::publisher::Publisher;

type Detach = Box<dyn Fn() + Send + Sync>;

struct Registration {
    publisher: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    /// Distinguishes this registration from later ones for the same type.
    token: Uuid,
    /// Removes this registration's completion listener from the publisher.
    detach: Option<Detach>,
}

/// Maps each payload type to its single live [`Publisher`].
///
/// A registered publisher is removed automatically when it completes, which
/// frees the slot for a new publisher of the same type. Clones share the
/// same underlying map.
///
/// Prefer creating a factory with [`new`](Self::new) and passing it to the
/// components that need it; [`global`](Self::global) exists for code that
/// cannot be handed one.
#[derive(Clone, Default)]
pub struct PublisherFactory {
    entries: Arc<DashMap<TypeId, Registration>>,
}

impl std::fmt::Debug for PublisherFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherFactory")
            .field("registered_types", &self.registered_types())
            .finish()
    }
}

static GLOBAL: OnceLock<PublisherFactory> = OnceLock::new();

impl PublisherFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide factory, created on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    /// Register `publisher` as the publisher for `T`.
    ///
    /// Returns `false` without replacing anything if a publisher for `T` is
    /// already registered (including `publisher` itself), or if `publisher`
    /// has already completed.
    pub fn register<T: 'static>(&self, publisher: &Arc<Publisher<T>>) -> bool {
        let type_name = std::any::type_name::<T>();
        if publisher.is_completed() {
            debug!(payload_type = type_name, "Refusing to register completed publisher");
            return false;
        }

        let key = TypeId::of::<T>();
        let token = Uuid::new_v4();
        match self.entries.entry(key) {
            Entry::Occupied(_) => {
                debug!(payload_type = type_name, "Publisher already registered");
                return false;
            },
            Entry::Vacant(slot) => {
                slot.insert(Registration {
                    publisher: Arc::clone(publisher) as Arc<dyn Any + Send + Sync>,
                    type_name,
                    token,
                    detach: None,
                });
            },
        }

        // Shard guard is released; the listener may run right away if the
        // publisher completed in the meantime.
        let entries = Arc::downgrade(&self.entries);
        let listener = publisher.on_complete(move || {
            let Some(entries) = entries.upgrade() else {
                return;
            };
            if entries
                .remove_if(&key, |_, registration| registration.token == token)
                .is_some()
            {
                debug!(payload_type = type_name, "Publisher deregistered on completion");
            }
        });

        let weak_publisher = Arc::downgrade(publisher);
        let detach: Detach = Box::new(move || {
            if let Some(publisher) = weak_publisher.upgrade() {
                publisher.remove_complete_listener(listener);
            }
        });
        if let Some(mut registration) = self.entries.get_mut(&key)
            && registration.token == token
        {
            registration.detach = Some(detach);
        }

        debug!(payload_type = type_name, "Publisher registered");
        true
    }

    /// The publisher registered for `T`, if any.
    #[must_use]
    pub fn resolve<T: 'static>(&self) -> Option<Arc<Publisher<T>>> {
        let publisher = self
            .entries
            .get(&TypeId::of::<T>())
            .map(|registration| Arc::clone(&registration.publisher))?;
        publisher.downcast::<Publisher<T>>().ok()
    }

    /// Remove the publisher for `T` without completing it.
    ///
    /// Returns `true` if a publisher was registered.
    pub fn unregister<T: 'static>(&self) -> bool {
        let Some((_, registration)) = self.entries.remove(&TypeId::of::<T>()) else {
            return false;
        };
        if let Some(detach) = &registration.detach {
            detach();
        }
        debug!(payload_type = registration.type_name, "Publisher unregistered");
        true
    }

    /// Whether a publisher for `T` is registered.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered publishers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no publisher is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the registered payload types, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.iter().map(|entry| entry.type_name).collect();
        names.sort_unstable();
        names
    }
}
