//! The churn workload.
//!
//! One publisher per payload model is registered with a factory and gets a
//! fixed number of subscriber slots. A publisher thread publishes random
//! values of both models while an updater thread disposes a random slot's
//! subscriber and fills the slot with a fresh one. When the run ends both
//! publishers are disposed, which also drops them from the factory.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use herald_config::HarnessSection;
use herald_events::{Delivery, Publisher, PublisherFactory, Subscriber};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::models::{Notice, Quote};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    /// Values published across both models.
    pub(crate) publishes: u64,
    /// Subscribers disposed and replaced by the updater thread.
    pub(crate) replacements: u64,
    /// Successful `on_next` calls reported by the publishers.
    pub(crate) deliveries: u64,
    /// Values seen by subscriber handlers.
    pub(crate) handled: u64,
    /// Observer panics isolated during publishing and completion.
    pub(crate) faults: u64,
    /// Wall-clock length of the run.
    pub(crate) elapsed: Duration,
}

/// One payload model: its publisher, subscriber slots and counters.
struct Channel<'f, T> {
    label: &'static str,
    factory: &'f PublisherFactory,
    publisher: Arc<Publisher<T>>,
    slots: Mutex<Vec<Arc<Subscriber<T>>>>,
    print_deliveries: bool,
    handled: Arc<AtomicU64>,
    delivered: AtomicU64,
    faults: AtomicU64,
}

impl<'f, T> Channel<'f, T>
where
    T: Display + Send + Sync + 'static,
{
    /// Register a publisher for `T` and fill `slot_count` subscriber slots.
    fn open(
        label: &'static str,
        factory: &'f PublisherFactory,
        slot_count: usize,
        print_deliveries: bool,
    ) -> Result<Self> {
        let publisher = Arc::new(Publisher::<T>::with_name(label));
        if !factory.register(&publisher) {
            bail!(
                "a publisher for {} is already registered",
                std::any::type_name::<T>()
            );
        }

        let channel = Self {
            label,
            factory,
            publisher,
            slots: Mutex::new(Vec::with_capacity(slot_count)),
            print_deliveries,
            handled: Arc::new(AtomicU64::new(0)),
            delivered: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        };

        let mut subscribers = Vec::with_capacity(slot_count);
        for index in 0..slot_count {
            subscribers.push(channel.make_subscriber(index)?);
        }
        *channel.lock_slots() = subscribers;

        debug!(channel = label, slots = slot_count, "Channel opened");
        Ok(channel)
    }

    fn lock_slots(&self) -> MutexGuard<'_, Vec<Arc<Subscriber<T>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a subscriber for slot `index`, bound and subscribed through
    /// the factory.
    fn make_subscriber(&self, index: usize) -> Result<Arc<Subscriber<T>>> {
        let subscriber = Arc::new(Subscriber::<T>::with_name(format!(
            "{}-{index}",
            self.label
        )));

        let handled = Arc::clone(&self.handled);
        let print = self.print_deliveries;
        let name = subscriber.name().to_owned();
        subscriber.bind_on_receive(move |value: &T| {
            handled.fetch_add(1, Ordering::Relaxed);
            if print {
                info!(subscriber = %name, %value, "Received");
            }
        });

        let subscribed = subscriber
            .subscribe_from(self.factory)
            .with_context(|| format!("failed to subscribe slot {index} of {}", self.label))?;
        if !subscribed {
            warn!(channel = self.label, slot = index, "Publisher refused subscriber");
        }

        Ok(subscriber)
    }

    fn publish(&self, value: &T) {
        let delivery = self.publisher.publish(value);
        self.record(&delivery);
    }

    fn record(&self, delivery: &Delivery) {
        self.delivered
            .fetch_add(widen(delivery.delivered), Ordering::Relaxed);
        self.faults
            .fetch_add(widen(delivery.faults.len()), Ordering::Relaxed);
    }

    /// Dispose a random slot's subscriber and put a fresh one in its place.
    fn replace_random<R: Rng>(&self, rng: &mut R) -> Result<bool> {
        let slot_count = self.lock_slots().len();
        if slot_count == 0 {
            return Ok(false);
        }
        let index = rng.gen_range(0..slot_count);

        let fresh = self.make_subscriber(index)?;
        let retired = self
            .lock_slots()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, fresh));

        // Disposed outside the slot lock.
        match retired {
            Some(old) => {
                old.dispose();
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Dispose the publisher and check that the factory let go of it.
    fn close(&self) -> bool {
        let delivery = self.publisher.dispose();
        self.faults
            .fetch_add(widen(delivery.faults.len()), Ordering::Relaxed);

        let deregistered = !self.factory.contains::<T>();
        let still_subscribed = self
            .lock_slots()
            .iter()
            .filter(|subscriber| subscriber.is_subscribed())
            .count();
        debug!(
            channel = self.label,
            completed = delivery.attempted(),
            deregistered,
            still_subscribed,
            "Channel closed"
        );
        deregistered && still_subscribed == 0
    }

    fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

impl<T> Drop for Channel<'_, T> {
    fn drop(&mut self) {
        self.publisher.dispose();
    }
}

fn widen(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

fn pause<R: Rng>(rng: &mut R, max_pause_ms: u64) {
    if max_pause_ms > 0 {
        thread::sleep(Duration::from_millis(rng.gen_range(0..=max_pause_ms)));
    }
}

fn publish_loop(
    quotes: &Channel<'_, Quote>,
    notices: &Channel<'_, Notice>,
    max_pause_ms: u64,
    stop: &AtomicBool,
) -> u64 {
    let mut rng = rand::thread_rng();
    let mut published: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        quotes.publish(&Quote::numbered(rng.r#gen()));
        notices.publish(&Notice::numbered(rng.r#gen()));
        published = published.saturating_add(2);
        pause(&mut rng, max_pause_ms);
    }

    published
}

fn churn_loop(
    quotes: &Channel<'_, Quote>,
    notices: &Channel<'_, Notice>,
    max_pause_ms: u64,
    stop: &AtomicBool,
) -> Result<u64> {
    let mut rng = rand::thread_rng();
    let mut replaced: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        let swapped = if rng.gen_bool(0.5) {
            quotes.replace_random(&mut rng)?
        } else {
            notices.replace_random(&mut rng)?
        };
        if swapped {
            replaced = replaced.saturating_add(1);
        }
        pause(&mut rng, max_pause_ms);
    }

    Ok(replaced)
}

/// Run the workload described by `settings` against `factory`.
///
/// # Errors
///
/// Fails if a publisher for either model is already registered in
/// `factory`, a worker thread cannot be spawned or panics, or the publishers
/// are still registered after they were disposed.
pub(crate) fn run(settings: &HarnessSection, factory: &PublisherFactory) -> Result<RunSummary> {
    let started = Instant::now();
    let slot_count = settings.subscribers_per_model;

    let quotes = Channel::<Quote>::open("quotes", factory, slot_count, settings.print_deliveries)?;
    let notices =
        Channel::<Notice>::open("notices", factory, slot_count, settings.print_deliveries)?;
    info!(
        subscribers_per_model = slot_count,
        duration_secs = settings.duration_secs,
        churn = settings.churn_enabled,
        registered = ?factory.registered_types(),
        "Starting run"
    );

    let stop = AtomicBool::new(false);
    let max_pause_ms = settings.max_pause_ms;
    let duration = Duration::from_secs(settings.duration_secs);

    let (publishes, replacements) = thread::scope(|scope| -> Result<(u64, u64)> {
        let publisher = thread::Builder::new()
            .name("publisher".to_owned())
            .spawn_scoped(scope, || publish_loop(&quotes, &notices, max_pause_ms, &stop))
            .context("failed to spawn publisher thread")?;

        let updater = if settings.churn_enabled {
            let spawned = thread::Builder::new()
                .name("updater".to_owned())
                .spawn_scoped(scope, || churn_loop(&quotes, &notices, max_pause_ms, &stop));
            match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    stop.store(true, Ordering::Release);
                    return Err(e).context("failed to spawn updater thread");
                },
            }
        } else {
            None
        };

        thread::sleep(duration);
        stop.store(true, Ordering::Release);

        let publishes = publisher
            .join()
            .map_err(|_| anyhow!("publisher thread panicked"))?;
        let replacements = match updater {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("updater thread panicked"))??,
            None => 0,
        };
        Ok((publishes, replacements))
    })?;

    let quotes_closed = quotes.close();
    let notices_closed = notices.close();
    if !(quotes_closed && notices_closed) {
        bail!(
            "publishers were not released after disposal (still registered: {:?})",
            factory.registered_types()
        );
    }

    Ok(RunSummary {
        publishes,
        replacements,
        deliveries: quotes.delivered().saturating_add(notices.delivered()),
        handled: quotes.handled().saturating_add(notices.handled()),
        faults: quotes.faults().saturating_add(notices.faults()),
        elapsed: started.elapsed(),
    })
}
