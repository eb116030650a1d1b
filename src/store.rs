//! Aggregate forecast store
//!
//! One [`AggregateStore`] holds the normalized data of a single refresh
//! cycle, keyed by provider. The store is never edited in place: each cycle
//! builds a fresh one and publishes it through [`StoreHandle::commit`], which
//! swaps the whole snapshot at once.
//!
//! Overlapping cycles are resolved with a monotonic cycle counter: a cycle
//! only commits when it is newer than both the committed snapshot and the
//! last invalidation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::models::{HourlySeries, InstantSample, Location, ProviderData, ProviderId};

/// Normalized data of one refresh cycle; missing providers are absent entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStore {
    entries: BTreeMap<ProviderId, ProviderData>,
}

impl AggregateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: ProviderId, data: ProviderData) {
        self.entries.insert(provider, data);
    }

    #[must_use]
    pub fn get(&self, provider: ProviderId) -> Option<&ProviderData> {
        self.entries.get(&provider)
    }

    #[must_use]
    pub fn hourly(&self, provider: ProviderId) -> Option<&HourlySeries> {
        self.get(provider).and_then(ProviderData::as_hourly)
    }

    #[must_use]
    pub fn instant(&self, provider: ProviderId) -> Option<&InstantSample> {
        self.get(provider).and_then(ProviderData::as_instant)
    }

    #[must_use]
    pub fn contains(&self, provider: ProviderId) -> bool {
        self.entries.contains_key(&provider)
    }

    /// Providers with data, in [`ProviderId`] order
    pub fn populated(&self) -> impl Iterator<Item = (ProviderId, &ProviderData)> {
        self.entries.iter().map(|(id, data)| (*id, data))
    }

    #[must_use]
    pub fn populated_count(&self) -> usize {
        self.entries.len()
    }

    /// Providers without data this cycle
    #[must_use]
    pub fn absent(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| !self.entries.contains_key(id))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ProviderId, ProviderData)> for AggregateStore {
    fn from_iter<I: IntoIterator<Item = (ProviderId, ProviderData)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A committed store together with the cycle and location it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSnapshot {
    pub cycle: u64,
    pub location: Location,
    pub fetched_at: DateTime<Utc>,
    pub store: AggregateStore,
}

/// Receiving side of the store; `None` until the first commit after an invalidation
pub type SnapshotReceiver = watch::Receiver<Option<Arc<ForecastSnapshot>>>;

#[derive(Debug)]
struct Shared {
    sender: watch::Sender<Option<Arc<ForecastSnapshot>>>,
    /// Last cycle id handed out
    issued: AtomicU64,
    /// Cycles at or below this id may no longer commit
    floor: AtomicU64,
}

/// Cloneable handle to the one shared store
///
/// Only the refresh operation writes through it; projectors read snapshots.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    shared: Arc<Shared>,
}

impl Default for StoreHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreHandle {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                sender,
                issued: AtomicU64::new(0),
                floor: AtomicU64::new(0),
            }),
        }
    }

    /// Reserve the id for a new refresh cycle
    pub fn begin_cycle(&self) -> u64 {
        self.shared.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish the result of `cycle`.
    ///
    /// Returns `false` and leaves the current snapshot in place when a newer
    /// cycle has already committed or the store was invalidated after `cycle`
    /// began.
    pub fn commit(&self, cycle: u64, location: Location, store: AggregateStore) -> bool {
        let floor = &self.shared.floor;
        let committed = self.shared.sender.send_if_modified(|current| {
            let newest = current.as_ref().map_or(0, |s| s.cycle);
            if cycle <= floor.load(Ordering::SeqCst) || cycle <= newest {
                return false;
            }
            *current = Some(Arc::new(ForecastSnapshot {
                cycle,
                location,
                fetched_at: Utc::now(),
                store,
            }));
            true
        });

        if !committed {
            debug!("Discarding stale refresh cycle {}", cycle);
        }
        committed
    }

    /// Clear the store and fence off every cycle begun so far
    pub fn invalidate(&self) {
        let barrier = self.begin_cycle();
        let floor = &self.shared.floor;
        self.shared.sender.send_modify(|current| {
            floor.store(barrier, Ordering::SeqCst);
            *current = None;
        });
        debug!("Store invalidated at cycle {}", barrier);
    }

    /// Latest committed snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ForecastSnapshot>> {
        self.shared.sender.borrow().clone()
    }

    /// Receiver notified on every commit and invalidation
    #[must_use]
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.shared.sender.subscribe()
    }
}
