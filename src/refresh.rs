//! One refresh cycle: fetch every provider, normalize, publish
//!
//! All providers are fetched concurrently and normalization starts once every
//! fetch has settled. A provider that fails (transport, timeout or
//! normalization) is logged and left absent; the cycle only fails when no
//! provider produced data, and then the previous snapshot stays in place.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::UavcastError;
use crate::adapters;
use crate::fetch::PayloadFetcher;
use crate::models::{Location, ProviderId};
use crate::store::{AggregateStore, StoreHandle};

/// Why a provider is absent from a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub reason: String,
}

/// Outcome of a successful refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub cycle: u64,
    /// Providers present in the new store
    pub populated: Vec<ProviderId>,
    /// Providers that had nothing to offer, e.g. no credentials configured
    pub skipped: Vec<ProviderId>,
    pub failures: Vec<ProviderFailure>,
    /// `false` when a newer cycle or a location change overtook this one
    pub committed: bool,
}

/// Runs refresh cycles against a fetcher and publishes into the store
pub struct RefreshService {
    fetcher: Arc<dyn PayloadFetcher>,
    store: StoreHandle,
    timeout: Duration,
}

impl RefreshService {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PayloadFetcher>, store: StoreHandle, timeout: Duration) -> Self {
        Self {
            fetcher,
            store,
            timeout,
        }
    }

    #[must_use]
    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Run one cycle for `location`
    #[instrument(name = "refresh_cycle", skip(self, location), fields(location = %location.name))]
    pub async fn refresh(&self, location: &Location) -> crate::Result<RefreshReport> {
        let cycle = self.store.begin_cycle();
        info!(
            "Starting refresh cycle {} for {}",
            cycle,
            location.format_coordinates()
        );

        let fetches = ProviderId::ALL
            .into_iter()
            .map(|provider| self.fetch_one(provider, location));
        let settled = join_all(fetches).await;

        let mut store = AggregateStore::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();

        for (provider, fetched) in settled {
            let normalized = fetched.and_then(|payload| {
                payload
                    .map(|raw| adapters::normalize(provider, &raw))
                    .transpose()
            });
            match normalized {
                Ok(Some(data)) => store.insert(provider, data),
                Ok(None) => {
                    debug!("{} has no data this cycle", provider);
                    skipped.push(provider);
                }
                Err(e) => {
                    warn!("{} dropped from cycle {}: {}", provider, cycle, e);
                    failures.push(ProviderFailure {
                        provider,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if store.is_empty() {
            error!("Refresh cycle {} failed: no provider returned data", cycle);
            return Err(UavcastError::all_providers_failed(ProviderId::ALL.len()));
        }

        let populated: Vec<ProviderId> = store.populated().map(|(id, _)| id).collect();
        let committed = self.store.commit(cycle, location.clone(), store);
        info!(
            "Refresh cycle {} finished: {} providers loaded, {} failed, committed={}",
            cycle,
            populated.len(),
            failures.len(),
            committed
        );

        Ok(RefreshReport {
            cycle,
            populated,
            skipped,
            failures,
            committed,
        })
    }

    async fn fetch_one(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> (ProviderId, crate::Result<Option<Value>>) {
        let result = tokio::time::timeout(self.timeout, self.fetcher.fetch(provider, location))
            .await
            .unwrap_or_else(|_| {
                Err(UavcastError::transport(
                    provider,
                    format!("timed out after {}s", self.timeout.as_secs_f64()),
                ))
            });
        (provider, result)
    }
}
