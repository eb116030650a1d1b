//! Periodic auto-refresh
//!
//! The task only drives refresh cycles. Anything that draws subscribes to the
//! store and reacts to new snapshots on its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::models::Location;
use crate::refresh::RefreshService;

/// Handle to the background refresh loop; the loop stops when this is dropped
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Refresh now, then every `interval`, and right away whenever the location changes
    #[must_use]
    pub fn spawn(
        service: Arc<RefreshService>,
        mut location: watch::Receiver<Location>,
        interval: Duration,
    ) -> Self {
        info!("Auto-refresh every {} minutes", interval.as_secs() / 60);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Auto-refresh tick");
                    }
                    changed = location.changed() => {
                        if changed.is_err() {
                            debug!("Location source closed, stopping auto-refresh");
                            break;
                        }
                        debug!("Location changed, refreshing early");
                        ticker.reset();
                    }
                }

                let current = location.borrow_and_update().clone();
                if let Err(e) = service.refresh(&current).await {
                    warn!("Auto-refresh failed: {}", e);
                }
            }
        });

        Self { handle }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::PayloadFetcher;
    use crate::models::ProviderId;
    use crate::store::StoreHandle;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct WindyFetcher;

    #[async_trait]
    impl PayloadFetcher for WindyFetcher {
        async fn fetch(
            &self,
            provider: ProviderId,
            _location: &Location,
        ) -> crate::Result<Option<Value>> {
            Ok((provider == ProviderId::Windy)
                .then(|| json!({"wind_u-surface": [1.0], "wind_v-surface": [1.0]})))
        }
    }

    fn service(store: &StoreHandle) -> Arc<RefreshService> {
        Arc::new(RefreshService::new(
            Arc::new(WindyFetcher),
            store.clone(),
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_first_tick_refreshes_immediately() {
        let store = StoreHandle::new();
        let mut updates = store.subscribe();
        let (_tx, rx) = watch::channel(Location::new(50.45, 30.52, "Kyiv"));

        let task = RefreshTask::spawn(service(&store), rx, Duration::from_secs(3600));
        updates.changed().await.unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.location.name, "Kyiv");
        assert!(!task.is_finished());
    }

    #[tokio::test]
    async fn test_location_change_triggers_refresh() {
        let store = StoreHandle::new();
        let mut updates = store.subscribe();
        let (tx, rx) = watch::channel(Location::new(50.45, 30.52, "Kyiv"));

        let _task = RefreshTask::spawn(service(&store), rx, Duration::from_secs(3600));
        updates.changed().await.unwrap();

        tx.send_replace(Location::new(49.84, 24.02, "Lviv"));
        loop {
            updates.changed().await.unwrap();
            let latest = updates.borrow_and_update().clone();
            if latest.is_some_and(|s| s.location.name == "Lviv") {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_drop_aborts_loop() {
        let store = StoreHandle::new();
        let (_tx, rx) = watch::channel(Location::new(50.45, 30.52, "Kyiv"));
        let task = RefreshTask::spawn(service(&store), rx, Duration::from_secs(3600));
        let handle_store = store.clone();
        drop(task);

        // nothing commits after the task is gone
        tokio::task::yield_now().await;
        let cycle_before = handle_store.snapshot().map(|s| s.cycle);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle_store.snapshot().map(|s| s.cycle), cycle_before);
    }
}
