//! Application context
//!
//! Location, settings, the forecast store and the clock live here as separate
//! parts. Projectors get them by reference; only [`AppContext::refresh`] and
//! the auto-refresh task write to the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::UavcastConfig;
use crate::fetch::{HttpFetcher, PayloadFetcher};
use crate::models::{Location, Settings};
use crate::refresh::{RefreshReport, RefreshService};
use crate::scheduler::RefreshTask;
use crate::store::{ForecastSnapshot, SnapshotReceiver, StoreHandle};
use crate::units::WindUnit;

pub struct AppContext {
    location: watch::Sender<Location>,
    settings: Settings,
    store: StoreHandle,
    clock: Arc<dyn Clock>,
    refresher: Arc<RefreshService>,
}

impl AppContext {
    pub fn new(
        location: Location,
        settings: Settings,
        fetcher: Arc<dyn PayloadFetcher>,
        clock: Arc<dyn Clock>,
        provider_timeout: Duration,
    ) -> crate::Result<Self> {
        location.validate()?;
        let store = StoreHandle::new();
        let refresher = Arc::new(RefreshService::new(fetcher, store.clone(), provider_timeout));
        let (location, _) = watch::channel(location);

        Ok(Self {
            location,
            settings,
            store,
            clock,
            refresher,
        })
    }

    /// Context wired to the real provider APIs
    pub fn from_config(config: &UavcastConfig) -> crate::Result<Self> {
        let fetcher = HttpFetcher::new(config.providers.clone())?;
        let clock = SystemClock::from_name(config.defaults.timezone.as_deref())?;
        Self::new(
            config.default_location(),
            config.settings(),
            Arc::new(fetcher),
            Arc::new(clock),
            config.providers.timeout(),
        )
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    /// Switch to a new location; the old forecast is dropped immediately
    pub fn set_location(&self, location: Location) -> crate::Result<()> {
        location.validate()?;
        info!("Location set to {} ({})", location.name, location.format_coordinates());
        self.store.invalidate();
        self.location.send_replace(location);
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_wind_unit(&mut self, unit: WindUnit) {
        self.settings.wind_unit = unit;
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ForecastSnapshot>> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.store.subscribe()
    }

    /// Run one refresh cycle for the current location
    pub async fn refresh(&self) -> crate::Result<RefreshReport> {
        let location = self.location();
        self.refresher.refresh(&location).await
    }

    /// Start periodic refreshing, unless auto-refresh is turned off
    #[must_use]
    pub fn start_auto_refresh(&self, interval: Duration) -> Option<RefreshTask> {
        self.settings.auto_refresh.then(|| {
            RefreshTask::spawn(
                Arc::clone(&self.refresher),
                self.location.subscribe(),
                interval,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::ProviderId;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    struct WindyOnly;

    #[async_trait]
    impl PayloadFetcher for WindyOnly {
        async fn fetch(
            &self,
            provider: ProviderId,
            _location: &Location,
        ) -> crate::Result<Option<Value>> {
            Ok((provider == ProviderId::Windy)
                .then(|| json!({"wind_u-surface": [0.0], "wind_v-surface": [-10.0]})))
        }
    }

    fn context(settings: Settings) -> AppContext {
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 18)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap(),
        );
        AppContext::new(
            Location::new(50.45, 30.52, "Kyiv"),
            settings,
            Arc::new(WindyOnly),
            Arc::new(clock),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_refresh_populates_store() {
        let app = context(Settings::default());
        let report = app.refresh().await.unwrap();
        assert_eq!(report.populated, vec![ProviderId::Windy]);

        let snapshot = app.snapshot().unwrap();
        let windy = snapshot.store.instant(ProviderId::Windy).unwrap();
        assert!((windy.levels[0].wind.speed_kmh - 36.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_location_change_clears_store() {
        let app = context(Settings::default());
        app.refresh().await.unwrap();
        assert!(app.snapshot().is_some());

        app.set_location(Location::new(49.84, 24.02, "Lviv")).unwrap();
        assert!(app.snapshot().is_none());
        assert_eq!(app.location().name, "Lviv");

        app.refresh().await.unwrap();
        assert_eq!(app.snapshot().unwrap().location.name, "Lviv");
    }

    #[test]
    fn test_invalid_location_rejected() {
        let app = context(Settings::default());
        assert!(app.set_location(Location::new(95.0, 0.0, "Nowhere")).is_err());
        assert_eq!(app.location().name, "Kyiv");
    }

    #[tokio::test]
    async fn test_auto_refresh_respects_setting() {
        let disabled = Settings {
            auto_refresh: false,
            ..Settings::default()
        };
        assert!(context(disabled).start_auto_refresh(Duration::from_secs(60)).is_none());

        let app = context(Settings::default());
        let mut updates = app.subscribe();
        let _task = app.start_auto_refresh(Duration::from_secs(3600)).unwrap();
        updates.changed().await.unwrap();
        assert!(app.snapshot().is_some());
    }

    #[test]
    fn test_unit_change_is_local_to_settings() {
        let mut app = context(Settings::default());
        app.set_wind_unit(WindUnit::Kt);
        assert_eq!(app.settings().wind_unit, WindUnit::Kt);
    }
}
