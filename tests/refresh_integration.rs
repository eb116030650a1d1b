//! Integration tests for refresh cycles against an in-memory fetcher

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use uavcast::projectors::{project_profile, project_timeline};
use uavcast::{
    FixedClock, Location, PayloadFetcher, ProviderId, RefreshService, Settings, StoreHandle,
    UavcastError,
};

fn open_meteo_payload(hours: usize) -> Value {
    let start = NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let times: Vec<String> = (0..hours)
        .map(|h| {
            (start + chrono::Duration::hours(h as i64))
                .format("%Y-%m-%dT%H:%M")
                .to_string()
        })
        .collect();
    let column = |value: f64| json!(vec![value; hours]);

    json!({
        "timezone": "Europe/Kyiv",
        "hourly": {
            "time": times,
            "temperature_2m": column(12.0),
            "relativehumidity_2m": column(70.0),
            "precipitation": column(0.0),
            "weathercode": vec![2; hours],
            "cloudcover": column(40.0),
            "visibility": column(24000.0),
            "windspeed_10m": column(14.0),
            "windspeed_80m": column(22.0),
            "windspeed_120m": column(26.0),
            "windspeed_180m": column(30.0),
            "winddirection_10m": column(225.0),
            "winddirection_80m": column(230.0),
            "winddirection_120m": column(235.0),
            "winddirection_180m": column(240.0),
            "windgusts_10m": column(28.0)
        },
        "daily": {
            "time": ["2026-10-18", "2026-10-19"],
            "sunrise": ["2026-10-18T07:21", "2026-10-19T07:23"],
            "sunset": ["2026-10-18T17:52", "2026-10-19T17:50"]
        }
    })
}

fn windy_payload() -> Value {
    json!({
        "ts": [1_792_310_400_000_i64],
        "wind_u-surface": [5.0],
        "wind_v-surface": [0.0],
        "temp-surface": [285.15],
        "wind_u-850h": [8.0],
        "wind_v-850h": [6.0],
        "temp-850h": [275.15]
    })
}

fn meteomatics_payload() -> Value {
    let series = |parameter: &str, value: f64| {
        json!({
            "parameter": parameter,
            "coordinates": [{
                "lat": 50.45,
                "lon": 30.52,
                "dates": [{"date": "2026-10-18T10:00:00Z", "value": value}]
            }]
        })
    };
    json!({
        "version": "3.0",
        "status": "OK",
        "data": [
            series("wind_speed_10m:ms", 4.0),
            series("wind_dir_10m:d", 180.0),
            series("wind_speed_500m:ms", 9.0),
            series("wind_dir_500m:d", 200.0),
            series("t_2m:C", 14.0),
            series("relative_humidity_2m:p", 65.0)
        ]
    })
}

fn payload_for(provider: ProviderId) -> Value {
    match provider {
        ProviderId::Gfs | ProviderId::Icon | ProviderId::Ecmwf => open_meteo_payload(48),
        ProviderId::Windy => windy_payload(),
        ProviderId::Meteomatics => meteomatics_payload(),
    }
}

/// Fetcher whose failing providers can be changed between cycles
#[derive(Default)]
struct ScriptedFetcher {
    failing: Mutex<HashSet<ProviderId>>,
    malformed: Mutex<HashSet<ProviderId>>,
}

impl ScriptedFetcher {
    fn failing(providers: &[ProviderId]) -> Self {
        let fetcher = Self::default();
        fetcher.set_failing(providers);
        fetcher
    }

    fn set_failing(&self, providers: &[ProviderId]) {
        *self.failing.lock().unwrap() = providers.iter().copied().collect();
    }
}

#[async_trait]
impl PayloadFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> uavcast::Result<Option<Value>> {
        if location.name == "slow" {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        if self.failing.lock().unwrap().contains(&provider) {
            return Err(UavcastError::transport(provider, "connection reset"));
        }
        if self.malformed.lock().unwrap().contains(&provider) {
            return Ok(Some(json!({"unexpected": true})));
        }
        Ok(Some(payload_for(provider)))
    }
}

fn service(fetcher: Arc<ScriptedFetcher>) -> RefreshService {
    RefreshService::new(fetcher, StoreHandle::new(), Duration::from_secs(2))
}

fn kyiv() -> Location {
    Location::new(50.45, 30.52, "Kyiv, Ukraine")
}

#[tokio::test]
async fn test_all_providers_loaded() {
    let service = service(Arc::new(ScriptedFetcher::default()));
    let report = service.refresh(&kyiv()).await.unwrap();

    assert!(report.committed);
    assert_eq!(report.populated, ProviderId::ALL.to_vec());
    assert!(report.failures.is_empty());

    let snapshot = service.store().snapshot().unwrap();
    assert_eq!(snapshot.store.populated_count(), 5);
    assert!(snapshot.store.hourly(ProviderId::Ecmwf).is_some());
    assert!(snapshot.store.instant(ProviderId::Meteomatics).is_some());
}

#[tokio::test]
async fn test_two_transport_failures_leave_three_entries() {
    let fetcher = Arc::new(ScriptedFetcher::failing(&[ProviderId::Icon, ProviderId::Windy]));
    let service = service(fetcher);
    let report = service.refresh(&kyiv()).await.unwrap();

    let snapshot = service.store().snapshot().unwrap();
    assert_eq!(snapshot.store.populated_count(), 3);
    assert_eq!(
        snapshot.store.absent(),
        vec![ProviderId::Icon, ProviderId::Windy]
    );
    assert!(snapshot.store.get(ProviderId::Icon).is_none());
    assert!(snapshot.store.get(ProviderId::Windy).is_none());
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn test_malformed_payload_is_isolated() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    fetcher
        .malformed
        .lock()
        .unwrap()
        .insert(ProviderId::Ecmwf);
    let service = service(fetcher);

    let report = service.refresh(&kyiv()).await.unwrap();
    assert_eq!(report.populated.len(), 4);
    assert_eq!(report.failures[0].provider, ProviderId::Ecmwf);
    assert!(report.failures[0].reason.contains("Normalization"));
}

#[tokio::test]
async fn test_total_failure_keeps_previous_snapshot() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let service = service(fetcher.clone());

    let first = service.refresh(&kyiv()).await.unwrap();
    let before = service.store().snapshot().unwrap();

    fetcher.set_failing(&ProviderId::ALL);
    let err = service.refresh(&kyiv()).await.unwrap_err();
    assert!(matches!(err, UavcastError::AllProvidersFailed { attempted: 5 }));

    let after = service.store().snapshot().unwrap();
    assert_eq!(after.cycle, first.cycle);
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_latest_cycle_wins() {
    let service = service(Arc::new(ScriptedFetcher::default()));
    let slow = Location::new(10.0, 10.0, "slow");
    let fast = Location::new(20.0, 20.0, "fast");

    // the slow cycle starts first but settles last
    let (slow_report, fast_report) = tokio::join!(service.refresh(&slow), service.refresh(&fast));
    let slow_report = slow_report.unwrap();
    let fast_report = fast_report.unwrap();

    assert!(slow_report.cycle < fast_report.cycle);
    assert!(fast_report.committed);
    assert!(!slow_report.committed);
    assert_eq!(service.store().snapshot().unwrap().location.name, "fast");
}

#[tokio::test]
async fn test_projections_over_refreshed_store() {
    let service = service(Arc::new(ScriptedFetcher::default()));
    service.refresh(&kyiv()).await.unwrap();
    let snapshot = service.store().snapshot().unwrap();

    let clock = FixedClock(
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap(),
    );
    let settings = Settings::default();

    let timeline = project_timeline(&snapshot.store, ProviderId::Gfs, &settings, &clock);
    assert_eq!(timeline.len(), 24);
    assert!(timeline[9].is_current);

    let windy_profile = project_profile(&snapshot.store, ProviderId::Windy, &settings, &clock);
    assert_eq!(windy_profile[0].height_m, 10);
    assert_eq!(windy_profile[0].wind.speed, 18.0);
    assert_eq!(windy_profile[1].height_m, 1500);
    // |(8, 6)| = 10 m/s
    assert_eq!(windy_profile[1].wind.speed, 36.0);

    assert!(project_timeline(&snapshot.store, ProviderId::Windy, &settings, &clock).is_empty());
}
