//! Wind by altitude
//!
//! Series providers report the four fixed model heights at the current hour;
//! snapshot providers report their own level tables. Each level is read on
//! its own, with no interpolation in between.

use serde::Serialize;

use super::WindFigure;
use crate::clock::Clock;
use crate::models::{HourlyHeight, HourlySeries, InstantSample, ProviderData, ProviderId, Settings};
use crate::store::AggregateStore;
use crate::time_index::resolve_now_index;
use crate::units::WindUnit;

/// Wind at one height
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRow {
    pub height_m: u32,
    /// Provider's own name for the level
    pub source_level: String,
    pub wind: WindFigure,
    /// Surface gust in the display unit (series providers only)
    pub gust: Option<f64>,
    pub temperature_c: Option<f64>,
}

/// Rows in ascending height; levels a provider did not deliver are left out
#[must_use]
pub fn project_profile(
    store: &AggregateStore,
    provider: ProviderId,
    settings: &Settings,
    clock: &dyn Clock,
) -> Vec<ProfileRow> {
    let unit = settings.wind_unit;
    match store.get(provider) {
        Some(ProviderData::Hourly(series)) => series_profile(series, unit, clock),
        Some(ProviderData::Instant(sample)) => level_profile(sample, unit),
        None => Vec::new(),
    }
}

fn series_profile(series: &HourlySeries, unit: WindUnit, clock: &dyn Clock) -> Vec<ProfileRow> {
    let Some(sample) = series.get(resolve_now_index(series, clock)) else {
        return Vec::new();
    };
    let gust = unit.format_speed(sample.gust_10m_kmh);

    HourlyHeight::ALL
        .into_iter()
        .filter_map(|height| {
            let wind = sample.wind_at(height)?;
            Some(ProfileRow {
                height_m: height.meters(),
                source_level: format!("{}m", height.meters()),
                wind: WindFigure::new(wind, unit),
                gust: Some(gust),
                // models only give temperature at 2 m
                temperature_c: Some(sample.temperature_c),
            })
        })
        .collect()
}

fn level_profile(sample: &InstantSample, unit: WindUnit) -> Vec<ProfileRow> {
    let mut rows: Vec<ProfileRow> = sample
        .levels
        .iter()
        .map(|level| ProfileRow {
            height_m: level.height_m,
            source_level: level.source_level.clone(),
            wind: WindFigure::new(level.wind, unit),
            gust: None,
            temperature_c: level.temperature.map(|t| t.celsius()),
        })
        .collect();
    rows.sort_by_key(|row| row.height_m);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{meteomatics, windy};
    use crate::clock::FixedClock;
    use crate::time_index::fixtures::{series, start};
    use chrono::Duration;
    use serde_json::json;

    fn store_with(provider: ProviderId, data: ProviderData) -> AggregateStore {
        std::iter::once((provider, data)).collect()
    }

    fn clock() -> FixedClock {
        FixedClock(start() + Duration::hours(2))
    }

    #[test]
    fn test_windy_surface_row_from_components() {
        let payload = json!({
            "wind_u-surface": [5.0],
            "wind_v-surface": [0.0],
            "temp-surface": [293.15]
        });
        let sample = windy::normalize(&payload).unwrap();
        let store = store_with(ProviderId::Windy, ProviderData::Instant(sample));

        let rows = project_profile(&store, ProviderId::Windy, &Settings::default(), &clock());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].height_m, 10);
        assert_eq!(rows[0].wind.speed, 18.0);
        assert!((rows[0].temperature_c.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_windy_levels_ascending() {
        let mut payload = json!({});
        for (label, _) in windy::LEVELS {
            payload[format!("wind_u-{label}")] = json!([3.0]);
            payload[format!("wind_v-{label}")] = json!([4.0]);
        }
        let sample = windy::normalize(&payload).unwrap();
        let store = store_with(ProviderId::Windy, ProviderData::Instant(sample));

        let rows = project_profile(&store, ProviderId::Windy, &Settings::default(), &clock());
        let heights: Vec<u32> = rows.iter().map(|r| r.height_m).collect();
        assert_eq!(heights, vec![10, 500, 1000, 1500, 2000, 3000, 4200, 5500]);
        // |(3, 4)| = 5 m/s = 18 km/h at every level
        assert!(rows.iter().all(|r| r.wind.speed == 18.0));
    }

    #[test]
    fn test_series_profile_four_heights() {
        let store = store_with(ProviderId::Gfs, ProviderData::Hourly(series(24)));
        let rows = project_profile(&store, ProviderId::Gfs, &Settings::default(), &clock());

        let heights: Vec<u32> = rows.iter().map(|r| r.height_m).collect();
        assert_eq!(heights, vec![10, 80, 120, 180]);
        // fixture index 2: 10m=12, 80m=22, 120m=27, 180m=32 km/h
        let speeds: Vec<f64> = rows.iter().map(|r| r.wind.speed).collect();
        assert_eq!(speeds, vec![12.0, 22.0, 27.0, 32.0]);
        assert!(rows.iter().all(|r| r.gust == Some(22.0)));
    }

    #[test]
    fn test_series_profile_skips_missing_heights() {
        let mut hourly = series(24);
        hourly.samples[2].wind_120m = None;
        let store = store_with(ProviderId::Icon, ProviderData::Hourly(hourly));
        let rows = project_profile(&store, ProviderId::Icon, &Settings::default(), &clock());
        let heights: Vec<u32> = rows.iter().map(|r| r.height_m).collect();
        assert_eq!(heights, vec![10, 80, 180]);
    }

    #[test]
    fn test_meteomatics_levels() {
        let series = |parameter: &str, value: f64| {
            json!({
                "parameter": parameter,
                "coordinates": [{"lat": 0.0, "lon": 0.0, "dates": [{"date": "2026-10-18T10:00:00Z", "value": value}]}]
            })
        };
        let payload = json!({
            "status": "OK",
            "data": [
                series("wind_speed_10m:ms", 5.0),
                series("wind_dir_10m:d", 90.0),
                series("wind_speed_1000m:ms", 10.0),
                series("wind_dir_1000m:d", 270.0)
            ]
        });
        let sample = meteomatics::normalize(&payload).unwrap();
        let store = store_with(ProviderId::Meteomatics, ProviderData::Instant(sample));

        let rows = project_profile(&store, ProviderId::Meteomatics, &Settings::default(), &clock());
        let heights: Vec<u32> = rows.iter().map(|r| r.height_m).collect();
        assert_eq!(heights, vec![10, 1000]);
        assert_eq!(rows[1].wind.speed, 36.0);
        assert_eq!(rows[1].wind.label, "W");
    }

    #[test]
    fn test_absent_provider_has_no_rows() {
        let rows = project_profile(
            &AggregateStore::new(),
            ProviderId::Ecmwf,
            &Settings::default(),
            &clock(),
        );
        assert!(rows.is_empty());
    }
}
