//! Current-conditions tiles for one provider

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::{WeatherCondition, WindFigure, visibility_km};
use crate::clock::Clock;
use crate::derived::{cloud_base_height, dew_point, dew_point_or_synthesized};
use crate::models::{HourlySeries, InstantSample, ProviderData, ProviderId, Settings, SunTimes};
use crate::store::AggregateStore;
use crate::time_index::resolve_now_index;
use crate::units::WindUnit;

/// Current conditions of one provider
///
/// Fields a provider does not deliver are `None`. Values that are present but
/// not computable (e.g. dew point at 0 % humidity) are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionsSummary {
    pub provider: ProviderId,
    pub unit: WindUnit,
    /// Local hour the values belong to, for series providers
    pub time: Option<NaiveDateTime>,
    /// Instant the values are valid for, for snapshot providers
    pub valid_at: Option<DateTime<Utc>>,
    pub weather: Option<WeatherCondition>,
    pub wind: WindFigure,
    /// Gust speed in the display unit, rounded
    pub gust: Option<f64>,
    pub temperature_c: Option<f64>,
    pub dew_point_c: Option<f64>,
    pub humidity: Option<f64>,
    pub cloud_cover: Option<f64>,
    /// Estimated cloud base in meters
    pub cloud_base_m: Option<f64>,
    pub visibility_km: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub sun: Option<SunTimes>,
}

impl ConditionsSummary {
    /// Temperature minus dew point
    #[must_use]
    pub fn spread_c(&self) -> Option<f64> {
        Some(self.temperature_c? - self.dew_point_c?)
    }
}

/// Project the "now" conditions of `provider`; `None` when it has no data
#[must_use]
pub fn project_summary(
    store: &AggregateStore,
    provider: ProviderId,
    settings: &Settings,
    clock: &dyn Clock,
) -> Option<ConditionsSummary> {
    let unit = settings.wind_unit;
    match store.get(provider)? {
        ProviderData::Hourly(series) => from_series(provider, series, unit, clock),
        ProviderData::Instant(sample) => from_instant(provider, sample, unit),
    }
}

fn from_series(
    provider: ProviderId,
    series: &HourlySeries,
    unit: WindUnit,
    clock: &dyn Clock,
) -> Option<ConditionsSummary> {
    let now = resolve_now_index(series, clock);
    let sample = series.get(now)?;

    let temperature = sample.temperature_c;
    let dew = dew_point_or_synthesized(sample.dew_point_c, temperature, sample.relative_humidity);

    Some(ConditionsSummary {
        provider,
        unit,
        time: Some(sample.time),
        valid_at: None,
        weather: sample.weather_code.map(WeatherCondition::from_code),
        wind: WindFigure::new(sample.wind_10m, unit),
        gust: Some(unit.format_speed(sample.gust_10m_kmh)),
        temperature_c: Some(temperature),
        dew_point_c: Some(dew),
        humidity: Some(sample.relative_humidity),
        cloud_cover: sample.cloud_cover,
        cloud_base_m: Some(cloud_base_height(temperature, dew)),
        visibility_km: sample.visibility_m.map(visibility_km),
        precipitation_mm: sample.precipitation_mm,
        sun: series.sun_on(clock.now().date()).cloned(),
    })
}

fn from_instant(
    provider: ProviderId,
    sample: &InstantSample,
    unit: WindUnit,
) -> Option<ConditionsSummary> {
    let ground = sample.lowest_level()?;
    let temperature = sample.surface_temperature_c();
    let humidity = sample.surface.relative_humidity;

    let dew = match (temperature, humidity) {
        (Some(t), Some(rh)) => Some(dew_point(t, rh)),
        _ => None,
    };
    let cloud_base = match (temperature, dew) {
        (Some(t), Some(td)) => Some(cloud_base_height(t, td)),
        _ => None,
    };

    Some(ConditionsSummary {
        provider,
        unit,
        time: None,
        valid_at: sample.valid_at,
        weather: None,
        wind: WindFigure::new(ground.wind, unit),
        gust: sample.surface.gust_kmh.map(|g| unit.format_speed(g)),
        temperature_c: temperature,
        dew_point_c: dew,
        humidity,
        cloud_cover: None,
        cloud_base_m: cloud_base,
        visibility_km: None,
        precipitation_mm: None,
        sun: None,
    })
}
