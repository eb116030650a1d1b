//! Hourly timeline and detail table

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use super::{WeatherCondition, WindFigure, visibility_km};
use crate::clock::Clock;
use crate::derived::{cloud_base_height, dew_point_or_synthesized};
use crate::models::{HourlySample, ProviderId, Settings};
use crate::store::AggregateStore;
use crate::units::WindUnit;

/// Rows shown in the timeline and table views
pub const TIMELINE_HOURS: usize = 24;

/// One hour of the timeline/table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRow {
    pub time: NaiveDateTime,
    /// Row hour equals the clock's hour
    pub is_current: bool,
    pub weather: Option<WeatherCondition>,
    pub wind: WindFigure,
    pub gust: f64,
    pub temperature_c: f64,
    pub dew_point_c: f64,
    pub humidity: f64,
    pub cloud_cover: Option<f64>,
    pub cloud_base_m: f64,
    pub visibility_km: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

impl HourRow {
    fn from_sample(sample: &HourlySample, unit: WindUnit, current_hour: u32) -> Self {
        let dew = dew_point_or_synthesized(
            sample.dew_point_c,
            sample.temperature_c,
            sample.relative_humidity,
        );
        Self {
            time: sample.time,
            is_current: sample.time.hour() == current_hour,
            weather: sample.weather_code.map(WeatherCondition::from_code),
            wind: WindFigure::new(sample.wind_10m, unit),
            gust: unit.format_speed(sample.gust_10m_kmh),
            temperature_c: sample.temperature_c,
            dew_point_c: dew,
            humidity: sample.relative_humidity,
            cloud_cover: sample.cloud_cover,
            cloud_base_m: cloud_base_height(sample.temperature_c, dew),
            visibility_km: sample.visibility_m.map(visibility_km),
            precipitation_mm: sample.precipitation_mm,
        }
    }
}

/// First [`TIMELINE_HOURS`] samples of a series provider, in order.
///
/// Shorter series are returned whole, never padded. Snapshot providers and
/// absent providers yield no rows.
#[must_use]
pub fn project_timeline(
    store: &AggregateStore,
    provider: ProviderId,
    settings: &Settings,
    clock: &dyn Clock,
) -> Vec<HourRow> {
    let Some(series) = store.hourly(provider) else {
        return Vec::new();
    };
    let current_hour = clock.now().hour();

    series
        .first_hours(TIMELINE_HOURS)
        .iter()
        .map(|sample| HourRow::from_sample(sample, settings.wind_unit, current_hour))
        .collect()
}
