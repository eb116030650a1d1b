//! Normalized forecast shapes produced by the provider adapters
//!
//! Every provider payload is reduced to one of two shapes, decided once at
//! the adapter boundary:
//! - [`HourlySeries`]: aligned per-hour samples (GFS, ICON, ECMWF)
//! - [`InstantSample`]: a single "now" snapshot over altitude levels (Windy, Meteomatics)
//!
//! Wind speeds are always stored in km/h.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wind speed and meteorological "from" direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    /// Speed in km/h
    pub speed_kmh: f64,
    /// Direction the wind blows from, degrees clockwise from north
    pub direction_deg: f64,
}

impl WindReading {
    #[must_use]
    pub fn new(speed_kmh: f64, direction_deg: f64) -> Self {
        Self {
            speed_kmh,
            direction_deg,
        }
    }
}

/// Fixed wind heights available in an hourly series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourlyHeight {
    M10,
    M80,
    M120,
    M180,
}

impl HourlyHeight {
    /// Ascending order
    pub const ALL: [HourlyHeight; 4] = [
        HourlyHeight::M10,
        HourlyHeight::M80,
        HourlyHeight::M120,
        HourlyHeight::M180,
    ];

    #[must_use]
    pub fn meters(self) -> u32 {
        match self {
            HourlyHeight::M10 => 10,
            HourlyHeight::M80 => 80,
            HourlyHeight::M120 => 120,
            HourlyHeight::M180 => 180,
        }
    }
}

/// One hour of a numerical-model forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    /// Local wall-clock time at the forecast location
    pub time: NaiveDateTime,
    /// Air temperature at 2 m in °C
    pub temperature_c: f64,
    /// Relative humidity at 2 m in %
    pub relative_humidity: f64,
    /// Dew point in °C when the provider supplies it
    pub dew_point_c: Option<f64>,
    /// Precipitation in mm/h
    pub precipitation_mm: Option<f64>,
    /// WMO weather code
    pub weather_code: Option<i32>,
    /// Cloud cover in %
    pub cloud_cover: Option<f64>,
    /// Visibility in meters
    pub visibility_m: Option<f64>,
    pub wind_10m: WindReading,
    pub wind_80m: Option<WindReading>,
    pub wind_120m: Option<WindReading>,
    pub wind_180m: Option<WindReading>,
    /// Gust speed at 10 m in km/h
    pub gust_10m_kmh: f64,
}

impl HourlySample {
    #[must_use]
    pub fn wind_at(&self, height: HourlyHeight) -> Option<WindReading> {
        match height {
            HourlyHeight::M10 => Some(self.wind_10m),
            HourlyHeight::M80 => self.wind_80m,
            HourlyHeight::M120 => self.wind_120m,
            HourlyHeight::M180 => self.wind_180m,
        }
    }
}

/// Sunrise and sunset of one forecast day, local time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub date: NaiveDate,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

/// Aligned hourly samples for one provider
///
/// Index 0 is the first forecast hour, not necessarily the current hour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    pub samples: Vec<HourlySample>,
    pub sun: Vec<SunTimes>,
    /// IANA zone the provider resolved for the location
    pub timezone: Option<String>,
}

impl HourlySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HourlySample> {
        self.samples.get(index)
    }

    /// At most the first `count` samples, in order
    #[must_use]
    pub fn first_hours(&self, count: usize) -> &[HourlySample] {
        &self.samples[..self.samples.len().min(count)]
    }

    /// Sunrise/sunset for the given local date
    #[must_use]
    pub fn sun_on(&self, date: NaiveDate) -> Option<&SunTimes> {
        self.sun.iter().find(|s| s.date == date)
    }
}

/// Temperature in the unit the provider delivered it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Temperature {
    Celsius(f64),
    Kelvin(f64),
}

impl Temperature {
    /// Value in °C, converting Kelvin on read
    #[must_use]
    pub fn celsius(self) -> f64 {
        match self {
            Temperature::Celsius(c) => c,
            Temperature::Kelvin(k) => crate::units::kelvin_to_celsius(k),
        }
    }
}

/// Wind (and optionally temperature) at one nominal height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeLevel {
    /// Nominal height above ground in meters
    pub height_m: u32,
    /// Provider's own level name, e.g. `850h` or `500m`
    pub source_level: String,
    pub wind: WindReading,
    pub temperature: Option<Temperature>,
}

/// Near-surface values that accompany an instant snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceConditions {
    pub temperature_c: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub gust_kmh: Option<f64>,
    pub weather_symbol: Option<i32>,
}

/// Single-instant, multi-altitude snapshot for one provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstantSample {
    /// Instant the values are valid for, when the payload states it
    pub valid_at: Option<DateTime<Utc>>,
    /// Levels in ascending height
    pub levels: Vec<AltitudeLevel>,
    pub surface: SurfaceConditions,
}

impl InstantSample {
    #[must_use]
    pub fn level_at(&self, height_m: u32) -> Option<&AltitudeLevel> {
        self.levels.iter().find(|l| l.height_m == height_m)
    }

    /// Lowest available level
    #[must_use]
    pub fn lowest_level(&self) -> Option<&AltitudeLevel> {
        self.levels.iter().min_by_key(|l| l.height_m)
    }

    /// Surface temperature, falling back to the lowest level's reading
    #[must_use]
    pub fn surface_temperature_c(&self) -> Option<f64> {
        self.surface.temperature_c.or_else(|| {
            self.lowest_level()
                .and_then(|l| l.temperature)
                .map(Temperature::celsius)
        })
    }
}

/// Normalized payload of one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ProviderData {
    Hourly(HourlySeries),
    Instant(InstantSample),
}

impl ProviderData {
    #[must_use]
    pub fn as_hourly(&self) -> Option<&HourlySeries> {
        match self {
            ProviderData::Hourly(series) => Some(series),
            ProviderData::Instant(_) => None,
        }
    }

    #[must_use]
    pub fn as_instant(&self) -> Option<&InstantSample> {
        match self {
            ProviderData::Instant(sample) => Some(sample),
            ProviderData::Hourly(_) => None,
        }
    }
}
