//! Open-Meteo adapter, shared by the GFS, ICON and ECMWF providers
//!
//! The three models answer with the same hourly schema and differ only in
//! the upstream `models=` parameter, so one normalization serves all of them.
//! A missing dew point is passed through as `None`; projectors synthesize it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::UavcastError;
use crate::models::{HourlySample, HourlySeries, ProviderId, SunTimes, WindReading};

/// Hourly fields requested from Open-Meteo
pub const HOURLY_FIELDS: [&str; 16] = [
    "temperature_2m",
    "relativehumidity_2m",
    "dewpoint_2m",
    "precipitation",
    "weathercode",
    "cloudcover",
    "visibility",
    "windspeed_10m",
    "windspeed_80m",
    "windspeed_120m",
    "windspeed_180m",
    "winddirection_10m",
    "winddirection_80m",
    "winddirection_120m",
    "winddirection_180m",
    "windgusts_10m",
];

/// Daily fields requested from Open-Meteo
pub const DAILY_FIELDS: [&str; 2] = ["sunrise", "sunset"];

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

type Column<T> = Option<Vec<Option<T>>>;

/// Forecast response from the Open-Meteo API
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    hourly: Option<HourlyData>,
    daily: Option<DailyData>,
    /// Set together with `error: true` on rejected requests
    reason: Option<String>,
}

/// Hourly weather data from Open-Meteo
#[derive(Debug, Deserialize)]
struct HourlyData {
    time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    temperature: Column<f64>,
    #[serde(rename = "relativehumidity_2m", alias = "relative_humidity_2m")]
    humidity: Column<f64>,
    #[serde(rename = "dewpoint_2m", alias = "dew_point_2m")]
    dew_point: Column<f64>,
    precipitation: Column<f64>,
    #[serde(rename = "weathercode", alias = "weather_code")]
    weather_code: Column<i32>,
    #[serde(rename = "cloudcover", alias = "cloud_cover")]
    cloud_cover: Column<f64>,
    visibility: Column<f64>,
    #[serde(rename = "windspeed_10m", alias = "wind_speed_10m")]
    wind_speed_10m: Column<f64>,
    #[serde(rename = "windspeed_80m", alias = "wind_speed_80m")]
    wind_speed_80m: Column<f64>,
    #[serde(rename = "windspeed_120m", alias = "wind_speed_120m")]
    wind_speed_120m: Column<f64>,
    #[serde(rename = "windspeed_180m", alias = "wind_speed_180m")]
    wind_speed_180m: Column<f64>,
    #[serde(rename = "winddirection_10m", alias = "wind_direction_10m")]
    wind_direction_10m: Column<f64>,
    #[serde(rename = "winddirection_80m", alias = "wind_direction_80m")]
    wind_direction_80m: Column<f64>,
    #[serde(rename = "winddirection_120m", alias = "wind_direction_120m")]
    wind_direction_120m: Column<f64>,
    #[serde(rename = "winddirection_180m", alias = "wind_direction_180m")]
    wind_direction_180m: Column<f64>,
    #[serde(rename = "windgusts_10m", alias = "wind_gusts_10m")]
    wind_gusts_10m: Column<f64>,
}

/// Daily data from Open-Meteo
#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<String>,
    sunrise: Option<Vec<Option<String>>>,
    sunset: Option<Vec<Option<String>>>,
}

/// Checks that every column lines up with the time axis
struct Columns {
    provider: ProviderId,
    len: usize,
}

impl Columns {
    fn required<T: Copy>(&self, name: &str, column: Column<T>) -> crate::Result<Vec<Option<T>>> {
        let values = column.ok_or_else(|| {
            UavcastError::normalization(self.provider, format!("missing hourly field `{name}`"))
        })?;
        self.aligned(name, values)
    }

    fn optional<T: Copy>(&self, name: &str, column: Column<T>) -> crate::Result<Option<Vec<Option<T>>>> {
        column.map(|values| self.aligned(name, values)).transpose()
    }

    fn aligned<T>(&self, name: &str, values: Vec<Option<T>>) -> crate::Result<Vec<Option<T>>> {
        if values.len() == self.len {
            Ok(values)
        } else {
            Err(UavcastError::normalization(
                self.provider,
                format!(
                    "hourly field `{name}` has {} values for {} timestamps",
                    values.len(),
                    self.len
                ),
            ))
        }
    }
}

fn at<T: Copy>(column: &Option<Vec<Option<T>>>, i: usize) -> Option<T> {
    column.as_ref().and_then(|values| values.get(i).copied().flatten())
}

/// Nulls in required columns surface as NaN
fn or_nan(values: &[Option<f64>], i: usize) -> f64 {
    values.get(i).copied().flatten().unwrap_or(f64::NAN)
}

fn wind_at(speed: &Option<Vec<Option<f64>>>, direction: &Option<Vec<Option<f64>>>, i: usize) -> Option<WindReading> {
    Some(WindReading::new(at(speed, i)?, at(direction, i)?))
}

/// Normalize an Open-Meteo forecast payload into an hourly series
pub fn normalize(provider: ProviderId, payload: &Value) -> crate::Result<HourlySeries> {
    let response = ForecastResponse::deserialize(payload)
        .map_err(|e| UavcastError::normalization(provider, format!("unexpected payload: {e}")))?;

    let hourly = response.hourly.ok_or_else(|| {
        let reason = response.reason.as_deref().unwrap_or("no hourly block");
        UavcastError::normalization(provider, reason.to_string())
    })?;

    let len = hourly.time.len();
    let columns = Columns { provider, len };

    let temperature = columns.required("temperature_2m", hourly.temperature)?;
    let humidity = columns.required("relativehumidity_2m", hourly.humidity)?;
    let speed_10m = columns.required("windspeed_10m", hourly.wind_speed_10m)?;
    let direction_10m = columns.required("winddirection_10m", hourly.wind_direction_10m)?;
    let gusts = columns.required("windgusts_10m", hourly.wind_gusts_10m)?;

    let dew_point = columns.optional("dewpoint_2m", hourly.dew_point)?;
    let precipitation = columns.optional("precipitation", hourly.precipitation)?;
    let weather_code = columns.optional("weathercode", hourly.weather_code)?;
    let cloud_cover = columns.optional("cloudcover", hourly.cloud_cover)?;
    let visibility = columns.optional("visibility", hourly.visibility)?;
    let speed_80m = columns.optional("windspeed_80m", hourly.wind_speed_80m)?;
    let speed_120m = columns.optional("windspeed_120m", hourly.wind_speed_120m)?;
    let speed_180m = columns.optional("windspeed_180m", hourly.wind_speed_180m)?;
    let direction_80m = columns.optional("winddirection_80m", hourly.wind_direction_80m)?;
    let direction_120m = columns.optional("winddirection_120m", hourly.wind_direction_120m)?;
    let direction_180m = columns.optional("winddirection_180m", hourly.wind_direction_180m)?;

    let mut samples = Vec::with_capacity(len);
    for (i, raw_time) in hourly.time.iter().enumerate() {
        let time = NaiveDateTime::parse_from_str(raw_time, TIME_FORMAT).map_err(|e| {
            UavcastError::normalization(provider, format!("bad timestamp '{raw_time}': {e}"))
        })?;

        samples.push(HourlySample {
            time,
            temperature_c: or_nan(&temperature, i),
            relative_humidity: or_nan(&humidity, i),
            dew_point_c: at(&dew_point, i),
            precipitation_mm: at(&precipitation, i),
            weather_code: at(&weather_code, i),
            cloud_cover: at(&cloud_cover, i),
            visibility_m: at(&visibility, i),
            wind_10m: WindReading::new(or_nan(&speed_10m, i), or_nan(&direction_10m, i)),
            wind_80m: wind_at(&speed_80m, &direction_80m, i),
            wind_120m: wind_at(&speed_120m, &direction_120m, i),
            wind_180m: wind_at(&speed_180m, &direction_180m, i),
            gust_10m_kmh: or_nan(&gusts, i),
        });
    }

    let sun = response.daily.map(sun_times).unwrap_or_default();

    debug!(
        "Normalized {} hourly samples and {} sun entries for {}",
        samples.len(),
        sun.len(),
        provider
    );

    Ok(HourlySeries {
        samples,
        sun,
        timezone: response.timezone,
    })
}

fn sun_times(daily: DailyData) -> Vec<SunTimes> {
    let sunrises = daily.sunrise.unwrap_or_default();
    let sunsets = daily.sunset.unwrap_or_default();

    daily
        .time
        .iter()
        .zip(sunrises.iter().zip(sunsets.iter()))
        .filter_map(|(date, (sunrise, sunset))| {
            Some(SunTimes {
                date: NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?,
                sunrise: NaiveDateTime::parse_from_str(sunrise.as_deref()?, TIME_FORMAT).ok()?,
                sunset: NaiveDateTime::parse_from_str(sunset.as_deref()?, TIME_FORMAT).ok()?,
            })
        })
        .collect()
}
