//! Meteomatics adapter
//!
//! Parameters are addressed as `"<quantity>_<level>:<unit>"`. Each series holds
//! one coordinate set with one or more dated values; the first date is taken
//! as "now". Speeds arrive in m/s and are stored in km/h.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::UavcastError;
use crate::models::{AltitudeLevel, InstantSample, ProviderId, SurfaceConditions, WindReading};
use crate::units::ms_to_kmh;

/// Wind heights requested from Meteomatics, in meters
pub const LEVEL_HEIGHTS: [u32; 5] = [10, 100, 500, 1000, 2000];

/// Marker Meteomatics uses for values it cannot compute
const INVALID_VALUE: f64 = -999.0;

const TEMPERATURE: &str = "t_2m:C";
const HUMIDITY: &str = "relative_humidity_2m:p";
const GUSTS: &str = "wind_gusts_10m:ms";
const WEATHER_SYMBOL: &str = "weather_symbol_1h:idx";

fn speed_parameter(height_m: u32) -> String {
    format!("wind_speed_{height_m}m:ms")
}

fn direction_parameter(height_m: u32) -> String {
    format!("wind_dir_{height_m}m:d")
}

/// Full parameter list for a Meteomatics request, in request order
#[must_use]
pub fn parameters() -> Vec<String> {
    let mut params: Vec<String> = LEVEL_HEIGHTS.iter().map(|&h| speed_parameter(h)).collect();
    params.extend(LEVEL_HEIGHTS.iter().map(|&h| direction_parameter(h)));
    params.extend([GUSTS, TEMPERATURE, HUMIDITY, WEATHER_SYMBOL].map(String::from));
    params
}

#[derive(Debug, Deserialize)]
struct Response {
    status: Option<String>,
    data: Vec<ParameterSeries>,
}

#[derive(Debug, Deserialize)]
struct ParameterSeries {
    parameter: String,
    coordinates: Vec<CoordinateSet>,
}

#[derive(Debug, Deserialize)]
struct CoordinateSet {
    dates: Vec<DatedValue>,
}

#[derive(Debug, Deserialize)]
struct DatedValue {
    date: DateTime<Utc>,
    value: Option<f64>,
}

impl Response {
    fn first_date(&self, parameter: &str) -> Option<&DatedValue> {
        self.data
            .iter()
            .find(|series| series.parameter == parameter)?
            .coordinates
            .first()?
            .dates
            .first()
    }

    fn value(&self, parameter: &str) -> Option<f64> {
        self.first_date(parameter)?
            .value
            .filter(|v| *v != INVALID_VALUE)
    }
}

/// Normalize a Meteomatics payload into a single-instant snapshot
pub fn normalize(payload: &Value) -> crate::Result<InstantSample> {
    let provider = ProviderId::Meteomatics;
    let response = Response::deserialize(payload)
        .map_err(|e| UavcastError::normalization(provider, format!("unexpected payload: {e}")))?;

    match response.status.as_deref() {
        Some(status) if status != "OK" => {
            return Err(UavcastError::normalization(
                provider,
                format!("response status '{status}'"),
            ));
        }
        _ => {}
    }

    let levels: Vec<AltitudeLevel> = LEVEL_HEIGHTS
        .iter()
        .filter_map(|&height_m| {
            let speed = response.value(&speed_parameter(height_m));
            let direction = response.value(&direction_parameter(height_m));
            match (speed, direction) {
                (Some(speed_ms), Some(direction_deg)) => Some(AltitudeLevel {
                    height_m,
                    source_level: format!("{height_m}m"),
                    wind: WindReading::new(ms_to_kmh(speed_ms), direction_deg),
                    temperature: None,
                }),
                _ => {
                    debug!("Meteomatics has no wind at {}m, skipping", height_m);
                    None
                }
            }
        })
        .collect();

    if levels.is_empty() {
        return Err(UavcastError::normalization(provider, "no wind levels in payload"));
    }

    let surface = SurfaceConditions {
        temperature_c: response.value(TEMPERATURE),
        relative_humidity: response.value(HUMIDITY),
        gust_kmh: response.value(GUSTS).map(ms_to_kmh),
        weather_symbol: response.value(WEATHER_SYMBOL).map(|v| v.round() as i32),
    };

    let valid_at = response
        .data
        .first()
        .and_then(|series| series.coordinates.first())
        .and_then(|coords| coords.dates.first())
        .map(|d| d.date);

    Ok(InstantSample {
        valid_at,
        levels,
        surface,
    })
}
