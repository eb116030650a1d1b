//! Windy point-forecast adapter
//!
//! The payload is a flat object keyed by `"<field>-<level>"`, e.g.
//! `wind_u-surface` or `temp-850h`, each holding a sequence whose first
//! element is the current value. Pressure levels are mapped onto nominal
//! heights with a fixed table; temperatures stay in Kelvin until read.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::UavcastError;
use crate::models::{AltitudeLevel, InstantSample, ProviderId, SurfaceConditions, Temperature};
use crate::units::vector_to_polar;

/// Pressure-level labels and their nominal heights in meters.
///
/// A hardcoded approximation, not a standard-atmosphere computation.
pub const LEVELS: [(&str, u32); 8] = [
    ("surface", 10),
    ("950h", 500),
    ("900h", 1000),
    ("850h", 1500),
    ("800h", 2000),
    ("700h", 3000),
    ("600h", 4200),
    ("500h", 5500),
];

/// Parameters requested from Windy
pub const PARAMETERS: [&str; 2] = ["wind", "temp"];

/// Forecast model requested from Windy
pub const MODEL: &str = "gfs";

fn first_value(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key)?.as_array()?.first()?.as_f64()
}

/// Normalize a Windy payload into a single-instant snapshot
pub fn normalize(payload: &Value) -> crate::Result<InstantSample> {
    let provider = ProviderId::Windy;
    let fields = payload
        .as_object()
        .ok_or_else(|| UavcastError::normalization(provider, "payload is not an object"))?;

    let mut levels = Vec::with_capacity(LEVELS.len());
    for (label, height_m) in LEVELS {
        let u = first_value(fields, &format!("wind_u-{label}"));
        let v = first_value(fields, &format!("wind_v-{label}"));
        let (Some(u), Some(v)) = (u, v) else {
            debug!("Windy level {} has no wind components, skipping", label);
            continue;
        };

        levels.push(AltitudeLevel {
            height_m,
            source_level: label.to_string(),
            wind: vector_to_polar(u, v),
            temperature: first_value(fields, &format!("temp-{label}")).map(Temperature::Kelvin),
        });
    }

    if !levels.iter().any(|l| l.source_level == "surface") {
        return Err(UavcastError::normalization(
            provider,
            "missing `wind_u-surface`/`wind_v-surface`",
        ));
    }

    let valid_at = fields
        .get("ts")
        .and_then(Value::as_array)
        .and_then(|ts| ts.first())
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    Ok(InstantSample {
        valid_at,
        levels,
        surface: SurfaceConditions::default(),
    })
}
