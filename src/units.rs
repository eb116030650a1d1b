//! Wind-speed units, compass lookups and wind vector decomposition
//!
//! All stored speeds are km/h. Conversion happens only when a projector
//! prepares values for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UavcastError;
use crate::models::WindReading;

const KMH_PER_MS: f64 = 3.6;
const MPH_PER_KMH: f64 = 0.621371;
const KT_PER_KMH: f64 = 0.539957;

/// Arrow glyphs, sector 0 first. Not derived from [`DIRECTION_LABELS`].
const WIND_ARROWS: [&str; 8] = ["↓", "↙", "←", "↖", "↑", "↗", "→", "↘"];

/// Compass labels, sector 0 first. Not derived from [`WIND_ARROWS`].
const DIRECTION_LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Wind speed display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindUnit {
    #[default]
    #[serde(rename = "kmh")]
    Kmh,
    #[serde(rename = "ms")]
    Ms,
    #[serde(rename = "mph")]
    Mph,
    #[serde(rename = "kt")]
    Kt,
}

impl WindUnit {
    pub const ALL: [WindUnit; 4] = [WindUnit::Kmh, WindUnit::Ms, WindUnit::Mph, WindUnit::Kt];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            WindUnit::Kmh => "kmh",
            WindUnit::Ms => "ms",
            WindUnit::Mph => "mph",
            WindUnit::Kt => "kt",
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WindUnit::Kmh => "km/h",
            WindUnit::Ms => "m/s",
            WindUnit::Mph => "mph",
            WindUnit::Kt => "kt",
        }
    }

    /// Convert a km/h speed into this unit
    #[must_use]
    pub fn convert(self, speed_kmh: f64) -> f64 {
        match self {
            WindUnit::Kmh => speed_kmh,
            WindUnit::Ms => speed_kmh / KMH_PER_MS,
            WindUnit::Mph => speed_kmh * MPH_PER_KMH,
            WindUnit::Kt => speed_kmh * KT_PER_KMH,
        }
    }

    /// Convert a speed in this unit back to km/h
    #[must_use]
    pub fn to_kmh(self, value: f64) -> f64 {
        match self {
            WindUnit::Kmh => value,
            WindUnit::Ms => value * KMH_PER_MS,
            WindUnit::Mph => value / MPH_PER_KMH,
            WindUnit::Kt => value / KT_PER_KMH,
        }
    }

    /// Converted speed rounded half away from zero.
    ///
    /// Returned as `f64` so NaN inputs stay NaN for the display layer.
    #[must_use]
    pub fn format_speed(self, speed_kmh: f64) -> f64 {
        self.convert(speed_kmh).round()
    }
}

impl fmt::Display for WindUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindUnit {
    type Err = UavcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kmh" | "km/h" => Ok(WindUnit::Kmh),
            "ms" | "m/s" => Ok(WindUnit::Ms),
            "mph" => Ok(WindUnit::Mph),
            "kt" | "kts" | "knots" => Ok(WindUnit::Kt),
            other => Err(UavcastError::validation(format!(
                "unknown wind unit '{other}', expected kmh, ms, mph or kt"
            ))),
        }
    }
}

/// `round(degrees / 45) mod 8`
fn sector(degrees: f64) -> usize {
    // NaN casts to 0
    ((degrees / 45.0).round() as i64).rem_euclid(8) as usize
}

/// Arrow glyph for a wind direction
#[must_use]
pub fn wind_arrow(degrees: f64) -> &'static str {
    WIND_ARROWS[sector(degrees)]
}

/// Eight-point compass label for a wind direction
#[must_use]
pub fn wind_dir_label(degrees: f64) -> &'static str {
    DIRECTION_LABELS[sector(degrees)]
}

/// Decompose eastward/northward components (m/s) into km/h speed and "from" direction
#[must_use]
pub fn vector_to_polar(u: f64, v: f64) -> WindReading {
    let speed_kmh = (u * u + v * v).sqrt() * KMH_PER_MS;
    let direction_deg = ((-u).atan2(-v).to_degrees() + 360.0) % 360.0;
    WindReading::new(speed_kmh, direction_deg)
}

#[must_use]
pub fn ms_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * KMH_PER_MS
}

#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(WindUnit::Kmh, 36.0, 36.0)]
    #[case(WindUnit::Ms, 36.0, 10.0)]
    #[case(WindUnit::Mph, 100.0, 62.1371)]
    #[case(WindUnit::Kt, 100.0, 53.9957)]
    fn test_convert(#[case] unit: WindUnit, #[case] kmh: f64, #[case] expected: f64) {
        assert!((unit.convert(kmh) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_convert_round_trip() {
        for unit in WindUnit::ALL {
            for kmh in [0.0, 0.5, 7.3, 36.0, 118.9, 250.0] {
                let back = unit.to_kmh(unit.convert(kmh));
                assert!((back - kmh).abs() < 1e-9, "{unit:?} {kmh} -> {back}");
            }
        }
    }

    #[test]
    fn test_format_speed_rounds() {
        assert_eq!(WindUnit::Kmh.format_speed(12.5), 13.0);
        assert_eq!(WindUnit::Kmh.format_speed(12.49), 12.0);
        assert_eq!(WindUnit::Ms.format_speed(18.0), 5.0);
        assert!(WindUnit::Kt.format_speed(f64::NAN).is_nan());
    }

    #[rstest]
    #[case("kmh", WindUnit::Kmh)]
    #[case("m/s", WindUnit::Ms)]
    #[case("MPH", WindUnit::Mph)]
    #[case("knots", WindUnit::Kt)]
    fn test_parse_unit(#[case] input: &str, #[case] expected: WindUnit) {
        assert_eq!(input.parse::<WindUnit>().unwrap(), expected);
    }

    #[test]
    fn test_labels() {
        assert_eq!(WindUnit::Kmh.label(), "km/h");
        assert_eq!(WindUnit::Ms.label(), "m/s");
        assert_eq!(WindUnit::Kt.to_string(), "kt");
    }

    #[rstest]
    #[case(0.0, "↓", "N")]
    #[case(45.0, "↙", "NE")]
    #[case(90.0, "←", "E")]
    #[case(135.0, "↖", "SE")]
    #[case(180.0, "↑", "S")]
    #[case(225.0, "↗", "SW")]
    #[case(270.0, "→", "W")]
    #[case(315.0, "↘", "NW")]
    #[case(22.4, "↓", "N")]
    #[case(22.5, "↙", "NE")]
    #[case(350.0, "↓", "N")]
    fn test_direction_tables(#[case] deg: f64, #[case] arrow: &str, #[case] label: &str) {
        assert_eq!(wind_arrow(deg), arrow);
        assert_eq!(wind_dir_label(deg), label);
    }

    #[test]
    fn test_arrow_wraps_at_360() {
        assert_eq!(wind_arrow(0.0), wind_arrow(360.0));
        assert_eq!(wind_dir_label(0.0), wind_dir_label(360.0));
    }

    #[test]
    fn test_vector_to_polar_north_wind() {
        let wind = vector_to_polar(0.0, -10.0);
        assert!((wind.speed_kmh - 36.0).abs() < 1e-9);
        assert!(wind.direction_deg.abs() < 1e-9);
    }

    #[rstest]
    #[case(5.0, 0.0, 18.0, 270.0)]
    #[case(-5.0, 0.0, 18.0, 90.0)]
    #[case(0.0, 10.0, 36.0, 180.0)]
    #[case(3.0, 4.0, 18.0, 216.869_897_645_844)]
    fn test_vector_to_polar(
        #[case] u: f64,
        #[case] v: f64,
        #[case] speed: f64,
        #[case] direction: f64,
    ) {
        let wind = vector_to_polar(u, v);
        assert!((wind.speed_kmh - speed).abs() < 1e-9);
        assert!((wind.direction_deg - direction).abs() < 1e-6);
    }

    #[test]
    fn test_kelvin_to_celsius() {
        assert!((kelvin_to_celsius(273.15)).abs() < 1e-12);
    }
}
