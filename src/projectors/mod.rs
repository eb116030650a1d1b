//! View projectors
//!
//! Each projector is a pure read over an [`AggregateStore`](crate::store::AggregateStore):
//! it never writes back and never fetches. Wind speeds are converted into the
//! display unit here, one value at a time; nothing downstream of the store is
//! cached between calls.
//!
//! - `summary`: current-hour tiles for one provider
//! - `timeline`: up to 24 hourly rows for series providers
//! - `profile`: wind by altitude
//! - `comparison`: the same metrics side by side across providers

pub mod comparison;
pub mod profile;
pub mod summary;
pub mod timeline;

use serde::Serialize;

use crate::models::WindReading;
use crate::units::{WindUnit, wind_arrow, wind_dir_label};
use crate::weather_code::{describe_weather_code, weather_icon};

pub use comparison::{
    ChartMetric, ChartSeries, ComparisonChart, ComparisonRow, ComparisonTable, Metric,
    comparison_chart, project_comparison,
};
pub use profile::{ProfileRow, project_profile};
pub use summary::{ConditionsSummary, project_summary};
pub use timeline::{HourRow, TIMELINE_HOURS, project_timeline};

/// Wind ready for display: converted, rounded, with direction glyph and label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindFigure {
    /// Speed in the display unit, rounded
    pub speed: f64,
    pub direction_deg: f64,
    pub arrow: &'static str,
    pub label: &'static str,
}

impl WindFigure {
    #[must_use]
    pub fn new(reading: WindReading, unit: WindUnit) -> Self {
        Self {
            speed: unit.format_speed(reading.speed_kmh),
            direction_deg: reading.direction_deg,
            arrow: wind_arrow(reading.direction_deg),
            label: wind_dir_label(reading.direction_deg),
        }
    }
}

/// Weather condition with its text and icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherCondition {
    pub code: i32,
    pub text: &'static str,
    pub icon: &'static str,
}

impl WeatherCondition {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self {
            code,
            text: describe_weather_code(code),
            icon: weather_icon(code),
        }
    }
}

/// Meters to whole kilometers
#[must_use]
pub fn visibility_km(meters: f64) -> f64 {
    (meters / 1000.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_figure_converts_and_rounds() {
        let figure = WindFigure::new(WindReading::new(36.0, 0.0), WindUnit::Ms);
        assert_eq!(figure.speed, 10.0);
        assert_eq!(figure.arrow, "↓");
        assert_eq!(figure.label, "N");
    }

    #[test]
    fn test_visibility_km() {
        assert_eq!(visibility_km(24_140.0), 24.0);
        assert_eq!(visibility_km(500.0), 1.0);
        assert!(visibility_km(f64::NAN).is_nan());
    }
}
