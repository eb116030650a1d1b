//! Side-by-side comparison across providers
//!
//! The "now" index is resolved once, from the GFS series, and reused for every
//! series provider. Providers whose time axis is shifted against GFS will be
//! read at the wrong hour; this matches how the dashboard has always compared
//! models.

use serde::Serialize;

use crate::clock::Clock;
use crate::derived::{dew_point, dew_point_or_synthesized};
use crate::models::{HourlySample, InstantSample, ProviderData, ProviderId, Settings};
use crate::store::AggregateStore;
use crate::time_index::resolve_now_index_for;
use crate::units::WindUnit;

/// Provider whose series decides the shared "now" index
pub const REFERENCE_PROVIDER: ProviderId = ProviderId::Gfs;

/// Hours covered by a comparison chart
pub const CHART_HOURS: usize = 24;

/// Metrics compared across providers, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Wind10m,
    Gusts,
    Temperature,
    DewPoint,
    Humidity,
    CloudCover,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Wind10m,
        Metric::Gusts,
        Metric::Temperature,
        Metric::DewPoint,
        Metric::Humidity,
        Metric::CloudCover,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metric::Wind10m => "Wind 10m",
            Metric::Gusts => "Gusts",
            Metric::Temperature => "Temperature",
            Metric::DewPoint => "Dew point",
            Metric::Humidity => "Humidity",
            Metric::CloudCover => "Cloud cover",
        }
    }

    /// Unit suffix for display
    #[must_use]
    pub fn unit(self, wind_unit: WindUnit) -> &'static str {
        match self {
            Metric::Wind10m | Metric::Gusts => wind_unit.label(),
            Metric::Temperature | Metric::DewPoint => "°C",
            Metric::Humidity | Metric::CloudCover => "%",
        }
    }
}

/// One metric across all providers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: Metric,
    /// One rounded cell per provider in [`ProviderId::ALL`] order; `None` is "-"
    pub cells: Vec<(ProviderId, Option<f64>)>,
}

impl ComparisonRow {
    #[must_use]
    pub fn value(&self, provider: ProviderId) -> Option<f64> {
        self.cells
            .iter()
            .find(|(id, _)| *id == provider)
            .and_then(|(_, value)| *value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    /// Index every series provider was read at
    pub index: usize,
    pub unit: WindUnit,
    pub rows: Vec<ComparisonRow>,
}

/// Compare the fixed metric set across every provider
#[must_use]
pub fn project_comparison(
    store: &AggregateStore,
    settings: &Settings,
    clock: &dyn Clock,
) -> ComparisonTable {
    let index = resolve_now_index_for(store.get(REFERENCE_PROVIDER), clock);
    let unit = settings.wind_unit;

    let rows = Metric::ALL
        .into_iter()
        .map(|metric| ComparisonRow {
            metric,
            cells: ProviderId::ALL
                .into_iter()
                .map(|provider| {
                    let value = match store.get(provider) {
                        Some(ProviderData::Hourly(series)) => series
                            .get(index)
                            .and_then(|sample| hourly_cell(sample, metric, unit)),
                        Some(ProviderData::Instant(sample)) => {
                            instant_cell(provider, sample, metric, unit)
                        }
                        None => None,
                    };
                    (provider, value)
                })
                .collect(),
        })
        .collect();

    ComparisonTable { index, unit, rows }
}

fn hourly_cell(sample: &HourlySample, metric: Metric, unit: WindUnit) -> Option<f64> {
    match metric {
        Metric::Wind10m => Some(unit.format_speed(sample.wind_10m.speed_kmh)),
        Metric::Gusts => Some(unit.format_speed(sample.gust_10m_kmh)),
        Metric::Temperature => Some(sample.temperature_c.round()),
        Metric::DewPoint => Some(
            dew_point_or_synthesized(
                sample.dew_point_c,
                sample.temperature_c,
                sample.relative_humidity,
            )
            .round(),
        ),
        Metric::Humidity => Some(sample.relative_humidity.round()),
        Metric::CloudCover => sample.cloud_cover.map(f64::round),
    }
}

fn instant_cell(
    provider: ProviderId,
    sample: &InstantSample,
    metric: Metric,
    unit: WindUnit,
) -> Option<f64> {
    let surface = &sample.surface;
    match (provider, metric) {
        (_, Metric::Wind10m) => sample
            .level_at(10)
            .map(|level| unit.format_speed(level.wind.speed_kmh)),
        (_, Metric::Temperature) => sample.surface_temperature_c().map(f64::round),
        (ProviderId::Meteomatics, Metric::Gusts) => surface.gust_kmh.map(|g| unit.format_speed(g)),
        (ProviderId::Meteomatics, Metric::DewPoint) => {
            Some(dew_point(surface.temperature_c?, surface.relative_humidity?).round())
        }
        (ProviderId::Meteomatics, Metric::Humidity) => surface.relative_humidity.map(f64::round),
        _ => None,
    }
}

/// Metrics available as 24-hour comparison charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartMetric {
    Wind,
    Temperature,
}

impl ChartMetric {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ChartMetric::Wind => "Wind",
            ChartMetric::Temperature => "Temperature",
        }
    }
}

/// One provider's line in a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub provider: ProviderId,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    pub metric: ChartMetric,
    /// Display unit of the values
    pub unit: String,
    /// `0:00` through `23:00`
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// First 24 hours of `metric` for every series provider with data
#[must_use]
pub fn comparison_chart(
    store: &AggregateStore,
    metric: ChartMetric,
    settings: &Settings,
) -> ComparisonChart {
    let unit = settings.wind_unit;
    let series = ProviderId::OPEN_METEO
        .into_iter()
        .filter_map(|provider| {
            let hourly = store.hourly(provider)?;
            let values = hourly
                .first_hours(CHART_HOURS)
                .iter()
                .map(|sample| match metric {
                    ChartMetric::Wind => unit.format_speed(sample.wind_10m.speed_kmh),
                    ChartMetric::Temperature => sample.temperature_c.round(),
                })
                .collect();
            Some(ChartSeries { provider, values })
        })
        .collect();

    ComparisonChart {
        metric,
        unit: match metric {
            ChartMetric::Wind => unit.label().to_string(),
            ChartMetric::Temperature => "°C".to_string(),
        },
        labels: (0..CHART_HOURS).map(|h| format!("{h}:00")).collect(),
        series,
    }
}
