//! Plain-text rendering of projector output
//!
//! Missing and non-computable values are printed as `-`.

use std::fmt;

use crate::derived::CLOUD_BASE_NOTE;
use crate::models::{Location, ProviderId};
use crate::projectors::{
    ComparisonChart, ComparisonTable, ConditionsSummary, HourRow, ProfileRow, WindFigure,
};
use crate::refresh::RefreshReport;
use crate::units::WindUnit;

const PLACEHOLDER: &str = "-";

/// Rounded value with suffix, or the placeholder
fn num(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let rounded = v.round();
            // avoid printing "-0"
            let rounded = if rounded == 0.0 { 0.0 } else { rounded };
            format!("{rounded:.0}{suffix}")
        }
        _ => PLACEHOLDER.to_string(),
    }
}

fn wind(figure: &WindFigure, unit: WindUnit) -> String {
    if figure.speed.is_finite() {
        format!("{} {} {}", num(Some(figure.speed), ""), unit.label(), figure.arrow)
    } else {
        PLACEHOLDER.to_string()
    }
}

fn direction(figure: &WindFigure) -> String {
    if figure.direction_deg.is_finite() {
        format!("{}° ({})", num(Some(figure.direction_deg), ""), figure.label)
    } else {
        PLACEHOLDER.to_string()
    }
}

/// Header line for a view
pub struct Heading<'a> {
    pub title: &'a str,
    pub location: &'a Location,
    pub provider: Option<ProviderId>,
}

impl fmt::Display for Heading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.title,
            self.location.name,
            self.location.format_coordinates()
        )?;
        if let Some(provider) = self.provider {
            write!(f, " [{provider}]")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ConditionsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(time) = self.time {
            writeln!(f, "  Forecast hour   {}", time.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(valid_at) = self.valid_at {
            writeln!(f, "  Valid at        {}", valid_at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        if let Some(weather) = self.weather {
            writeln!(f, "  {} Weather      {}", weather.icon, weather.text)?;
        }
        writeln!(f, "  💨 Wind         {}", wind(&self.wind, self.unit))?;
        if self.gust.is_some() {
            writeln!(f, "  🌪️ Gusts        {}", num(self.gust, &format!(" {}", self.unit.label())))?;
        }
        writeln!(f, "  🌡️ Temperature  {}", num(self.temperature_c, "°C"))?;
        if self.dew_point_c.is_some() {
            writeln!(
                f,
                "  💧 Dew point    {} (spread {})",
                num(self.dew_point_c, "°C"),
                num(self.spread_c(), "°C")
            )?;
        }
        if self.humidity.is_some() {
            writeln!(f, "  💦 Humidity     {}", num(self.humidity, "%"))?;
        }
        if self.cloud_cover.is_some() {
            writeln!(f, "  ☁️ Cloud cover  {}", num(self.cloud_cover, "%"))?;
        }
        if self.cloud_base_m.is_some() {
            writeln!(f, "  ⛅ Cloud base   {} (estimated)", num(self.cloud_base_m, " m"))?;
        }
        if self.visibility_km.is_some() {
            writeln!(f, "  👁️ Visibility   {}", num(self.visibility_km, " km"))?;
        }
        if let Some(precipitation) = self.precipitation_mm {
            writeln!(f, "  🌧️ Precip.      {precipitation} mm/h")?;
        }
        if let Some(sun) = &self.sun {
            writeln!(
                f,
                "  🌅 Sun          {} - {}",
                sun.sunrise.format("%H:%M"),
                sun.sunset.format("%H:%M")
            )?;
        }
        if self.cloud_base_m.is_some() {
            writeln!(f)?;
            writeln!(f, "  ℹ️ {CLOUD_BASE_NOTE}")?;
        }
        Ok(())
    }
}

/// Hourly table
pub struct TimelineView<'a> {
    pub rows: &'a [HourRow],
    pub unit: WindUnit,
}

impl fmt::Display for TimelineView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "  No hourly series for this provider.");
        }
        writeln!(
            f,
            "  {:<7}{:<4}{:<16}{:<10}{:<7}{:<7}{:<6}{:<7}{:<9}{:<8}{}",
            "Hour", "", "Wind", "Gusts", "Temp", "Dew", "RH", "Cloud", "Base", "Vis", "Precip"
        )?;
        for row in self.rows {
            let marker = if row.is_current { ">" } else { " " };
            let precipitation = row
                .precipitation_mm
                .map_or_else(|| PLACEHOLDER.to_string(), |p| format!("{p} mm"));
            writeln!(
                f,
                "{marker} {:<7}{:<4}{:<16}{:<10}{:<7}{:<7}{:<6}{:<7}{:<9}{:<8}{}",
                row.time.format("%H:00"),
                row.weather.map_or(PLACEHOLDER, |w| w.icon),
                wind(&row.wind, self.unit),
                num(Some(row.gust), ""),
                num(Some(row.temperature_c), "°C"),
                num(Some(row.dew_point_c), "°C"),
                num(Some(row.humidity), "%"),
                num(row.cloud_cover, "%"),
                num(Some(row.cloud_base_m), " m"),
                num(row.visibility_km, " km"),
                precipitation,
            )?;
        }
        Ok(())
    }
}

/// Altitude table, highest level first
pub struct ProfileView<'a> {
    pub rows: &'a [ProfileRow],
    pub unit: WindUnit,
}

impl fmt::Display for ProfileView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "  No altitude data for this provider.");
        }
        writeln!(
            f,
            "  {:<10}{:<16}{:<10}{:<14}{}",
            "Height", "Wind", "Gusts", "Direction", "Temp"
        )?;
        for row in self.rows.iter().rev() {
            writeln!(
                f,
                "  {:<10}{:<16}{:<10}{:<14}{}",
                format!("{} m", row.height_m),
                wind(&row.wind, self.unit),
                num(row.gust, ""),
                direction(&row.wind),
                num(row.temperature_c, "°C"),
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {:<14}", "")?;
        for provider in ProviderId::ALL {
            write!(f, "{:<13}", provider.to_string())?;
        }
        writeln!(f)?;

        for row in &self.rows {
            let suffix = match row.metric.unit(self.unit) {
                unit @ ("°C" | "%") => unit.to_string(),
                unit => format!(" {unit}"),
            };
            write!(f, "  {:<14}", row.metric.label())?;
            for (_, value) in &row.cells {
                write!(f, "{:<13}", num(*value, &suffix))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {} ({}), first 24 hours", self.metric.label(), self.unit)?;
        if self.series.is_empty() {
            return writeln!(f, "  No hourly series available.");
        }
        write!(f, "  {:<7}", "Hour")?;
        for line in &self.series {
            write!(f, "{:<8}", line.provider.to_string())?;
        }
        writeln!(f)?;
        for (i, label) in self.labels.iter().enumerate() {
            write!(f, "  {label:<7}")?;
            for line in &self.series {
                write!(f, "{:<8}", num(line.values.get(i).copied(), ""))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |ids: &[ProviderId]| {
            ids.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "Loaded: {}", names(&self.populated))?;
        if !self.skipped.is_empty() {
            write!(f, " | not configured: {}", names(&self.skipped))?;
        }
        for failure in &self.failures {
            write!(f, " | {} unavailable", failure.provider)?;
        }
        Ok(())
    }
}
