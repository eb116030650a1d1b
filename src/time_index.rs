//! Maps "now" onto an index of an hourly series

use chrono::Timelike;

use crate::clock::Clock;
use crate::models::{HourlySeries, ProviderData};

/// Index of the first sample whose local hour equals the clock's hour.
///
/// This is an hour-of-day match, not a nearest-timestamp search: on a
/// multi-day series the earliest matching day always wins. Falls back to 0
/// when nothing matches.
#[must_use]
pub fn resolve_now_index(series: &HourlySeries, clock: &dyn Clock) -> usize {
    let hour = clock.now().hour();
    series
        .samples
        .iter()
        .position(|sample| sample.time.hour() == hour)
        .unwrap_or(0)
}

/// Same as [`resolve_now_index`] for an optional store entry; 0 for anything but a series
#[must_use]
pub fn resolve_now_index_for(data: Option<&ProviderData>, clock: &dyn Clock) -> usize {
    data.and_then(ProviderData::as_hourly)
        .map_or(0, |series| resolve_now_index(series, clock))
}
