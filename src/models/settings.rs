//! Presentation settings

use serde::{Deserialize, Serialize};

use crate::units::WindUnit;

/// User presentation preferences
///
/// Only projectors read these. Stored forecast values stay in km/h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Unit wind speeds are displayed in
    pub wind_unit: WindUnit,
    /// Whether the scheduler refreshes data periodically
    pub auto_refresh: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wind_unit: WindUnit::Kmh,
            auto_refresh: true,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_unit(mut self, wind_unit: WindUnit) -> Self {
        self.wind_unit = wind_unit;
        self
    }
}
