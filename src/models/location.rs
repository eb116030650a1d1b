//! Location model for the point of interest

use serde::{Deserialize, Serialize};

use crate::UavcastError;

/// Point of interest the forecast is fetched for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees, positive north
    pub latitude: f64,
    /// Longitude in decimal degrees, positive east
    pub longitude: f64,
    /// Free-text display name
    pub name: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
        }
    }

    /// Create a location named after its own coordinates
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, format!("{latitude:.4}, {longitude:.4}"))
    }

    /// Build a validated location
    pub fn checked(latitude: f64, longitude: f64, name: impl Into<String>) -> crate::Result<Self> {
        let location = Self::new(latitude, longitude, name);
        location.validate()?;
        Ok(location)
    }

    /// Reject coordinates outside the valid range
    pub fn validate(&self) -> crate::Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(UavcastError::validation(format!(
                "latitude {} is outside -90..=90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(UavcastError::validation(format!(
                "longitude {} is outside -180..=180",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
