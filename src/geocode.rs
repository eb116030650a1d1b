//! Location resolution
//!
//! Users give either explicit coordinates (`"46.8182,8.2275"` or
//! `"46.8182 8.2275"`) or a place name that is looked up through the
//! Open-Meteo geocoding API.

use std::str::FromStr;

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::UavcastError;
use crate::models::Location;

/// Parsed location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Place name to be geocoded
    Name(String),
}

impl FromStr for LocationInput {
    type Err = UavcastError;

    fn from_str(input: &str) -> crate::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(UavcastError::validation("location cannot be empty"));
        }

        match parse_coordinates(input) {
            Some(coords) => {
                Location::checked(coords.0, coords.1, "")?;
                Ok(LocationInput::Coordinates(coords.0, coords.1))
            }
            None => Ok(LocationInput::Name(input.to_string())),
        }
    }
}

/// Two numbers separated by a comma and/or whitespace
fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    match parts.as_slice() {
        [lat, lon] => Some((lat.parse().ok()?, lon.parse().ok()?)),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        let name = match result.country {
            Some(country) => format!("{}, {}", result.name, country),
            None => result.name,
        };
        Location::new(result.latitude, result.longitude, name)
    }
}

/// Resolves [`LocationInput`] into a [`Location`]
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: ClientWithMiddleware,
    search_url: String,
}

impl Geocoder {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }

    /// Coordinates pass through; names take the first geocoding match
    pub async fn resolve(&self, input: &LocationInput) -> crate::Result<Location> {
        match input {
            LocationInput::Coordinates(lat, lon) => Location::checked(
                *lat,
                *lon,
                Location::from_coordinates(*lat, *lon).name,
            ),
            LocationInput::Name(name) => self.search(name).await,
        }
    }

    #[instrument(skip(self))]
    async fn search(&self, name: &str) -> crate::Result<Location> {
        info!("Geocoding location: '{}'", name);
        let url = format!(
            "{}?name={}&count=1&language=en&format=json",
            self.search_url,
            urlencoding::encode(name)
        );
        debug!("Geocoding request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UavcastError::geolocation(format!("lookup of '{name}' failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UavcastError::geolocation(format!(
                "lookup of '{name}' failed with HTTP {status}"
            )));
        }

        let body: GeocodingResponse = response.json().await.map_err(|e| {
            UavcastError::geolocation(format!("invalid geocoding response for '{name}': {e}"))
        })?;

        let Some(first) = body.results.and_then(|results| results.into_iter().next()) else {
            warn!("No results found for location '{}'", name);
            return Err(UavcastError::geolocation(format!("no place named '{name}'")));
        };

        let location = Location::from(first);
        location.validate()?;
        info!(
            "Resolved '{}' to {} ({})",
            name,
            location.name,
            location.format_coordinates()
        );
        Ok(location)
    }
}
