//! Provider adapters
//!
//! Each adapter turns one raw provider payload into the normalized
//! [`ProviderData`] shape, or reports a normalization failure.

pub mod meteomatics;
pub mod open_meteo;
pub mod windy;

use serde_json::Value;

use crate::models::{ProviderData, ProviderId};

/// Normalize a raw payload for the given provider
pub fn normalize(provider: ProviderId, payload: &Value) -> crate::Result<ProviderData> {
    match provider {
        ProviderId::Gfs | ProviderId::Icon | ProviderId::Ecmwf => {
            open_meteo::normalize(provider, payload).map(ProviderData::Hourly)
        }
        ProviderId::Windy => windy::normalize(payload).map(ProviderData::Instant),
        ProviderId::Meteomatics => meteomatics::normalize(payload).map(ProviderData::Instant),
    }
}
