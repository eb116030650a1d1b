//! Provider identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UavcastError;

/// One external weather-data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gfs,
    Icon,
    Ecmwf,
    Windy,
    Meteomatics,
}

impl ProviderId {
    /// Every provider, in the order a refresh cycle fetches them
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Gfs,
        ProviderId::Icon,
        ProviderId::Ecmwf,
        ProviderId::Windy,
        ProviderId::Meteomatics,
    ];

    /// The numerical-model providers served by the Open-Meteo adapter
    pub const OPEN_METEO: [ProviderId; 3] = [ProviderId::Gfs, ProviderId::Icon, ProviderId::Ecmwf];

    /// Stable lowercase key, as used on the command line and in config
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ProviderId::Gfs => "gfs",
            ProviderId::Icon => "icon",
            ProviderId::Ecmwf => "ecmwf",
            ProviderId::Windy => "windy",
            ProviderId::Meteomatics => "meteomatics",
        }
    }

    /// Upstream `models=` parameter for Open-Meteo variants
    #[must_use]
    pub fn open_meteo_model(self) -> Option<&'static str> {
        match self {
            ProviderId::Gfs => Some("gfs_global"),
            ProviderId::Icon => Some("icon_global"),
            ProviderId::Ecmwf => Some("ecmwf_ifs025"),
            ProviderId::Windy | ProviderId::Meteomatics => None,
        }
    }

    #[must_use]
    pub fn is_open_meteo(self) -> bool {
        self.open_meteo_model().is_some()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderId::Gfs => "GFS",
            ProviderId::Icon => "ICON",
            ProviderId::Ecmwf => "ECMWF",
            ProviderId::Windy => "Windy",
            ProviderId::Meteomatics => "Meteomatics",
        };
        f.write_str(label)
    }
}

impl FromStr for ProviderId {
    type Err = UavcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ProviderId::ALL
            .into_iter()
            .find(|p| p.key() == needle)
            .ok_or_else(|| {
                UavcastError::validation(format!(
                    "unknown provider '{s}', expected one of gfs, icon, ecmwf, windy, meteomatics"
                ))
            })
    }
}
