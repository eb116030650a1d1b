//! Data models for the uavcast engine
//!
//! - Location: the point of interest
//! - Provider: which upstream source a payload came from
//! - Series: normalized hourly series and instant snapshots
//! - Settings: presentation preferences

pub mod location;
pub mod provider;
pub mod series;
pub mod settings;

// Re-export all public types for convenient access
pub use location::Location;
pub use provider::ProviderId;
pub use series::{
    AltitudeLevel, HourlyHeight, HourlySample, HourlySeries, InstantSample, ProviderData,
    SunTimes, SurfaceConditions, Temperature, WindReading,
};
pub use settings::Settings;
