//! `uavcast` - multi-source wind and weather forecasts for UAV pilots
//!
//! This library fetches forecasts from several providers, normalizes their
//! differently shaped payloads into one model, and projects that model into
//! current conditions, hourly tables, altitude profiles and cross-provider
//! comparisons.

pub mod adapters;
pub mod app;
pub mod clock;
pub mod config;
pub mod derived;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod logging;
pub mod models;
pub mod projectors;
pub mod refresh;
pub mod render;
pub mod scheduler;
pub mod store;
pub mod time_index;
pub mod units;
pub mod weather_code;

// Re-export core types for public API
pub use app::AppContext;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::UavcastConfig;
pub use error::UavcastError;
pub use fetch::{HttpFetcher, PayloadFetcher};
pub use geocode::{Geocoder, LocationInput};
pub use models::{HourlySeries, InstantSample, Location, ProviderData, ProviderId, Settings};
pub use refresh::{RefreshReport, RefreshService};
pub use scheduler::RefreshTask;
pub use store::{AggregateStore, ForecastSnapshot, StoreHandle};
pub use time_index::resolve_now_index;
pub use units::WindUnit;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, UavcastError>;
