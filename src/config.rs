//! Configuration management for `uavcast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::UavcastError;
use crate::models::{Location, Settings};
use crate::units::WindUnit;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `uavcast`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UavcastConfig {
    /// Upstream provider endpoints and credentials
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Auto-refresh settings
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default location and presentation settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Provider endpoints, credentials and HTTP behaviour
#[derive(Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Open-Meteo forecast endpoint shared by GFS, ICON and ECMWF
    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,
    /// Windy point-forecast endpoint
    #[serde(default = "default_windy_url")]
    pub windy_url: String,
    /// Windy API key; Windy is skipped without one
    pub windy_api_key: Option<String>,
    /// Meteomatics API root
    #[serde(default = "default_meteomatics_url")]
    pub meteomatics_url: String,
    /// Meteomatics account; Meteomatics is skipped without one
    pub meteomatics_username: Option<String>,
    pub meteomatics_password: Option<String>,
    /// Place-name search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Days of hourly forecast requested from Open-Meteo
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Per-provider timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

// Hand-written so credentials never end up in logs
impl std::fmt::Debug for ProvidersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProvidersConfig")
            .field("open_meteo_url", &self.open_meteo_url)
            .field("windy_url", &self.windy_url)
            .field("windy_api_key", &redact(&self.windy_api_key))
            .field("meteomatics_url", &self.meteomatics_url)
            .field("meteomatics_username", &self.meteomatics_username)
            .field("meteomatics_password", &redact(&self.meteomatics_password))
            .field("geocoding_url", &self.geocoding_url)
            .field("forecast_days", &self.forecast_days)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Auto-refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
    /// Minutes between refresh cycles
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default location and presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Display name of the default location
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_wind_unit")]
    pub wind_unit: WindUnit,
    /// IANA time zone for "now"; host local time when absent
    pub timezone: Option<String>,
}

// Default value functions
fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_windy_url() -> String {
    "https://api.windy.com/api/point-forecast/v2".to_string()
}

fn default_meteomatics_url() -> String {
    "https://api.meteomatics.com".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_days() -> u32 {
    2
}

fn default_timeout() -> u32 {
    20
}

fn default_max_retries() -> u32 {
    2
}

fn default_auto_refresh() -> bool {
    true
}

fn default_interval_minutes() -> u32 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_latitude() -> f64 {
    50.45
}

fn default_longitude() -> f64 {
    30.52
}

fn default_location_name() -> String {
    "Kyiv, Ukraine".to_string()
}

fn default_wind_unit() -> WindUnit {
    WindUnit::Kmh
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            open_meteo_url: default_open_meteo_url(),
            windy_url: default_windy_url(),
            windy_api_key: None,
            meteomatics_url: default_meteomatics_url(),
            meteomatics_username: None,
            meteomatics_password: None,
            geocoding_url: default_geocoding_url(),
            forecast_days: default_forecast_days(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            auto_refresh: default_auto_refresh(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            name: default_location_name(),
            wind_unit: default_wind_unit(),
            timezone: None,
        }
    }
}

impl ProvidersConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Windy key, when one is configured
    #[must_use]
    pub fn windy_key(&self) -> Option<&str> {
        self.windy_api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Meteomatics username and password, when both are configured
    #[must_use]
    pub fn meteomatics_credentials(&self) -> Option<(&str, &str)> {
        match (&self.meteomatics_username, &self.meteomatics_password) {
            (Some(user), Some(password)) if !user.is_empty() => Some((user, password)),
            _ => None,
        }
    }
}

impl RefreshConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }
}

impl UavcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. UAVCAST_PROVIDERS__WINDY_API_KEY
        builder = builder.add_source(
            Environment::with_prefix("UAVCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: UavcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uavcast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        let providers = &mut self.providers;
        if providers.open_meteo_url.is_empty() {
            providers.open_meteo_url = default_open_meteo_url();
        }
        if providers.windy_url.is_empty() {
            providers.windy_url = default_windy_url();
        }
        if providers.meteomatics_url.is_empty() {
            providers.meteomatics_url = default_meteomatics_url();
        }
        if providers.geocoding_url.is_empty() {
            providers.geocoding_url = default_geocoding_url();
        }
        if providers.forecast_days == 0 {
            providers.forecast_days = default_forecast_days();
        }
        if providers.timeout_seconds == 0 {
            providers.timeout_seconds = default_timeout();
        }
        if self.refresh.interval_minutes == 0 {
            self.refresh.interval_minutes = default_interval_minutes();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.name.is_empty() {
            self.defaults.name = default_location_name();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_defaults()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.forecast_days > 16 {
            return Err(UavcastError::config("Forecast days cannot exceed 16").into());
        }

        if self.providers.timeout_seconds > 300 {
            return Err(
                UavcastError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.providers.max_retries > 10 {
            return Err(UavcastError::config("Provider max retries cannot exceed 10").into());
        }

        if self.refresh.interval_minutes > 1440 {
            return Err(UavcastError::config(
                "Refresh interval cannot exceed 1440 minutes (1 day)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(UavcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(UavcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("open_meteo_url", &self.providers.open_meteo_url),
            ("windy_url", &self.providers.windy_url),
            ("meteomatics_url", &self.providers.meteomatics_url),
            ("geocoding_url", &self.providers.geocoding_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(UavcastError::config(format!(
                    "Provider {name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate the default location and time zone
    fn validate_defaults(&self) -> Result<()> {
        self.default_location()
            .validate()
            .with_context(|| "Invalid default location")?;

        if let Some(tz) = &self.defaults.timezone {
            tz.parse::<chrono_tz::Tz>().map_err(|_| {
                UavcastError::config(format!("Unknown time zone '{tz}' in defaults"))
            })?;
        }

        Ok(())
    }

    /// Location used when none is given on the command line
    #[must_use]
    pub fn default_location(&self) -> Location {
        Location::new(
            self.defaults.latitude,
            self.defaults.longitude,
            self.defaults.name.clone(),
        )
    }

    /// Presentation settings derived from configuration
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            wind_unit: self.defaults.wind_unit,
            auto_refresh: self.refresh.auto_refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = UavcastConfig::default();
        assert_eq!(
            config.providers.open_meteo_url,
            "https://api.open-meteo.com/v1/forecast"
        );
        assert_eq!(config.providers.forecast_days, 2);
        assert_eq!(config.providers.timeout_seconds, 20);
        assert_eq!(config.refresh.interval_minutes, 15);
        assert!(config.refresh.auto_refresh);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.name, "Kyiv, Ukraine");
        assert_eq!(config.defaults.wind_unit, WindUnit::Kmh);
        assert!(config.providers.windy_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = UavcastConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = UavcastConfig::default();
        config.providers.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = UavcastConfig::default();
        config.refresh.interval_minutes = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_bad_defaults() {
        let mut config = UavcastConfig::default();
        config.defaults.latitude = 123.0;
        assert!(config.validate().is_err());

        let mut config = UavcastConfig::default();
        config.defaults.timezone = Some("Nowhere/Special".to_string());
        assert!(config.validate().is_err());

        let mut config = UavcastConfig::default();
        config.providers.windy_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let mut providers = ProvidersConfig::default();
        providers.meteomatics_username = Some("pilot".to_string());
        assert!(providers.meteomatics_credentials().is_none());

        providers.meteomatics_password = Some("secret".to_string());
        assert_eq!(providers.meteomatics_credentials(), Some(("pilot", "secret")));
        assert!(!format!("{providers:?}").contains("secret"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("uavcast-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[providers]\nwindy_api_key = \"abc\"\ntimeout_seconds = 7\n\n[defaults]\nwind_unit = \"kt\"\nname = \"Lviv\""
        )
        .unwrap();

        let config = UavcastConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.providers.windy_key(), Some("abc"));
        assert_eq!(config.providers.timeout_seconds, 7);
        assert_eq!(config.providers.max_retries, 2);
        assert_eq!(config.defaults.wind_unit, WindUnit::Kt);
        assert_eq!(config.settings().wind_unit, WindUnit::Kt);
        assert_eq!(config.default_location().name, "Lviv");
    }

    #[test]
    fn test_config_path_generation() {
        let path = UavcastConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("uavcast"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
