//! Error types and handling for `uavcast`

use crate::models::ProviderId;
use thiserror::Error;

/// Main error type for the `uavcast` library
#[derive(Error, Debug)]
pub enum UavcastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A single provider could not be reached or answered with an HTTP error
    #[error("Transport error from {provider}: {message}")]
    Transport { provider: ProviderId, message: String },

    /// A provider answered, but the payload did not have the expected shape
    #[error("Normalization error for {provider}: {message}")]
    Normalization { provider: ProviderId, message: String },

    /// Every provider of a refresh cycle failed
    #[error("No provider returned data ({attempted} attempted)")]
    AllProvidersFailed { attempted: usize },

    /// Location lookup errors
    #[error("Geolocation error: {message}")]
    Geolocation { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl UavcastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error for one provider
    pub fn transport<S: Into<String>>(provider: ProviderId, message: S) -> Self {
        Self::Transport {
            provider,
            message: message.into(),
        }
    }

    /// Create a new normalization error for one provider
    pub fn normalization<S: Into<String>>(provider: ProviderId, message: S) -> Self {
        Self::Normalization {
            provider,
            message: message.into(),
        }
    }

    pub fn all_providers_failed(attempted: usize) -> Self {
        Self::AllProvidersFailed { attempted }
    }

    /// Create a new geolocation error
    pub fn geolocation<S: Into<String>>(message: S) -> Self {
        Self::Geolocation {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Provider the error belongs to, if it is a per-provider failure
    #[must_use]
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::Transport { provider, .. } | Self::Normalization { provider, .. } => {
                Some(*provider)
            }
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            UavcastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            UavcastError::Transport { provider, .. } => {
                format!("{provider} is currently unreachable.")
            }
            UavcastError::Normalization { provider, .. } => {
                format!("{provider} returned data in an unexpected format.")
            }
            UavcastError::AllProvidersFailed { .. } => {
                "Unable to load forecast data. Please check your internet connection.".to_string()
            }
            UavcastError::Geolocation { message } => {
                format!("Could not determine location: {message}")
            }
            UavcastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            UavcastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = UavcastError::config("missing API key");
        assert!(matches!(config_err, UavcastError::Config { .. }));

        let transport_err = UavcastError::transport(ProviderId::Gfs, "connection failed");
        assert!(matches!(transport_err, UavcastError::Transport { .. }));

        let validation_err = UavcastError::validation("invalid coordinates");
        assert!(matches!(validation_err, UavcastError::Validation { .. }));
    }

    #[test]
    fn test_provider_attribution() {
        let err = UavcastError::normalization(ProviderId::Windy, "missing wind_u-surface");
        assert_eq!(err.provider(), Some(ProviderId::Windy));
        assert_eq!(UavcastError::all_providers_failed(5).provider(), None);
    }

    #[test]
    fn test_user_messages() {
        let config_err = UavcastError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let total = UavcastError::all_providers_failed(5);
        assert!(total.user_message().contains("internet connection"));

        let validation_err = UavcastError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let transport = UavcastError::transport(ProviderId::Icon, "503");
        assert!(transport.user_message().contains("ICON"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: UavcastError = io_err.into();
        assert!(matches!(err, UavcastError::Io { .. }));
    }
}
