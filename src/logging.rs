//! Tracing subscriber setup

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::UavcastError;
use crate::config::LoggingConfig;

/// Filter from `RUST_LOG` when set, otherwise from the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// `verbose` raises the configured level to `debug`. Logs go to stderr so
/// they never interleave with rendered views on stdout.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    installed.map_err(|e| UavcastError::config(format!("Failed to set up logging: {e}")))?;

    tracing::debug!("Logging initialized at level {}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_configured_levels() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            let filter = env_filter(level);
            assert!(!filter.to_string().is_empty());
        }
    }
}
