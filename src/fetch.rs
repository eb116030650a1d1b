//! Fetching raw provider payloads
//!
//! [`PayloadFetcher`] is the seam the refresh cycle talks to; tests swap in
//! an in-memory implementation. [`HttpFetcher`] talks to the real APIs.
//!
//! `Ok(None)` means "this provider has nothing this cycle" (no credentials
//! configured, or Meteomatics declined the request). It is not an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::UavcastError;
use crate::adapters::{meteomatics, open_meteo, windy};
use crate::config::ProvidersConfig;
use crate::models::{Location, ProviderId};

/// Source of raw provider payloads
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Fetch the raw payload of one provider for `location`
    async fn fetch(&self, provider: ProviderId, location: &Location)
    -> crate::Result<Option<Value>>;
}

/// Build the shared HTTP client with timeout and transient-failure retries
pub fn build_client(providers: &ProvidersConfig) -> crate::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(providers.timeout())
        .user_agent(concat!("uavcast/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| UavcastError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(providers.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Open-Meteo request URL for one of the numerical-model providers
#[must_use]
pub fn open_meteo_url(
    base_url: &str,
    provider: ProviderId,
    location: &Location,
    forecast_days: u32,
) -> Option<String> {
    let model = provider.open_meteo_model()?;
    Some(format!(
        "{base_url}?latitude={}&longitude={}&models={model}&hourly={}&daily={}&timezone=auto&forecast_days={forecast_days}",
        location.latitude,
        location.longitude,
        open_meteo::HOURLY_FIELDS.join(","),
        open_meteo::DAILY_FIELDS.join(","),
    ))
}

/// JSON body of a Windy point-forecast request
#[must_use]
pub fn windy_body(location: &Location, api_key: &str) -> Value {
    let levels: Vec<&str> = windy::LEVELS.iter().map(|(label, _)| *label).collect();
    json!({
        "lat": location.latitude,
        "lon": location.longitude,
        "model": windy::MODEL,
        "parameters": windy::PARAMETERS,
        "levels": levels,
        "key": api_key,
    })
}

/// Meteomatics request URL: two days of hourly values starting at `start`
#[must_use]
pub fn meteomatics_url(base_url: &str, location: &Location, start: DateTime<Utc>) -> String {
    format!(
        "{}/{}Z/P2D:PT1H/{}/{},{}/json",
        base_url.trim_end_matches('/'),
        start.format("%Y-%m-%dT%H:%M:%S"),
        meteomatics::parameters().join(","),
        location.latitude,
        location.longitude,
    )
}

/// Fetches payloads from the real provider APIs
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
    providers: ProvidersConfig,
}

impl HttpFetcher {
    pub fn new(providers: ProvidersConfig) -> crate::Result<Self> {
        Ok(Self {
            client: build_client(&providers)?,
            providers,
        })
    }

    async fn fetch_open_meteo(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> crate::Result<Option<Value>> {
        let Some(url) = open_meteo_url(
            &self.providers.open_meteo_url,
            provider,
            location,
            self.providers.forecast_days,
        ) else {
            return Ok(None);
        };
        debug!("Open-Meteo request URL: {}", url);

        send_json(provider, self.client.get(&url)).await.map(Some)
    }

    async fn fetch_windy(&self, location: &Location) -> crate::Result<Option<Value>> {
        let Some(key) = self.providers.windy_key() else {
            debug!("No Windy API key configured, skipping");
            return Ok(None);
        };

        let request = self
            .client
            .post(&self.providers.windy_url)
            .json(&windy_body(location, key));
        send_json(ProviderId::Windy, request).await.map(Some)
    }

    async fn fetch_meteomatics(&self, location: &Location) -> crate::Result<Option<Value>> {
        let Some((username, password)) = self.providers.meteomatics_credentials() else {
            debug!("No Meteomatics credentials configured, skipping");
            return Ok(None);
        };

        let url = meteomatics_url(&self.providers.meteomatics_url, location, Utc::now());
        debug!("Meteomatics request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await
            .map_err(|e| UavcastError::transport(ProviderId::Meteomatics, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Meteomatics answered {}, treating as no data", status);
            return Ok(None);
        }

        response
            .json::<Value>()
            .await
            .map(Some)
            .map_err(|e| UavcastError::normalization(ProviderId::Meteomatics, e.to_string()))
    }
}

#[async_trait]
impl PayloadFetcher for HttpFetcher {
    #[instrument(name = "fetch_provider", skip(self, location), fields(provider = %provider))]
    async fn fetch(
        &self,
        provider: ProviderId,
        location: &Location,
    ) -> crate::Result<Option<Value>> {
        match provider {
            ProviderId::Gfs | ProviderId::Icon | ProviderId::Ecmwf => {
                self.fetch_open_meteo(provider, location).await
            }
            ProviderId::Windy => self.fetch_windy(location).await,
            ProviderId::Meteomatics => self.fetch_meteomatics(location).await,
        }
    }
}

async fn send_json(provider: ProviderId, request: RequestBuilder) -> crate::Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| UavcastError::transport(provider, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UavcastError::transport(provider, format!("HTTP {status}")));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| UavcastError::normalization(provider, format!("invalid JSON: {e}")))
}
