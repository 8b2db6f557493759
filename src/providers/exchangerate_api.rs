use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::core::config::ProviderConfig;
use crate::core::currency::{CurrencyCode, RateProvider, RateTable};
use crate::core::error::ConversionError;

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: RateTable,
    #[serde(default)]
    date: Option<String>,
}

/// Client for exchangerate-api style `GET {base_url}/latest/{base}` endpoints.
///
/// Makes exactly one request per call. Retrying is left to callers.
pub struct ExchangeRateApiProvider {
    base_url: Url,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid provider URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Provider URL cannot be a base: {base_url}"));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("currency-service/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    fn latest_url(&self, base: &CurrencyCode) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("latest").push(base.as_str());
        }
        url
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ProviderFetchRates", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, ConversionError> {
        let url = self.latest_url(base);
        debug!("Requesting rates from {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let reason = if e.is_timeout() { "Timed out" } else { "Request error" };
            ConversionError::ProviderUnavailable(format!("{reason}: {e} for URL: {url}"))
        })?;

        if !response.status().is_success() {
            return Err(ConversionError::ProviderUnavailable(format!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            )));
        }

        let text = response.text().await.map_err(|e| {
            ConversionError::ProviderUnavailable(format!("Failed to read response body: {e}"))
        })?;

        let data: LatestRatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %text,
                    "Failed to parse rates response"
                );
                return Err(ConversionError::ProviderMalformedResponse(format!(
                    "Failed to parse JSON response for {base}: {e}"
                )));
            }
        };

        debug!(
            count = data.rates.len(),
            date = data.date.as_deref().unwrap_or("unknown"),
            "Received rate table"
        );
        Ok(data.rates)
    }
}
