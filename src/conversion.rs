//! Cache-backed currency conversion and rate lookups.

use crate::core::cache::Cache;
use crate::core::currency::{
    ConversionResult, CurrencyCode, RateProvider, RateTable, round_currency,
};
use crate::core::error::ConversionError;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A value held by the rate cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRates {
    /// Rate for one pair. The pair is kept so that codes containing `_`
    /// cannot be served each other's rate through a shared key.
    Rate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
    },
    /// Full table for one base currency.
    Table(RateTable),
}

pub type RateCache = dyn Cache<String, CachedRates>;

fn pair_key(from: &CurrencyCode, to: &CurrencyCode) -> String {
    format!("{from}_{to}")
}

fn table_key(base: &CurrencyCode) -> String {
    format!("rates_{base}")
}

/// Converts amounts using rates from a provider, reusing cached rates until they expire.
///
/// Concurrent misses on the same key may each call the provider; the last
/// write to the cache wins.
pub struct ConversionEngine {
    provider: Arc<dyn RateProvider>,
    cache: Arc<RateCache>,
}

impl ConversionEngine {
    pub fn new(provider: Arc<dyn RateProvider>, cache: Arc<RateCache>) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    /// Converts `amount` of `from` into `to`, rounded to two decimals.
    ///
    /// A zero or non-finite amount and empty codes are rejected before the
    /// provider is contacted. A target missing from the provider's table is
    /// reported as [`ConversionError::InvalidCurrency`] and is not cached.
    #[instrument(skip(self))]
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ConversionError> {
        if amount == 0.0 || !amount.is_finite() {
            return Err(ConversionError::InvalidRequest(format!(
                "amount must be a non-zero number, got {amount}"
            )));
        }
        let from = CurrencyCode::new(from)?;
        let to = CurrencyCode::new(to)?;

        let exchange_rate = self.pair_rate(&from, &to).await?;
        let converted_amount = round_currency(amount * exchange_rate);

        Ok(ConversionResult {
            original_amount: amount,
            from_currency: from,
            to_currency: to,
            exchange_rate,
            converted_amount,
        })
    }

    /// Returns every rate the provider knows for `base`.
    #[instrument(skip(self))]
    pub async fn get_rates(&self, base: &str) -> Result<RateTable, ConversionError> {
        let base = CurrencyCode::new(base)?;
        let key = table_key(&base);

        if let Some(CachedRates::Table(rates)) = self.cache.get(&key).await {
            return Ok(rates);
        }

        let rates = self.provider.fetch_rates(&base).await?;
        self.cache.put(key, CachedRates::Table(rates.clone())).await;
        Ok(rates)
    }

    async fn pair_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ConversionError> {
        let key = pair_key(from, to);

        // Anything stored for another pair under the same key reads as a miss
        match self.cache.get(&key).await {
            Some(CachedRates::Rate {
                from: cached_from,
                to: cached_to,
                rate,
            }) if cached_from == *from && cached_to == *to => return Ok(rate),
            _ => {}
        }

        let rates = self.provider.fetch_rates(from).await?;
        let rate = rates
            .get(to)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| ConversionError::InvalidCurrency(to.to_string()))?;
        debug!(%from, %to, rate, "Fetched pair rate");

        let entry = CachedRates::Rate {
            from: from.clone(),
            to: to.clone(),
            rate,
        };
        self.cache.put(key, entry).await;
        Ok(rate)
    }
}
