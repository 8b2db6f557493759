//! Currency conversion abstractions and core types

use crate::core::error::ConversionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// A currency identifier such as `USD`.
///
/// Only non-emptiness is checked here. Whether a code is known is decided by
/// the rate provider's response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Result<Self, ConversionError> {
        let code = code.into();
        if code.is_empty() {
            return Err(ConversionError::InvalidRequest(
                "currency code must not be empty".to_string(),
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Rates of every known currency relative to one implicit base currency.
pub type RateTable = BTreeMap<CurrencyCode, f64>;

/// Outcome of a single conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub original_amount: f64,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub exchange_rate: f64,
    pub converted_amount: f64,
}

/// Source of rate tables keyed by base currency.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, ConversionError>;
}

/// Rounds to two decimal places, halves going up.
///
/// Works on the binary `f64` value, so amounts like `1.005` that are stored
/// slightly below the half round down.
pub fn round_currency(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Nearest integer, exact halves toward positive infinity.
fn round_half_up(x: f64) -> f64 {
    let r = x.round();
    // `round` sends negative halves away from zero
    if x - r == 0.5 { r + 1.0 } else { r }
}
