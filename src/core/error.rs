//! Conversion error types.

use thiserror::Error;

/// Errors raised while converting amounts or looking up rates.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    /// A required input was missing or empty.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The target currency is not in the provider's rate table.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// The provider could not be reached, timed out or answered with an error status.
    #[error("Rate provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider answered but the payload is not a rate table.
    #[error("Malformed rate provider response: {0}")]
    ProviderMalformedResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Short label of the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::InvalidRequest(_) => "invalid_request",
            ConversionError::InvalidCurrency(_) => "invalid_currency",
            ConversionError::ProviderUnavailable(_) => "provider_unavailable",
            ConversionError::ProviderMalformedResponse(_) => "provider_malformed_response",
            ConversionError::Internal(_) => "internal",
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConversionError::InvalidRequest(_) | ConversionError::InvalidCurrency(_)
        )
    }
}
