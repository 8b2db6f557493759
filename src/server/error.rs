use crate::core::error::ConversionError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::any::Any;
use tracing::{error, warn};

/// Error type for API handlers.
///
/// Keeps the conversion error kind for logging; callers only ever see a
/// fixed message per status.
#[derive(Debug)]
pub struct ApiError(ConversionError);

impl ApiError {
    /// Wraps a handler panic so it is logged and answered like any other internal error.
    pub fn from_panic(panic: Box<dyn Any + Send + 'static>) -> Self {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_string());
        ApiError(ConversionError::Internal(message))
    }

    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            ConversionError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "Missing required parameters")
            }
            ConversionError::InvalidCurrency(_) => {
                (StatusCode::BAD_REQUEST, "Invalid currency code")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();
        let err = &self.0;

        if err.is_client_error() {
            warn!(kind = err.kind(), error = %err, "Rejected request");
        } else {
            error!(kind = err.kind(), error = %err, "Request failed");
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        ApiError(err)
    }
}

/// Helper type for handler results
pub type ApiResult<T> = Result<T, ApiError>;
