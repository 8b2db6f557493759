use crate::core::currency::{ConversionResult, RateTable};
use crate::core::error::ConversionError;
use crate::server::{ApiResult, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/currency/convert", post(convert_action))
        .route("/api/currency/rates/{currency}", get(rates_action))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    amount: Option<f64>,
    from_currency: Option<String>,
    to_currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesViewModel {
    pub base_currency: String,
    pub rates: RateTable,
}

pub async fn convert_action(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> ApiResult<Json<ConversionResult>> {
    let Json(request) =
        payload.map_err(|rejection| ConversionError::InvalidRequest(rejection.body_text()))?;

    let (Some(amount), Some(from), Some(to)) = (
        request.amount,
        request.from_currency.as_deref(),
        request.to_currency.as_deref(),
    ) else {
        let detail = format!("missing field in {request:?}");
        return Err(ConversionError::InvalidRequest(detail).into());
    };

    let result = state.engine.convert(amount, from, to).await?;
    Ok(Json(result))
}

pub async fn rates_action(
    State(state): State<AppState>,
    Path(currency): Path<String>,
) -> ApiResult<Json<RatesViewModel>> {
    let rates = state.engine.get_rates(&currency).await?;

    Ok(Json(RatesViewModel {
        base_currency: currency,
        rates,
    }))
}
