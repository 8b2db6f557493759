use crate::server::AppState;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_action))
}

pub async fn health_action() -> Json<Value> {
    Json(json!({ "status": "Currency Service is running!" }))
}
