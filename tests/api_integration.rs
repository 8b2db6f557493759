use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use currency_service::conversion::{CachedRates, ConversionEngine};
use currency_service::core::config::AppConfig;
use currency_service::core::currency::{CurrencyCode, RateProvider, RateTable};
use currency_service::core::error::ConversionError;
use currency_service::server::AppState;
use currency_service::store::MemoryCache;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RATES: &str = r#"{
        "base": "USD",
        "date": "2025-06-30",
        "rates": {
            "USD": 1,
            "EUR": 0.92,
            "GBP": 0.79,
            "INR": 85.7
        }
    }"#;

    pub async fn create_mock_server(
        base: &str,
        response: ResponseTemplate,
        expected_calls: u64,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/latest/{base}")))
            .respond_with(response)
            .expect(expected_calls)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn ok(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(body)
    }
}

fn app_for(provider_url: &str) -> Router {
    let mut config = AppConfig::default();
    config.provider.base_url = provider_url.to_string();
    let state = currency_service::build_state(&config).expect("Failed to build state");
    currency_service::server::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    info!(%status, %body, "Received response");
    (status, body)
}

fn convert_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/currency/convert")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_health() {
    let mock_server = test_utils::create_mock_server("USD", test_utils::ok("{}"), 0).await;
    let app = app_for(&mock_server.uri());

    let (status, body) = send(&app, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Currency Service is running!" }));
}

#[test_log::test(tokio::test)]
async fn test_convert_and_reuse_cached_rate() {
    let mock_server =
        test_utils::create_mock_server("USD", test_utils::ok(test_utils::USD_RATES), 1).await;
    let app = app_for(&mock_server.uri());

    let (status, body) = send(
        &app,
        convert_request(r#"{"amount": 100, "fromCurrency": "USD", "toCurrency": "EUR"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "originalAmount": 100.0,
            "fromCurrency": "USD",
            "toCurrency": "EUR",
            "exchangeRate": 0.92,
            "convertedAmount": 92.0
        })
    );

    // Served from the cache, the mock expects a single provider call
    let (status, body) = send(
        &app,
        convert_request(r#"{"amount": 12.5, "fromCurrency": "USD", "toCurrency": "EUR"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["convertedAmount"], 11.5);
}

#[test_log::test(tokio::test)]
async fn test_convert_missing_parameters() {
    let mock_server = test_utils::create_mock_server("USD", test_utils::ok("{}"), 0).await;
    let app = app_for(&mock_server.uri());

    for payload in [
        r#"{"fromCurrency": "USD", "toCurrency": "EUR"}"#,
        r#"{"amount": 0, "fromCurrency": "USD", "toCurrency": "EUR"}"#,
        r#"{"amount": 10, "toCurrency": "EUR"}"#,
        r#"{"amount": 10, "fromCurrency": "", "toCurrency": "EUR"}"#,
        r#"{"amount": 10, "fromCurrency": "USD", "toCurrency": null}"#,
        r#"{"amount": 10, "fromCurrency": "USD""#,
    ] {
        let (status, body) = send(&app, convert_request(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body, json!({ "error": "Missing required parameters" }));
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_without_content_type() {
    let mock_server = test_utils::create_mock_server("USD", test_utils::ok("{}"), 0).await;
    let app = app_for(&mock_server.uri());

    let request = Request::builder()
        .method("POST")
        .uri("/api/currency/convert")
        .body(Body::from(
            r#"{"amount": 10, "fromCurrency": "USD", "toCurrency": "EUR"}"#,
        ))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required parameters" }));
}

struct PanickingProvider;

#[async_trait]
impl RateProvider for PanickingProvider {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, ConversionError> {
        panic!("rate table for {base} is corrupt");
    }
}

#[test_log::test(tokio::test)]
async fn test_handler_panic_is_generic_500() {
    let engine = ConversionEngine::new(
        Arc::new(PanickingProvider),
        Arc::new(MemoryCache::<String, CachedRates>::new()),
    );
    let app = currency_service::server::router(AppState::new(engine));

    let (status, body) = send(
        &app,
        convert_request(r#"{"amount": 10, "fromCurrency": "USD", "toCurrency": "EUR"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));

    // The router keeps serving after a panic
    let (status, _) = send(&app, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn test_convert_unknown_target_currency() {
    // Unknown targets are not cached, so both attempts reach the provider
    let mock_server =
        test_utils::create_mock_server("USD", test_utils::ok(test_utils::USD_RATES), 2).await;
    let app = app_for(&mock_server.uri());

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            convert_request(r#"{"amount": 10, "fromCurrency": "USD", "toCurrency": "XXX"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid currency code" }));
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_provider_failure_is_generic_500() {
    let mock_server =
        test_utils::create_mock_server("USD", wiremock::ResponseTemplate::new(503), 1).await;
    let app = app_for(&mock_server.uri());

    let (status, body) = send(
        &app,
        convert_request(r#"{"amount": 10, "fromCurrency": "USD", "toCurrency": "EUR"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[test_log::test(tokio::test)]
async fn test_rates_for_base_currency() {
    let mock_server =
        test_utils::create_mock_server("USD", test_utils::ok(test_utils::USD_RATES), 1).await;
    let app = app_for(&mock_server.uri());

    let (status, body) = send(&app, get_request("/api/currency/rates/USD")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "baseCurrency": "USD",
            "rates": { "USD": 1.0, "EUR": 0.92, "GBP": 0.79, "INR": 85.7 }
        })
    );

    let (status, cached) = send(&app, get_request("/api/currency/rates/USD")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached, body);
}

#[test_log::test(tokio::test)]
async fn test_rates_malformed_provider_response() {
    let mock_server =
        test_utils::create_mock_server("XXX", test_utils::ok(r#"{"error": "unknown"}"#), 1).await;
    let app = app_for(&mock_server.uri());

    let (status, body) = send(&app, get_request("/api/currency/rates/XXX")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[test_log::test(tokio::test)]
async fn test_unknown_route() {
    let mock_server = test_utils::create_mock_server("USD", test_utils::ok("{}"), 0).await;
    let app = app_for(&mock_server.uri());

    let (status, _) = send(&app, get_request("/api/currency/history")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
