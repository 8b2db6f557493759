//! HTTP surface of the service.

pub mod currency;
pub mod error;
pub mod health;
pub mod routes;

pub use error::{ApiError, ApiResult};

use crate::conversion::{ConversionEngine, RateCache};
use crate::core::cache::Cache;
use anyhow::{Context, Result};
use axum::Router;
use axum::response::IntoResponse;
use routes::ServerRoutes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversionEngine>,
}

impl AppState {
    pub fn new(engine: ConversionEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Builds the application router with its middleware.
pub fn router(state: AppState) -> Router {
    ServerRoutes::create()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Catch panics in handlers and convert them to 500 errors
                .layer(CatchPanicLayer::custom(|err| {
                    ApiError::from_panic(err).into_response()
                })),
        )
        .with_state(state)
}

pub struct CurrencyServer {
    state: AppState,
    addr: SocketAddr,
    sweep_interval: Option<Duration>,
}

impl CurrencyServer {
    pub fn new(state: AppState, addr: SocketAddr, sweep_interval: Option<Duration>) -> Self {
        CurrencyServer {
            state,
            addr,
            sweep_interval,
        }
    }

    pub async fn run(self) -> Result<()> {
        let sweeper = self
            .sweep_interval
            .map(|every| spawn_cache_sweeper(Arc::clone(self.state.engine.cache()), every));

        let app = router(self.state);

        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind to address {}", self.addr))?;

        info!("Currency Service running on port {}", self.addr.port());
        info!("listen at: http://{}", self.addr);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error");

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        info!("Currency Service stopped");
        result
    }
}

/// Periodically drops expired entries so the cache does not hold on to
/// pairs nobody asks for again.
fn spawn_cache_sweeper(cache: Arc<RateCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired().await;
            let remaining = cache.len().await;
            debug!(purged, remaining, "Swept rate cache");
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
