pub mod conversion;
pub mod core;
pub mod providers;
pub mod server;
pub mod setup;
pub mod store;

use crate::conversion::{CachedRates, ConversionEngine};
use crate::core::config::AppConfig;
use crate::providers::ExchangeRateApiProvider;
use crate::server::{AppState, CurrencyServer};
use crate::store::MemoryCache;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info};

/// Wires the provider client, rate cache and conversion engine from `config`.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let provider = ExchangeRateApiProvider::from_config(&config.provider)?;
    let cache = MemoryCache::<String, CachedRates>::with_ttl(config.cache.ttl());
    info!(ttl_secs = cache.ttl().as_secs(), "Rate cache ready");
    let engine = ConversionEngine::new(Arc::new(provider), Arc::new(cache));
    Ok(AppState::new(engine))
}

pub async fn serve(config: AppConfig) -> Result<()> {
    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host: {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = build_state(&config)?;
    info!(
        provider = %config.provider.base_url,
        "Currency Service starting..."
    );

    CurrencyServer::new(state, addr, config.cache.sweep_interval())
        .run()
        .await
}

pub async fn run(config_path: Option<&str>, port: Option<u16>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    let mut config = config.with_env_overrides()?;
    if let Some(port) = port {
        config.server.port = port;
    }
    debug!("Loaded config: {config:#?}");

    serve(config).await
}
