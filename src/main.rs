//! Metasearch-RS: a concurrent metasearch aggregator
//!
//! This is the main entry point for the application.

use anyhow::Result;
use metasearch_rs::{
    config,
    engines::EngineLoader,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    info!("Starting Metasearch-RS v{}", metasearch_rs::VERSION);

    let settings = config::load()?;
    if settings.general.debug && std::env::var(EnvFilter::DEFAULT_ENV).is_err() {
        filter_handle.modify(|filter| *filter = EnvFilter::new("debug"))?;
        info!("Debug logging enabled");
    }

    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let registry = EngineLoader::load(&settings, client);

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    let app = create_router(AppState::new(settings, registry));

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
