use std::process::ExitCode;
use std::sync::Arc;

use chrono::DateTime;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use arrivals_server::cache::{
    BackgroundRefresher, ExpirationController, RefreshEngine, Snapshot, SnapshotStore,
};
use arrivals_server::config::{AppConfig, ConfigError};
use arrivals_server::feeds::{FeedClient, FeedClientConfig, FeedError, GtfsRealtimeDecoder};
use arrivals_server::query::QueryService;
use arrivals_server::stations::{CatalogError, StationCatalog};
use arrivals_server::web::{AppState, create_router};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("station topology: {0}")]
    Catalog(#[from] CatalogError),

    #[error("feed client: {0}")]
    Feed(#[from] FeedError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

/// `LOG_LEVEL` wins over `RUST_LOG`; both default to `info`.
fn init_tracing() {
    let filter = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    let catalog = Arc::new(StationCatalog::load(&config.stations_file)?);

    let client = FeedClient::new(
        FeedClientConfig::new(&config.api_key).with_timeout(config.feed_timeout.as_secs()),
    )?;

    let store = SnapshotStore::new(Snapshot::empty(Arc::clone(&catalog), DateTime::UNIX_EPOCH));
    let engine = Arc::new(RefreshEngine::new(
        catalog,
        Arc::new(client),
        Arc::new(GtfsRealtimeDecoder),
        store.clone(),
        config.refresh.clone(),
    ));

    // Serve real data from the first request on
    engine.refresh().await;

    let refresher = config.cache.background.then(|| {
        let refresher = Arc::new(BackgroundRefresher::new(
            Arc::clone(&engine),
            config.cache.refresh_period,
        ));
        refresher.start();
        refresher
    });

    let expiry = ExpirationController::new(engine, refresher, config.cache.ttl);
    let state = AppState::new(QueryService::new(store, expiry));
    let app = create_router(state, &config.web_root);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        web_root = %config.web_root,
        background = config.cache.background,
        max_trains = config.refresh.max_arrivals,
        max_minutes = config.refresh.max_minutes,
        "arrivals server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
