use std::sync::Arc;

use ride_dispatch::api;
use ride_dispatch::config::Config;
use ride_dispatch::engine::fleet::FleetRegistry;
use ride_dispatch::error::AppError;
use ride_dispatch::observability::logging;
use ride_dispatch::state::AppState;
use ride_dispatch::store::MemoryRideStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    logging::init(&config.log_level, config.log_format)?;

    let fleet = match &config.fleet_path {
        Some(path) => FleetRegistry::from_file(path)?,
        None => FleetRegistry::default(),
    };
    tracing::info!(fleet_size = fleet.len(), "fleet loaded");

    let store = Arc::new(MemoryRideStore::new());
    let shared_state = Arc::new(AppState::new(&config, fleet, store)?);

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    // The router's clones are gone once serve returns; this drops the last
    // handle on the dispatcher and its store.
    drop(shared_state);
    tracing::info!("ride store released, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
