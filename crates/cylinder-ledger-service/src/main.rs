//! Cylinder Ledger Service - HTTP API for gas cylinder sales and returns
//!
//! This is the main entry point for the cylinder ledger service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cylinder_ledger_service::{create_router, AppState, ServiceConfig};
use cylinder_ledger_store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cylinder_ledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cylinder Ledger Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        gases = config.gas_catalog.len(),
        max_batch_cylinders = config.max_batch_cylinders,
        history_limit = config.history_limit,
        "Service configuration loaded"
    );

    let store = open_store(&config)?;
    tracing::info!(events = store.event_count()?, "Ledger loaded");

    // Build app state
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "rocksdb-backend")]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = cylinder_ledger_store::RocksStore::open(&config.data_dir)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    tracing::warn!(
        data_dir = %config.data_dir,
        "Built without rocksdb-backend: using in-memory store, data will not be persisted"
    );
    Ok(Arc::new(cylinder_ledger_store::MemoryStore::new()))
}
