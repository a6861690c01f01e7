//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{cylinders, health, reports};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for sell/return endpoints.
const WRITE_MAX_CONCURRENT_REQUESTS: usize = 32;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Cylinders
/// - `GET /v1/gases` - Configured gas catalog
/// - `GET /v1/active?gas=` - Active cylinder codes of a gas
/// - `GET /v1/holder?gas=&code=` - Holder of an active cylinder
/// - `POST /v1/sell` - Sell a batch of cylinders
/// - `POST /v1/return` - Return a cylinder
///
/// ## Reports
/// - `GET /v1/counts` - Active counts per gas
/// - `GET /v1/active-customers?gas=` - Holders of a gas's active cylinders
/// - `GET /v1/search?q=` - Person search over active holders and the ledger
/// - `GET /v1/history?year=&month=&limit=` - Ledger dump, newest first
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let write_routes = Router::new()
        .route("/sell", post(cylinders::sell))
        .route("/return", post(cylinders::return_cylinder))
        .layer(ConcurrencyLimitLayer::new(WRITE_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Cylinders
        .route("/gases", get(cylinders::list_gases))
        .route("/active", get(cylinders::active_codes))
        .route("/holder", get(cylinders::holder))
        // Reports
        .route("/counts", get(reports::counts))
        .route("/active-customers", get(reports::active_customers))
        .route("/search", get(reports::search))
        .route("/history", get(reports::history))
        .merge(write_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
