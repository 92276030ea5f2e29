//! Route definitions for the TerraAI data service

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/agriculture", agriculture_routes())
        .route("/datasets", get(handlers::list_datasets))
        // Manual cache busting
        .route("/cache", delete(handlers::clear_cache))
}

/// Agricultural data routes
fn agriculture_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_agricultural_data))
        .route("/satellite", get(handlers::get_satellite_reading))
        .route("/imagery", get(handlers::get_imagery_reading))
        .route("/fuse", post(handlers::fuse_readings))
}
