//! TerraAI agricultural data service
//!
//! Fetches satellite and high-resolution imagery data for farm locations,
//! caches provider responses, fuses both sources into one reading and derives
//! farming recommendations for the Farm Navigators game UI.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use cache::ResponseCache;
pub use config::Config;
pub use error::{AppError, AppResult, ProviderError};
pub use services::AgriculturalDataService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<ResponseCache>,
    pub agriculture: AgriculturalDataService,
}

impl AppState {
    /// Build the cache once and hand it to both provider clients
    pub fn from_config(config: Config) -> Self {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(config.cache.ttl_secs)));
        let agriculture = AgriculturalDataService::from_config(&config, Arc::clone(&cache));

        Self {
            config: Arc::new(config),
            cache,
            agriculture,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "TerraAI Agricultural Data API v1.0"
}
