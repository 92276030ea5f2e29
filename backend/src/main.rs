//! TerraAI Farm Navigators - Agricultural Data Server
//!
//! Serves fused satellite and imagery readings to the farming game UI.

use terra_backend::{create_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "terra_server=debug,terra_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting TerraAI Agricultural Data Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        satellite = %config.satellite.base_url,
        imagery = %config.imagery.base_url,
        cache_ttl_secs = config.cache.ttl_secs,
        weight_policy = ?config.providers.weight_policy,
        "Provider configuration"
    );

    let addr = config.socket_addr()?;

    // Create application state
    let state = AppState::from_config(config);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
