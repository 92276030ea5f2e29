//! Configuration management for the TerraAI data service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TERRA_ prefix

use std::net::{IpAddr, SocketAddr};

use config::{Environment, File};
use serde::Deserialize;
use shared::{validate_buffer_km, WeightPolicy};

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Satellite data provider (NASA proxy)
    pub satellite: SatelliteConfig,

    /// High-resolution imagery provider (STAC API)
    pub imagery: ImageryConfig,

    /// Response cache configuration
    pub cache: CacheConfig,

    /// Behavior shared by both providers
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SatelliteConfig {
    /// Base URL of the satellite data API
    pub base_url: String,

    /// API key sent as the `api_key` query parameter
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageryConfig {
    /// STAC API root; searches go to `{base_url}/search`
    pub base_url: String,

    /// Maximum acceptable scene cloud cover in percent
    pub max_cloud_cover: f64,

    /// Default search radius around the requested point
    pub buffer_km: f64,

    /// Maximum number of features requested per search
    pub search_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Freshness window for cached provider responses
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    /// Upper bound for a single provider call before falling back
    pub request_timeout_secs: u64,

    /// Base seed for simulated fallback readings
    pub fallback_seed: u64,

    /// Fusion weight policy when a source is simulated
    pub weight_policy: WeightPolicy,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let environment =
            std::env::var("TERRA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("satellite.base_url", "https://api.nasa-farm-data.org/v1")?
            .set_default("satellite.api_key", "DEMO_KEY")?
            .set_default(
                "imagery.base_url",
                "https://planetarycomputer.microsoft.com/api/stac/v1",
            )?
            .set_default("imagery.max_cloud_cover", 20.0)?
            .set_default("imagery.buffer_km", 1.0)?
            .set_default("imagery.search_limit", 10)?
            .set_default("cache.ttl_secs", 1800)?
            .set_default("providers.request_timeout_secs", 8)?
            .set_default("providers.fallback_seed", 42)?
            .set_default("providers.weight_policy", "fixed")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TERRA_ prefix)
            .add_source(
                Environment::with_prefix("TERRA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server or providers cannot run with
    pub fn validate(&self) -> AppResult<()> {
        validate_buffer_km(self.imagery.buffer_km)
            .map_err(|e| AppError::Configuration(format!("imagery.{}", e)))?;

        if !(0.0..=100.0).contains(&self.imagery.max_cloud_cover) {
            return Err(AppError::Configuration(format!(
                "imagery.max_cloud_cover must be between 0 and 100, got {}",
                self.imagery.max_cloud_cover
            )));
        }

        if self.providers.request_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "providers.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        self.socket_addr().map(|_| ())
    }

    /// Address the server binds to
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let host: IpAddr = self.server.host.parse().map_err(|_| {
            AppError::Configuration(format!(
                "server.host must be an IP address, got {}",
                self.server.host
            ))
        })?;
        Ok(SocketAddr::from((host, self.server.port)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            satellite: SatelliteConfig {
                base_url: "https://api.nasa-farm-data.org/v1".to_string(),
                api_key: "DEMO_KEY".to_string(),
            },
            imagery: ImageryConfig {
                base_url: "https://planetarycomputer.microsoft.com/api/stac/v1".to_string(),
                max_cloud_cover: 20.0,
                buffer_km: 1.0,
                search_limit: 10,
            },
            cache: CacheConfig { ttl_secs: 1800 },
            providers: ProvidersConfig {
                request_timeout_secs: 8,
                fallback_seed: 42,
                weight_policy: WeightPolicy::Fixed,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
