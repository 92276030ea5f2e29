//! Agricultural data service
//!
//! Entry point used by the UI: validates the requested point, queries both
//! providers concurrently, fuses the results and attaches recommendations.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{
    datasets_for, find_dataset, fuse, validate_buffer_km, validate_coordinates,
    validate_imagery_reading, validate_satellite_reading, AgriculturalReading, DateRange,
    FusedReading, ImageryReading, ProviderKind, ReadingMetadata, SatelliteReading, WeightPolicy,
    GPM_PRECIPITATION, MODIS_LST, MODIS_NDVI, SMAP_SOIL_MOISTURE,
};
use uuid::Uuid;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::{FallbackGenerator, SatelliteClient, StacClient};

/// Default imagery search radius
pub const DEFAULT_BUFFER_KM: f64 = 1.0;

/// Service combining both providers into one agricultural reading
#[derive(Clone)]
pub struct AgriculturalDataService {
    satellite: SatelliteClient,
    imagery: StacClient,
    policy: WeightPolicy,
    buffer_km: f64,
}

impl AgriculturalDataService {
    pub fn new(satellite: SatelliteClient, imagery: StacClient) -> Self {
        Self {
            satellite,
            imagery,
            policy: WeightPolicy::default(),
            buffer_km: DEFAULT_BUFFER_KM,
        }
    }

    /// Build both provider clients from configuration around a shared cache
    pub fn from_config(config: &Config, cache: Arc<ResponseCache>) -> Self {
        let timeout = Duration::from_secs(config.providers.request_timeout_secs);
        let fallback = FallbackGenerator::new(config.providers.fallback_seed);

        let satellite = SatelliteClient::new(
            config.satellite.base_url.clone(),
            config.satellite.api_key.clone(),
            Arc::clone(&cache),
        )
        .with_fallback(fallback)
        .with_timeout(timeout);

        let imagery = StacClient::new(config.imagery.base_url.clone(), cache)
            .with_fallback(fallback)
            .with_timeout(timeout)
            .with_search_limits(config.imagery.max_cloud_cover, config.imagery.search_limit);

        Self::new(satellite, imagery)
            .with_weight_policy(config.providers.weight_policy)
            .with_buffer_km(config.imagery.buffer_km)
    }

    pub fn with_weight_policy(mut self, policy: WeightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_buffer_km(mut self, buffer_km: f64) -> Self {
        if validate_buffer_km(buffer_km).is_ok() {
            self.buffer_km = buffer_km;
        } else {
            tracing::warn!(buffer_km, "Ignoring invalid imagery buffer, keeping default");
        }
        self
    }

    pub fn weight_policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Fetch, fuse and annotate data for a point.
    ///
    /// Only invalid coordinates are an error. Provider failures show up as
    /// simulated sources and in the confidence level instead.
    pub async fn fetch_enhanced_agricultural_data(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> AppResult<AgriculturalReading> {
        let location =
            validate_coordinates(longitude, latitude).map_err(AppError::invalid_coordinates)?;

        let (satellite, imagery) = tokio::join!(
            self.satellite.fetch_satellite_reading(location, None),
            self.imagery
                .search_high_res_imagery(location, self.buffer_km, None),
        );

        let fused = fuse(&satellite, &imagery, self.policy);
        let metadata = build_metadata(&satellite, &imagery);

        tracing::info!(
            longitude,
            latitude,
            combined_ndvi = fused.combined_ndvi,
            confidence = fused.confidence_level,
            satellite_simulated = satellite.is_simulated(),
            imagery_simulated = imagery.is_simulated(),
            "Fused agricultural reading"
        );

        Ok(AgriculturalReading {
            id: Uuid::new_v4(),
            location,
            satellite,
            imagery,
            fused,
            metadata,
        })
    }

    /// Satellite reading alone
    pub async fn fetch_satellite_reading(
        &self,
        longitude: f64,
        latitude: f64,
        date_range: Option<DateRange>,
    ) -> AppResult<SatelliteReading> {
        let location =
            validate_coordinates(longitude, latitude).map_err(AppError::invalid_coordinates)?;
        Ok(self
            .satellite
            .fetch_satellite_reading(location, date_range)
            .await)
    }

    /// Imagery reading alone, with an optional custom search radius
    pub async fn search_high_res_imagery(
        &self,
        longitude: f64,
        latitude: f64,
        buffer_km: Option<f64>,
        date_range: Option<DateRange>,
    ) -> AppResult<ImageryReading> {
        let location =
            validate_coordinates(longitude, latitude).map_err(AppError::invalid_coordinates)?;
        let buffer_km = buffer_km.unwrap_or(self.buffer_km);
        validate_buffer_km(buffer_km)?;

        Ok(self
            .imagery
            .search_high_res_imagery(location, buffer_km, date_range)
            .await)
    }

    /// Re-fuse readings supplied by the caller
    pub fn fuse_readings(
        &self,
        satellite: &SatelliteReading,
        imagery: &ImageryReading,
        policy: Option<WeightPolicy>,
    ) -> AppResult<FusedReading> {
        validate_satellite_reading(satellite)?;
        validate_imagery_reading(imagery)?;
        Ok(fuse(satellite, imagery, policy.unwrap_or(self.policy)))
    }
}

/// Describe where the reading came from
fn build_metadata(satellite: &SatelliteReading, imagery: &ImageryReading) -> ReadingMetadata {
    let mut sources = Vec::new();
    let label = |id: &str, simulated: bool| {
        if simulated {
            format!("{}:simulated", id)
        } else {
            id.to_string()
        }
    };

    let satellite_fields = [
        (satellite.soil_moisture, SMAP_SOIL_MOISTURE),
        (satellite.ndvi, MODIS_NDVI),
        (satellite.precipitation_mm, GPM_PRECIPITATION),
        (satellite.temperature_celsius, MODIS_LST),
    ];
    for (value, id) in satellite_fields {
        if value.is_some() {
            sources.push(label(id, satellite.is_simulated()));
        }
    }

    let imagery_dataset = imagery
        .scene
        .as_ref()
        .and_then(|s| find_dataset(&s.collection))
        .or_else(|| datasets_for(ProviderKind::Imagery).first().copied());

    if let Some(dataset) = imagery_dataset {
        sources.push(label(dataset.id, imagery.is_simulated()));
    }

    ReadingMetadata {
        timestamp: Utc::now(),
        spatial_resolution: imagery.resolution.clone(),
        update_frequency: imagery_dataset
            .map_or_else(|| "daily".to_string(), |d| d.update_frequency.to_string()),
        sources,
    }
}
