//! HTTP handlers for agricultural data endpoints

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{
    dataset_catalog, AgriculturalReading, DatasetDescriptor, DateRange, FusedReading,
    ImageryReading, SatelliteReading, WeightPolicy,
};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

/// Query parameters for a point
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub longitude: f64,
    pub latitude: f64,
}

/// Query parameters for provider-specific lookups
#[derive(Debug, Deserialize)]
pub struct ProviderQuery {
    pub longitude: f64,
    pub latitude: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub buffer_km: Option<f64>,
}

impl ProviderQuery {
    fn date_range(&self) -> AppResult<Option<DateRange>> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end))),
            (None, None) => Ok(None),
            _ => Err(AppError::Validation {
                field: "start_date".to_string(),
                message: "start_date and end_date must be given together".to_string(),
            }),
        }
    }
}

/// Get the fused agricultural reading for a point
pub async fn get_agricultural_data(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> AppResult<Json<AgriculturalReading>> {
    let reading = state
        .agriculture
        .fetch_enhanced_agricultural_data(query.longitude, query.latitude)
        .await?;
    Ok(Json(reading))
}

/// Get the satellite provider reading for a point
pub async fn get_satellite_reading(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProviderQuery>,
) -> AppResult<Json<SatelliteReading>> {
    let range = query.date_range()?;
    let reading = state
        .agriculture
        .fetch_satellite_reading(query.longitude, query.latitude, range)
        .await?;
    Ok(Json(reading))
}

/// Get the high-resolution imagery reading for a point
pub async fn get_imagery_reading(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProviderQuery>,
) -> AppResult<Json<ImageryReading>> {
    let range = query.date_range()?;
    let reading = state
        .agriculture
        .search_high_res_imagery(query.longitude, query.latitude, query.buffer_km, range)
        .await?;
    Ok(Json(reading))
}

/// Readings to re-fuse
#[derive(Debug, Deserialize)]
pub struct FuseRequest {
    pub satellite: SatelliteReading,
    pub imagery: ImageryReading,
    pub policy: Option<WeightPolicy>,
}

/// Fuse readings supplied by the caller
pub async fn fuse_readings(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FuseRequest>,
) -> AppResult<Json<FusedReading>> {
    let fused = state
        .agriculture
        .fuse_readings(&input.satellite, &input.imagery, input.policy)?;
    Ok(Json(fused))
}

/// List the dataset catalog
pub async fn list_datasets() -> Json<&'static [DatasetDescriptor]> {
    Json(dataset_catalog())
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}

/// Drop every cached provider response
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cleared = state.cache.clear().await;
    tracing::info!(cleared, "Response cache cleared");
    Json(ClearCacheResponse { cleared })
}
