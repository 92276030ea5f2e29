//! STAC imagery search client
//!
//! Searches a STAC API (Microsoft Planetary Computer by default) for recent,
//! low-cloud scenes around a point and turns the best scene's metadata into an
//! `ImageryReading`. Collections are tried in catalog priority order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{
    datasets_for, normalize_ndvi, normalize_percent, BoundingBox, DataOrigin, DatasetDescriptor,
    DateRange, GpsCoordinates, ImageryReading, ProviderKind, SceneInfo,
};

use crate::cache::{cache_key, ResponseCache};
use crate::error::ProviderError;
use crate::external::FallbackGenerator;

/// Cache namespace for imagery readings
pub const IMAGERY_CACHE_NAMESPACE: &str = "imagery";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

// Typical NDVI of each land-cover class, used to estimate scene NDVI from the
// scene classification percentages.
const VEGETATION_NDVI: f64 = 0.8;
const BARE_SOIL_NDVI: f64 = 0.15;
const WATER_NDVI: f64 = -0.3;

/// STAC search client
#[derive(Clone)]
pub struct StacClient {
    client: Client,
    base_url: String,
    cache: Arc<ResponseCache>,
    fallback: FallbackGenerator,
    timeout: Duration,
    max_cloud_cover: f64,
    search_limit: u32,
}

/// Body of `POST {base}/search`
#[derive(Debug, Serialize)]
struct StacSearchRequest<'a> {
    collections: Vec<&'a str>,
    bbox: [f64; 4],
    datetime: String,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sortby: Option<Vec<StacSortBy>>,
}

#[derive(Debug, Serialize)]
struct StacSortBy {
    field: &'static str,
    direction: &'static str,
}

/// GeoJSON FeatureCollection returned by the search
#[derive(Debug, Deserialize)]
struct StacFeatureCollection {
    features: Vec<StacFeature>,
}

#[derive(Debug, Deserialize)]
struct StacFeature {
    id: String,
    collection: Option<String>,
    properties: StacProperties,
    #[serde(default)]
    assets: HashMap<String, StacAsset>,
}

#[derive(Debug, Deserialize)]
struct StacProperties {
    datetime: Option<DateTime<Utc>>,
    #[serde(rename = "eo:cloud_cover")]
    cloud_cover: Option<f64>,
    gsd: Option<f64>,
    #[serde(rename = "s2:vegetation_percentage")]
    vegetation_percentage: Option<f64>,
    #[serde(rename = "s2:not_vegetated_percentage")]
    not_vegetated_percentage: Option<f64>,
    #[serde(rename = "s2:water_percentage")]
    water_percentage: Option<f64>,
    /// Precomputed scene NDVI published by some catalogs
    #[serde(rename = "ndvi:mean", alias = "ndvi")]
    ndvi_mean: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StacAsset {
    #[serde(default)]
    roles: Vec<String>,
}

impl StacFeature {
    fn has_data_assets(&self) -> bool {
        self.assets.is_empty() || self.assets.values().any(|a| a.roles.iter().any(|r| r == "data"))
    }
}

impl StacClient {
    /// Create a new StacClient sharing the given cache
    pub fn new(base_url: String, cache: Arc<ResponseCache>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            fallback: FallbackGenerator::default(),
            timeout: DEFAULT_TIMEOUT,
            max_cloud_cover: 20.0,
            search_limit: 10,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackGenerator) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search_limits(mut self, max_cloud_cover: f64, search_limit: u32) -> Self {
        self.max_cloud_cover = max_cloud_cover;
        self.search_limit = search_limit.max(1);
        self
    }

    /// Search for the most recent low-cloud scene around a point.
    ///
    /// Never fails: errors and empty searches yield a simulated reading seeded
    /// by the coordinates.
    pub async fn search_high_res_imagery(
        &self,
        location: GpsCoordinates,
        buffer_km: f64,
        date_range: Option<DateRange>,
    ) -> ImageryReading {
        let namespace = format!("{}:{}km", IMAGERY_CACHE_NAMESPACE, buffer_km);
        let key = cache_key(&namespace, location, date_range.as_ref());

        if let Some(cached) = self.cache.get_json::<ImageryReading>(&key).await {
            tracing::debug!(%key, "Imagery cache hit");
            return cached;
        }

        let bbox = location.bbox(buffer_km);
        let range = date_range.unwrap_or_default();

        let result = tokio::time::timeout(self.timeout, self.search_collections(bbox, range))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout.as_secs()))
            .and_then(|r| r);

        match result {
            Ok(reading) => {
                self.cache.set_json(key, &reading).await;
                reading
            }
            Err(e) => {
                tracing::warn!(
                    longitude = location.longitude,
                    latitude = location.latitude,
                    error = %e,
                    "Imagery search failed, using simulated reading"
                );
                let resolution = datasets_for(ProviderKind::Imagery)
                    .first()
                    .map_or("10m", |d| d.resolution);
                self.fallback.imagery_reading(location, resolution)
            }
        }
    }

    /// Try each imagery collection in priority order until one yields a scene
    async fn search_collections(
        &self,
        bbox: BoundingBox,
        range: DateRange,
    ) -> Result<ImageryReading, ProviderError> {
        for dataset in datasets_for(ProviderKind::Imagery) {
            match self.search(dataset, bbox, range).await {
                Ok(reading) => return Ok(reading),
                Err(ProviderError::NoScene) => {
                    tracing::debug!(collection = dataset.id, "No usable scene, trying next collection");
                }
                Err(e) => return Err(e),
            }
        }
        Err(ProviderError::NoScene)
    }

    async fn search(
        &self,
        dataset: &DatasetDescriptor,
        bbox: BoundingBox,
        range: DateRange,
    ) -> Result<ImageryReading, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let body = StacSearchRequest {
            collections: vec![dataset.id],
            bbox: bbox.to_array(),
            datetime: range.to_stac_interval(),
            limit: self.search_limit,
            query: Some(json!({ "eo:cloud_cover": { "lt": self.max_cloud_cover } })),
            sortby: Some(vec![StacSortBy {
                field: "datetime",
                direction: "desc",
            }]),
        };

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let text = response.text().await?;
        let collection: StacFeatureCollection = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Malformed(format!("STAC search response: {}", e)))?;

        select_scene(collection.features, self.max_cloud_cover)
            .and_then(|feature| convert_feature(feature, dataset))
            .ok_or(ProviderError::NoScene)
    }
}

/// Most recent feature within the cloud limit; ties go to the clearer scene
fn select_scene(features: Vec<StacFeature>, max_cloud_cover: f64) -> Option<StacFeature> {
    features
        .into_iter()
        .filter(|f| f.properties.datetime.is_some())
        .filter(|f| f.properties.cloud_cover.is_some_and(|c| c <= max_cloud_cover))
        .filter(|f| scene_ndvi(&f.properties).is_some())
        .filter(StacFeature::has_data_assets)
        .max_by(|a, b| {
            a.properties
                .datetime
                .cmp(&b.properties.datetime)
                .then_with(|| {
                    let ca = a.properties.cloud_cover.unwrap_or(100.0);
                    let cb = b.properties.cloud_cover.unwrap_or(100.0);
                    cb.total_cmp(&ca)
                })
        })
}

/// Scene NDVI: the published mean when present, otherwise estimated from the
/// vegetation / bare soil / water split of the scene classification
fn scene_ndvi(properties: &StacProperties) -> Option<f64> {
    if let Some(ndvi) = properties.ndvi_mean.and_then(normalize_ndvi) {
        return Some(ndvi);
    }

    let vegetation = properties.vegetation_percentage?.max(0.0);
    let bare = properties.not_vegetated_percentage.unwrap_or(0.0).max(0.0);
    let water = properties.water_percentage.unwrap_or(0.0).max(0.0);
    let total = vegetation + bare + water;
    if total <= 0.0 {
        return None;
    }

    let estimate =
        (vegetation * VEGETATION_NDVI + bare * BARE_SOIL_NDVI + water * WATER_NDVI) / total;
    normalize_ndvi(estimate)
}

fn convert_feature(feature: StacFeature, dataset: &DatasetDescriptor) -> Option<ImageryReading> {
    let ndvi = scene_ndvi(&feature.properties)?;
    let cloud_cover = normalize_percent(feature.properties.cloud_cover?)?;
    let acquired_at = feature.properties.datetime?;

    let resolution = feature
        .properties
        .gsd
        .filter(|g| g.is_finite() && *g > 0.0)
        .map_or_else(|| dataset.resolution.to_string(), |g| format!("{}m", g));

    Some(ImageryReading {
        ndvi: (ndvi * 1000.0).round() / 1000.0,
        resolution,
        crop_type: None,
        soil_properties: None,
        data_quality: 100.0 - cloud_cover,
        scene: Some(SceneInfo {
            item_id: feature.id,
            collection: feature.collection.unwrap_or_else(|| dataset.id.to_string()),
            acquired_at,
            cloud_cover,
        }),
        origin: DataOrigin::Observed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::find_dataset;

    fn features(json: serde_json::Value) -> Vec<StacFeature> {
        serde_json::from_value::<StacFeatureCollection>(json).unwrap().features
    }

    fn sample() -> Vec<StacFeature> {
        features(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "id": "S2A_old",
                    "collection": "sentinel-2-l2a",
                    "properties": {
                        "datetime": "2024-06-01T10:00:00Z",
                        "eo:cloud_cover": 2.0,
                        "s2:vegetation_percentage": 60.0,
                        "s2:not_vegetated_percentage": 40.0
                    },
                    "assets": {"B04": {"roles": ["data"]}}
                },
                {
                    "id": "S2B_cloudy",
                    "collection": "sentinel-2-l2a",
                    "properties": {
                        "datetime": "2024-06-10T10:00:00Z",
                        "eo:cloud_cover": 75.0,
                        "s2:vegetation_percentage": 20.0
                    }
                },
                {
                    "id": "S2B_recent",
                    "collection": "sentinel-2-l2a",
                    "properties": {
                        "datetime": "2024-06-06T10:00:00Z",
                        "eo:cloud_cover": 12.5,
                        "gsd": 10,
                        "s2:vegetation_percentage": 100.0
                    }
                }
            ]
        }))
    }

    #[test]
    fn test_selects_most_recent_low_cloud_scene() {
        let scene = select_scene(sample(), 20.0).unwrap();
        assert_eq!(scene.id, "S2B_recent");
    }

    #[test]
    fn test_no_scene_under_cloud_limit() {
        assert!(select_scene(sample(), 1.0).is_none());
    }

    #[test]
    fn test_ndvi_estimated_from_land_cover() {
        let scene = select_scene(sample(), 5.0).unwrap();
        // 0.6 * 0.8 + 0.4 * 0.15
        let ndvi = scene_ndvi(&scene.properties).unwrap();
        assert!((ndvi - 0.54).abs() < 1e-9);
    }

    #[test]
    fn test_convert_feature() {
        let scene = select_scene(sample(), 20.0).unwrap();
        let dataset = find_dataset("sentinel-2-l2a").unwrap();
        let reading = convert_feature(scene, dataset).unwrap();

        assert_eq!(reading.ndvi, 0.8);
        assert_eq!(reading.resolution, "10m");
        assert_eq!(reading.data_quality, 87.5);
        assert_eq!(reading.origin, DataOrigin::Observed);
        assert_eq!(reading.scene.unwrap().item_id, "S2B_recent");
    }

    #[test]
    fn test_search_body_shape() {
        let body = StacSearchRequest {
            collections: vec!["sentinel-2-l2a"],
            bbox: [-1.0, -1.0, 1.0, 1.0],
            datetime: "2024-06-01T00:00:00Z/2024-06-30T23:59:59Z".to_string(),
            limit: 5,
            query: Some(json!({"eo:cloud_cover": {"lt": 20.0}})),
            sortby: Some(vec![StacSortBy {
                field: "datetime",
                direction: "desc",
            }]),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["collections"][0], "sentinel-2-l2a");
        assert_eq!(value["bbox"].as_array().unwrap().len(), 4);
        assert_eq!(value["sortby"][0]["direction"], "desc");
        assert_eq!(value["query"]["eo:cloud_cover"]["lt"], 20.0);
    }
}
