//! High-resolution imagery provider reading (STAC search results)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DataOrigin;

/// Predicted crop for the imaged field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropPrediction {
    pub crop: String,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
}

/// Topsoil properties for the imaged field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilProperties {
    pub ph: f64,
    pub organic_matter_percent: f64,
    pub clay_percent: f64,
    pub sand_percent: f64,
}

/// The STAC item a reading was derived from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneInfo {
    pub item_id: String,
    pub collection: String,
    pub acquired_at: DateTime<Utc>,
    /// Cloud cover percentage in [0, 100]
    pub cloud_cover: f64,
}

/// Normalized reading from the high-resolution imagery provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageryReading {
    /// NDVI in [-1, 1]
    pub ndvi: f64,
    /// Spatial resolution label, e.g. "10m"
    pub resolution: String,
    pub crop_type: Option<CropPrediction>,
    pub soil_properties: Option<SoilProperties>,
    /// Data quality score in [0, 100]
    pub data_quality: f64,
    pub scene: Option<SceneInfo>,
    pub origin: DataOrigin,
}

impl ImageryReading {
    pub fn is_simulated(&self) -> bool {
        self.origin == DataOrigin::Simulated
    }

    /// Confidence of the crop prediction, zero when there is none
    pub fn crop_confidence(&self) -> f64 {
        self.crop_type.as_ref().map_or(0.0, |c| c.confidence)
    }
}
