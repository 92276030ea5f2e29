//! WebAssembly module for the TerraAI Farm Navigators UI
//!
//! Provides client-side computation for:
//! - Re-fusing provider readings with a chosen weight policy
//! - Recommendation text for a reading
//! - Coordinate validation and search bounding boxes for the map picker

use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::fusion::*;
pub use shared::insights::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

#[derive(Deserialize)]
struct FuseInput {
    satellite: SatelliteReading,
    imagery: ImageryReading,
    #[serde(default)]
    policy: WeightPolicy,
}

/// Fuse `{satellite, imagery, policy?}` JSON into a fused reading JSON
#[wasm_bindgen]
pub fn fuse_readings(input_json: &str) -> Result<String, JsValue> {
    let input: FuseInput = serde_json::from_str(input_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid readings JSON: {}", e)))?;

    validate_satellite_reading(&input.satellite)
        .and_then(|_| validate_imagery_reading(&input.imagery))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let fused = fuse(&input.satellite, &input.imagery, input.policy);
    serde_json::to_string(&fused).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Weighted NDVI with the fixed 0.6 / 0.4 source weights
#[wasm_bindgen]
pub fn combine_ndvi(satellite_ndvi: f64, imagery_ndvi: f64) -> f64 {
    combined_ndvi(satellite_ndvi, imagery_ndvi)
}

/// Recommendations for a full agricultural reading JSON, as a JSON array
#[wasm_bindgen]
pub fn recommendations_for(reading_json: &str) -> Result<String, JsValue> {
    let reading: AgriculturalReading = serde_json::from_str(reading_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid reading JSON: {}", e)))?;

    let recommendations = generate_recommendations(
        reading.fused.combined_ndvi,
        &reading.satellite,
        &reading.imagery,
    );
    serde_json::to_string(&recommendations).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check a map pick before requesting data for it
#[wasm_bindgen]
pub fn is_valid_location(longitude: f64, latitude: f64) -> bool {
    validate_coordinates(longitude, latitude).is_ok()
}

/// Search box `[west, south, east, north]` around a point
#[wasm_bindgen]
pub fn imagery_bbox(longitude: f64, latitude: f64, buffer_km: f64) -> Vec<f64> {
    GpsCoordinates::new(longitude, latitude)
        .bbox(buffer_km)
        .to_array()
        .to_vec()
}
