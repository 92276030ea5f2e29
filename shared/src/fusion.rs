//! Data fusion engine
//!
//! Combines the satellite and high-resolution imagery readings into one
//! fused block: weighted NDVI, a completeness-based confidence level and
//! the advisory text derived from both.

use crate::insights::generate_recommendations;
use crate::models::{FusedReading, FusionWeights, ImageryReading, SatelliteReading, WeightPolicy};

/// Weight of the broad-coverage, frequently updated satellite source
pub const SATELLITE_WEIGHT: f64 = 0.6;
/// Weight of the high-resolution imagery source
pub const IMAGERY_WEIGHT: f64 = 0.4;

const BASE_CONFIDENCE: f64 = 0.5;
const SATELLITE_NDVI_BONUS: f64 = 0.2;
const SATELLITE_SOIL_MOISTURE_BONUS: f64 = 0.1;
const IMAGERY_QUALITY_BONUS: f64 = 0.2;
const CROP_CONFIDENCE_BONUS: f64 = 0.1;
/// Imagery data quality must exceed this to earn its confidence bonus
pub const IMAGERY_QUALITY_THRESHOLD: f64 = 80.0;
/// Crop prediction confidence must exceed this to earn its bonus
pub const CROP_CONFIDENCE_THRESHOLD: f64 = 0.8;

impl FusionWeights {
    /// The fixed 0.6 / 0.4 split
    pub const FIXED: FusionWeights = FusionWeights {
        satellite: SATELLITE_WEIGHT,
        imagery: IMAGERY_WEIGHT,
    };

    pub const SATELLITE_ONLY: FusionWeights = FusionWeights {
        satellite: 1.0,
        imagery: 0.0,
    };

    pub const IMAGERY_ONLY: FusionWeights = FusionWeights {
        satellite: 0.0,
        imagery: 1.0,
    };

    pub fn total(&self) -> f64 {
        self.satellite + self.imagery
    }
}

/// Weighted NDVI with the fixed weights
pub fn combined_ndvi(satellite_ndvi: f64, imagery_ndvi: f64) -> f64 {
    weighted_ndvi(satellite_ndvi, imagery_ndvi, FusionWeights::FIXED)
}

/// Weighted NDVI, kept inside the closed interval spanned by the inputs
fn weighted_ndvi(a: f64, b: f64, weights: FusionWeights) -> f64 {
    let value = a * weights.satellite + b * weights.imagery;
    value.clamp(a.min(b), a.max(b))
}

/// Pick the weights for a pair of readings.
///
/// A missing satellite NDVI hands the imagery source the full weight under
/// every policy. Otherwise `Fixed` keeps 0.6 / 0.4 regardless of origin and
/// `PreferObserved` gives full weight to the only observed source, if any.
pub fn fusion_weights(
    satellite: &SatelliteReading,
    imagery: &ImageryReading,
    policy: WeightPolicy,
) -> FusionWeights {
    if satellite.ndvi.is_none() {
        return FusionWeights::IMAGERY_ONLY;
    }

    match policy {
        WeightPolicy::Fixed => FusionWeights::FIXED,
        WeightPolicy::PreferObserved => {
            match (satellite.is_simulated(), imagery.is_simulated()) {
                (false, true) => FusionWeights::SATELLITE_ONLY,
                (true, false) => FusionWeights::IMAGERY_ONLY,
                _ => FusionWeights::FIXED,
            }
        }
    }
}

/// Additive completeness score, clamped to [0, 1]
pub fn compute_confidence(satellite: &SatelliteReading, imagery: &ImageryReading) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    if satellite.ndvi.is_some() {
        confidence += SATELLITE_NDVI_BONUS;
    }
    if satellite.soil_moisture.is_some() {
        confidence += SATELLITE_SOIL_MOISTURE_BONUS;
    }
    if imagery.data_quality > IMAGERY_QUALITY_THRESHOLD {
        confidence += IMAGERY_QUALITY_BONUS;
    }
    if imagery.crop_confidence() > CROP_CONFIDENCE_THRESHOLD {
        confidence += CROP_CONFIDENCE_BONUS;
    }

    confidence.clamp(0.0, 1.0)
}

/// Fuse both provider readings. Never fails.
pub fn fuse(
    satellite: &SatelliteReading,
    imagery: &ImageryReading,
    policy: WeightPolicy,
) -> FusedReading {
    let weights = fusion_weights(satellite, imagery, policy);
    let combined = match satellite.ndvi {
        Some(a) => weighted_ndvi(a, imagery.ndvi, weights),
        None => imagery.ndvi,
    };

    FusedReading {
        combined_ndvi: combined,
        confidence_level: compute_confidence(satellite, imagery),
        weights,
        weight_policy: policy,
        recommendations: generate_recommendations(combined, satellite, imagery),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropPrediction, DataOrigin, FieldTrends};
    use chrono::Utc;

    fn satellite(ndvi: Option<f64>, origin: DataOrigin) -> SatelliteReading {
        SatelliteReading {
            ndvi,
            soil_moisture: Some(0.3),
            precipitation_mm: None,
            temperature_celsius: None,
            trends: FieldTrends::default(),
            origin,
            observed_at: Utc::now(),
        }
    }

    fn imagery(ndvi: f64, origin: DataOrigin) -> ImageryReading {
        ImageryReading {
            ndvi,
            resolution: "10m".to_string(),
            crop_type: None,
            soil_properties: None,
            data_quality: 50.0,
            scene: None,
            origin,
        }
    }

    #[test]
    fn test_fixed_policy_ignores_simulated_source() {
        let fused = fuse(
            &satellite(Some(0.8), DataOrigin::Observed),
            &imagery(0.4, DataOrigin::Simulated),
            WeightPolicy::Fixed,
        );
        assert_eq!(fused.weights, FusionWeights::FIXED);
        assert!((fused.combined_ndvi - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_prefer_observed_policy() {
        let fused = fuse(
            &satellite(Some(0.8), DataOrigin::Observed),
            &imagery(0.4, DataOrigin::Simulated),
            WeightPolicy::PreferObserved,
        );
        assert_eq!(fused.weights, FusionWeights::SATELLITE_ONLY);
        assert!((fused.combined_ndvi - 0.8).abs() < 1e-9);

        let fused = fuse(
            &satellite(Some(0.8), DataOrigin::Simulated),
            &imagery(0.4, DataOrigin::Observed),
            WeightPolicy::PreferObserved,
        );
        assert_eq!(fused.weights, FusionWeights::IMAGERY_ONLY);
        assert!((fused.combined_ndvi - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_missing_satellite_ndvi_uses_imagery() {
        let fused = fuse(
            &satellite(None, DataOrigin::Observed),
            &imagery(0.55, DataOrigin::Observed),
            WeightPolicy::Fixed,
        );
        assert_eq!(fused.weights, FusionWeights::IMAGERY_ONLY);
        assert_eq!(fused.combined_ndvi, 0.55);
    }

    #[test]
    fn test_confidence_full_marks_clamped() {
        let mut img = imagery(0.5, DataOrigin::Observed);
        img.data_quality = 99.0;
        img.crop_type = Some(CropPrediction {
            crop: "wheat".to_string(),
            confidence: 0.95,
        });
        // 0.5 + 0.2 + 0.1 + 0.2 + 0.1 = 1.1
        let confidence = compute_confidence(&satellite(Some(0.5), DataOrigin::Observed), &img);
        assert_eq!(confidence, 1.0);
    }
}
