//! Rule-based advisory text for fused readings
//!
//! Every rule is checked in order and appends its message independently, so a
//! single reading can produce several recommendations.

use crate::models::{ImageryReading, SatelliteReading};

pub const LOW_NDVI_THRESHOLD: f64 = 0.3;
pub const HEALTHY_NDVI_THRESHOLD: f64 = 0.7;
pub const CRITICAL_SOIL_MOISTURE: f64 = 0.15;
pub const HIGH_QUALITY_THRESHOLD: f64 = 90.0;

/// Generate recommendations from the fused NDVI and both source readings
pub fn generate_recommendations(
    combined_ndvi: f64,
    satellite: &SatelliteReading,
    imagery: &ImageryReading,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if combined_ndvi < LOW_NDVI_THRESHOLD {
        recommendations.push(format!(
            "Low vegetation health detected (NDVI {:.2}). Inspect fields for pests, nutrient deficiency or water stress.",
            combined_ndvi
        ));
    }

    if combined_ndvi > HEALTHY_NDVI_THRESHOLD {
        recommendations.push(format!(
            "Vegetation is healthy (NDVI {:.2}). Maintain current management practices.",
            combined_ndvi
        ));
    }

    if let Some(moisture) = satellite.soil_moisture {
        if moisture < CRITICAL_SOIL_MOISTURE {
            recommendations.push(format!(
                "Critical: soil moisture is {:.0}%. Irrigate now to prevent crop stress.",
                moisture * 100.0
            ));
        }
    }

    if imagery.data_quality > HIGH_QUALITY_THRESHOLD {
        recommendations.push(format!(
            "High-confidence data: imagery quality score {:.0}/100.",
            imagery.data_quality
        ));
    }

    if let Some(crop) = &imagery.crop_type {
        recommendations.push(crop_note(&crop.crop));
    }

    recommendations
}

fn crop_note(crop: &str) -> String {
    let tip = match crop.to_ascii_lowercase().as_str() {
        "corn" | "maize" => "watch for nitrogen demand during the V6 to tasseling stages",
        "wheat" => "monitor for rust and time nitrogen top-dressing at tillering",
        "soybean" | "soybeans" => "scout for aphids and keep moisture steady through pod fill",
        "rice" => "maintain flood depth and watch for blast in humid weather",
        "cotton" => "manage irrigation closely around first bloom",
        _ => "match irrigation and fertilization to its current growth stage",
    };
    format!("Crop-specific advice for {}: {}.", crop, tip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataOrigin, FieldTrends};
    use chrono::Utc;

    fn satellite(soil_moisture: Option<f64>) -> SatelliteReading {
        SatelliteReading {
            ndvi: Some(0.5),
            soil_moisture,
            precipitation_mm: None,
            temperature_celsius: None,
            trends: FieldTrends::default(),
            origin: DataOrigin::Observed,
            observed_at: Utc::now(),
        }
    }

    fn imagery(data_quality: f64) -> ImageryReading {
        ImageryReading {
            ndvi: 0.5,
            resolution: "10m".to_string(),
            crop_type: None,
            soil_properties: None,
            data_quality,
            scene: None,
            origin: DataOrigin::Observed,
        }
    }

    #[test]
    fn test_mid_range_reading_has_no_advice() {
        let recs = generate_recommendations(0.5, &satellite(Some(0.3)), &imagery(70.0));
        assert!(recs.is_empty());
    }

    #[test]
    fn test_rules_append_in_order() {
        let recs = generate_recommendations(0.2, &satellite(Some(0.1)), &imagery(95.0));
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Low vegetation health"));
        assert!(recs[1].starts_with("Critical: soil moisture"));
        assert!(recs[2].starts_with("High-confidence data"));
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let recs = generate_recommendations(0.3, &satellite(Some(0.15)), &imagery(90.0));
        assert!(recs.is_empty());
        let recs = generate_recommendations(0.7, &satellite(None), &imagery(0.0));
        assert!(recs.is_empty());
    }

    #[test]
    fn test_unknown_crop_gets_generic_note() {
        assert!(crop_note("sorghum").contains("sorghum"));
        assert!(crop_note("Corn").contains("nitrogen"));
    }
}
