//! Validation utilities for caller input and provider values

use thiserror::Error;

use crate::models::{ImageryReading, SatelliteReading};
use crate::types::GpsCoordinates;

/// A value failed range validation
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Validate longitude is finite and within [-180, 180]
pub fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::new(
            "longitude",
            format!("Longitude must be between -180 and 180, got {}", longitude),
        ));
    }
    Ok(())
}

/// Validate latitude is finite and within [-90, 90]
pub fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::new(
            "latitude",
            format!("Latitude must be between -90 and 90, got {}", latitude),
        ));
    }
    Ok(())
}

/// Validate a longitude/latitude pair and build coordinates from it
pub fn validate_coordinates(
    longitude: f64,
    latitude: f64,
) -> Result<GpsCoordinates, ValidationError> {
    validate_longitude(longitude)?;
    validate_latitude(latitude)?;
    Ok(GpsCoordinates::new(longitude, latitude))
}

/// Validate a search buffer radius in km
pub fn validate_buffer_km(buffer_km: f64) -> Result<(), ValidationError> {
    if !buffer_km.is_finite() || buffer_km <= 0.0 || buffer_km > 100.0 {
        return Err(ValidationError::new(
            "buffer_km",
            "Buffer must be greater than 0 and at most 100 km",
        ));
    }
    Ok(())
}

// ============================================================================
// Measurement Validations
// ============================================================================

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("Must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

/// Validate a satellite reading submitted from outside (e.g. for re-fusion)
pub fn validate_satellite_reading(reading: &SatelliteReading) -> Result<(), ValidationError> {
    if let Some(ndvi) = reading.ndvi {
        check_range("satellite.ndvi", ndvi, -1.0, 1.0)?;
    }
    if let Some(moisture) = reading.soil_moisture {
        check_range("satellite.soil_moisture", moisture, 0.0, 1.0)?;
    }
    if let Some(precipitation) = reading.precipitation_mm {
        check_range("satellite.precipitation_mm", precipitation, 0.0, f64::MAX)?;
    }
    if let Some(temperature) = reading.temperature_celsius {
        check_range("satellite.temperature_celsius", temperature, -90.0, 70.0)?;
    }
    Ok(())
}

/// Validate an imagery reading submitted from outside
pub fn validate_imagery_reading(reading: &ImageryReading) -> Result<(), ValidationError> {
    check_range("imagery.ndvi", reading.ndvi, -1.0, 1.0)?;
    check_range("imagery.data_quality", reading.data_quality, 0.0, 100.0)?;
    if let Some(crop) = &reading.crop_type {
        check_range("imagery.crop_type.confidence", crop.confidence, 0.0, 1.0)?;
    }
    Ok(())
}

// ============================================================================
// Normalization
// ============================================================================

/// Clamp an NDVI value into [-1, 1]; non-finite values become `None`
pub fn normalize_ndvi(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(-1.0, 1.0))
}

/// Clamp a fraction into [0, 1]; non-finite values become `None`
pub fn normalize_fraction(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

/// Clamp a percentage into [0, 100]; non-finite values become `None`
pub fn normalize_percent(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}
