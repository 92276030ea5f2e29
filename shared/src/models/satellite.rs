//! Satellite provider reading (NASA-style agricultural datasets)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DataOrigin;

/// Direction a measured field has been moving over the query window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    #[default]
    Stable,
    Decreasing,
}

impl Trend {
    /// Parse a provider trend label, treating anything unknown as stable
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "increasing" | "rising" | "up" => Trend::Increasing,
            "decreasing" | "falling" | "down" => Trend::Decreasing,
            _ => Trend::Stable,
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Stable => write!(f, "stable"),
            Trend::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Trend per measured field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FieldTrends {
    pub ndvi: Trend,
    pub soil_moisture: Trend,
    pub precipitation: Trend,
    pub temperature: Trend,
}

/// Normalized reading from the satellite-data provider
///
/// Every measurement is optional: the provider omits datasets it has no
/// coverage for, and fusion confidence reflects what actually arrived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SatelliteReading {
    /// NDVI in [-1, 1]
    pub ndvi: Option<f64>,
    /// Volumetric soil moisture fraction in [0, 1]
    pub soil_moisture: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub temperature_celsius: Option<f64>,
    pub trends: FieldTrends,
    pub origin: DataOrigin,
    pub observed_at: DateTime<Utc>,
}

impl SatelliteReading {
    /// Number of measurement fields present
    pub fn available_fields(&self) -> usize {
        [
            self.ndvi,
            self.soil_moisture,
            self.precipitation_mm,
            self.temperature_celsius,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    pub fn is_simulated(&self) -> bool {
        self.origin == DataOrigin::Simulated
    }
}
