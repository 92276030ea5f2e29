//! Fused agricultural reading returned to the UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ImageryReading, SatelliteReading};
use crate::types::GpsCoordinates;

/// Whether a provider sub-reading came from the provider or from the fallback simulator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Observed,
    Simulated,
}

/// How fusion weights react to a simulated source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Always 0.6 / 0.4, even when one source is simulated
    #[default]
    Fixed,
    /// When exactly one source is observed it takes the full weight
    PreferObserved,
}

impl std::str::FromStr for WeightPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(WeightPolicy::Fixed),
            "prefer_observed" | "prefer-observed" => Ok(WeightPolicy::PreferObserved),
            other => Err(format!("Unknown weight policy: {}", other)),
        }
    }
}

/// Source weights used for one fusion; always sums to 1
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FusionWeights {
    pub satellite: f64,
    pub imagery: f64,
}

/// Output of the fusion engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedReading {
    pub combined_ndvi: f64,
    /// Heuristic completeness score in [0, 1]
    pub confidence_level: f64,
    pub weights: FusionWeights,
    pub weight_policy: WeightPolicy,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingMetadata {
    pub timestamp: DateTime<Utc>,
    pub spatial_resolution: String,
    pub update_frequency: String,
    /// Dataset ids consulted for this reading
    pub sources: Vec<String>,
}

/// Unified per-request agricultural reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgriculturalReading {
    pub id: Uuid,
    pub location: GpsCoordinates,
    pub satellite: SatelliteReading,
    pub imagery: ImageryReading,
    pub fused: FusedReading,
    pub metadata: ReadingMetadata,
}

impl AgriculturalReading {
    /// True when neither provider delivered real data
    pub fn is_fully_simulated(&self) -> bool {
        self.satellite.is_simulated() && self.imagery.is_simulated()
    }
}
