//! Business logic services for the TerraAI data platform

pub mod agriculture;

pub use agriculture::AgriculturalDataService;
