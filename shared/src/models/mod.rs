//! Domain models for the TerraAI agricultural data platform

mod dataset;
mod imagery;
mod reading;
mod satellite;

pub use dataset::*;
pub use imagery::*;
pub use reading::*;
pub use satellite::*;
