//! External data provider integrations

pub mod fallback;
pub mod satellite;
pub mod stac;

pub use fallback::FallbackGenerator;
pub use satellite::SatelliteClient;
pub use stac::StacClient;
