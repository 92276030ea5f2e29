//! Shared types and models for the TerraAI agricultural data platform
//!
//! This crate contains the normalized data model, the fusion engine and the
//! recommendation rules, shared between the backend and the browser (via WASM).

pub mod fusion;
pub mod insights;
pub mod models;
pub mod types;
pub mod validation;

pub use fusion::*;
pub use insights::*;
pub use models::*;
pub use types::*;
pub use validation::*;
