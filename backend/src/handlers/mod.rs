//! HTTP request handlers

pub mod agriculture;
pub mod health;

pub use agriculture::*;
pub use health::*;
