//! Scope data: histogram computation and tone-edit prediction.

pub mod histogram;
pub mod predict;

pub use histogram::{Channel, Histogram};
pub use predict::predict;
