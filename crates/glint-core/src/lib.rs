//! Glint Core: look model and CPU-side numerics.
//!
//! The parameter model, tone-curve LUT builder, histogram predictor and
//! solo compositor, plus a CPU reference of the per-pixel pipeline that the
//! GPU preview is checked against. No GPU dependencies.

pub mod curves;
pub mod error;
pub mod image;
pub mod look;
pub mod pipeline;
pub mod scopes;
pub mod solo;

// Re-exports for convenience.
pub use curves::{CurveLut, build_curve_lut};
pub use error::{CubeLutError, HistogramError, ImageError, SoloError};
pub use image::SourceImage;
pub use look::Look;
pub use pipeline::{Stage, StageInputs, TiledCubeLut};
pub use scopes::{Histogram, predict};
pub use solo::{BalancePolicy, LayerId, SoloOptions, SoloSet, solo, solo_with};
