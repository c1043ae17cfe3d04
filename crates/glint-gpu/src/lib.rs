//! Glint GPU: wgpu host engine for the real-time look preview.
//!
//! Owns the device, the preview render program and every texture it reads.
//! The per-pixel work lives in `shaders/preview.wgsl`; `glint-core` holds the
//! CPU reference it is checked against.

pub mod config;
pub mod engine;
pub mod error;
pub mod readback;
pub mod textures;
pub mod uniforms;

pub use config::EngineConfig;
pub use engine::{PREVIEW_SHADER, PreviewEngine, fetch_lut};
pub use error::{EngineError, LutLoadError};
