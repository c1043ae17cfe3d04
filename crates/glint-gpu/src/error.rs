use glint_core::CubeLutError;

/// Fatal engine errors. Construction failures carry the driver diagnostics
/// needed to tell "no GPU" apart from "GPU refused the device".
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no GPU adapter available (backends: {backends}): {source}")]
    NoAdapter {
        backends: String,
        #[source]
        source: wgpu::RequestAdapterError,
    },
    #[error("failed to create device on {adapter}: {source}")]
    Device {
        adapter: String,
        #[source]
        source: wgpu::RequestDeviceError,
    },
    #[error("preview shader failed validation: {0}")]
    ShaderValidation(String),
    #[error("unsupported output format {0:?}; expected Rgba8Unorm or Bgra8Unorm")]
    UnsupportedFormat(wgpu::TextureFormat),
    #[error("image {width}x{height} exceeds the device texture limit of {max}")]
    ImageTooLarge { width: u32, height: u32, max: u32 },
    #[error("image {width}x{height} is empty or holds {pixels} pixels")]
    MalformedImage { width: u32, height: u32, pixels: usize },
    #[error("no image loaded")]
    NoImage,
    #[error("output readback failed: {0}")]
    Readback(String),
}

/// Reasons an external LUT could not be loaded. Logged, never returned
/// from `load_lut`.
#[derive(Debug, thiserror::Error)]
pub enum LutLoadError {
    #[error("unsupported LUT url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid LUT url {url:?}: {reason}")]
    BadUrl { url: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode LUT image: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Cube(#[from] CubeLutError),
}
