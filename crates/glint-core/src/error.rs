/// Rejected external histogram data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistogramError {
    #[error("expected 4 channels, got {0}")]
    ChannelCount(usize),
    #[error("channel {channel} has {len} bins, expected 256")]
    BinCount { channel: usize, len: usize },
    #[error("channel {channel} bin {bin} is {value}; bins must be finite and non-negative")]
    BadValue { channel: usize, bin: usize, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoloError {
    #[error("unknown layer id: {0:?}")]
    UnknownLayer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CubeLutError {
    #[error("cube LUT image must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },
    #[error("cube LUT side {width} is not n³ for any n ≥ 2")]
    BadSize { width: u32 },
    #[error("cube LUT buffer holds {actual} texels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image has zero area")]
    Empty,
}
