use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Unsupported pixel layout: {channels} channel(s)")]
    UnsupportedPixelLayout { channels: usize },

    #[error("Unsupported color type: {0}")]
    UnsupportedColorType(String),

    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GPU error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;
