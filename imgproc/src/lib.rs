pub mod color;
pub mod contours;
pub mod convolve;
pub mod edges;
pub mod morph;
pub mod resize;
pub mod stats;
pub mod threshold;

pub use color::*;
pub use contours::*;
pub use convolve::*;
pub use edges::*;
pub use morph::*;
pub use resize::*;
pub use stats::*;
pub use threshold::*;

use ifp_core::Image;

pub type Result<T> = std::result::Result<T, ImgprocError>;

#[derive(Debug, thiserror::Error)]
pub enum ImgprocError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Image error: {0}")]
    Core(#[from] ifp_core::Error),
}

/// Kernel and structuring-element sizes must be positive and odd.
pub fn validate_kernel_size(size: u32) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(ImgprocError::InvalidParameter(format!(
            "kernel size must be a positive odd integer, got {size}"
        )));
    }
    Ok(())
}

pub(crate) fn require_channels(image: &Image, expected: u8, op: &str) -> Result<()> {
    if image.channels() != expected {
        return Err(ImgprocError::UnsupportedFormat(format!(
            "{op} expects {expected} channel(s), got {}",
            image.channels()
        )));
    }
    Ok(())
}

pub(crate) fn require_finite(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(ImgprocError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}
