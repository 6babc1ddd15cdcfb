//! Detection pipelines composed from the `ifp-imgproc` primitives.
//!
//! Every pipeline is a pure function of the input image and a parameter
//! struct. Parameters are `serde` serializable so callers can keep them in
//! configuration files.

pub mod blob;
pub mod blur;
pub mod line;
pub mod pipeline;
pub mod rect;
pub mod shape;

pub use blob::{find_blob, Blob, BlobParams};
pub use blur::{detect_blur, is_image_blurry, laplacian_variance, BlurParams, BlurReport};
pub use line::{detect_vertical_line, LineEstimate, LineParams};
pub use pipeline::{run_pipeline, DetectionResult, Pipeline};
pub use rect::{
    apply_detector, apply_detector_to_region, detect_in_region_absolute, offset_rect,
    RectDetector,
};
pub use shape::{find_quadrilateral, ShapeMatch, ShapeParams};

pub type Result<T> = std::result::Result<T, DetectError>;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Image processing error: {0}")]
    Imgproc(#[from] ifp_imgproc::ImgprocError),

    #[error("Image error: {0}")]
    Core(#[from] ifp_core::Error),
}

pub(crate) fn require_non_negative(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DetectError::InvalidParameter(format!(
            "{name} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}
