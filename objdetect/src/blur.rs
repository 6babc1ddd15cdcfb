use crate::{require_non_negative, Result};
use ifp_core::Image;
use ifp_imgproc::{laplacian, to_grayscale, variance};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BLUR_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurParams {
    /// Images whose Laplacian variance falls below this are blurry.
    pub threshold: f64,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BLUR_THRESHOLD,
        }
    }
}

impl BlurParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurReport {
    pub variance: f64,
    pub threshold: f64,
    pub blurry: bool,
}

/// Variance of the Laplacian of the grayscale image, a focus measure.
pub fn laplacian_variance(image: &Image) -> Result<f64> {
    let gray = to_grayscale(image)?;
    let response = laplacian(&gray)?;
    Ok(variance(&response))
}

pub fn detect_blur(image: &Image, params: &BlurParams) -> Result<BlurReport> {
    require_non_negative(params.threshold, "blur threshold")?;
    let variance = laplacian_variance(image)?;
    let blurry = variance < params.threshold;
    tracing::debug!(variance, threshold = params.threshold, blurry, "blur check");
    Ok(BlurReport {
        variance,
        threshold: params.threshold,
        blurry,
    })
}

pub fn is_image_blurry(image: &Image, threshold: f64) -> Result<bool> {
    Ok(detect_blur(image, &BlurParams::new().with_threshold(threshold))?.blurry)
}
