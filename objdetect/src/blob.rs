use crate::{DetectError, Result};
use ifp_core::{Circle, Image};
use ifp_imgproc::{find_external_contours, hsv_mask, largest_contour, min_enclosing_circle, Contour};
use serde::{Deserialize, Serialize};

/// HSV bounds for the colour being tracked, H in [0, 179], S and V in [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobParams {
    pub low: [f64; 3],
    pub high: [f64; 3],
}

impl Default for BlobParams {
    /// A saturated green, the classic ball-tracking range.
    fn default() -> Self {
        Self {
            low: [29.0, 86.0, 6.0],
            high: [64.0, 255.0, 255.0],
        }
    }
}

impl BlobParams {
    pub fn new(low: [f64; 3], high: [f64; 3]) -> Self {
        Self { low, high }
    }

    /// Build from arbitrary slices; each must hold exactly one H, S, V triple.
    pub fn from_slices(low: &[f64], high: &[f64]) -> Result<Self> {
        let triple = |v: &[f64], name: &str| -> Result<[f64; 3]> {
            v.try_into().map_err(|_| {
                DetectError::InvalidParameter(format!(
                    "{name} HSV bound needs 3 values, got {}",
                    v.len()
                ))
            })
        };
        Ok(Self::new(triple(low, "low")?, triple(high, "high")?))
    }

    pub fn with_low(mut self, low: [f64; 3]) -> Self {
        self.low = low;
        self
    }

    pub fn with_high(mut self, high: [f64; 3]) -> Self {
        self.high = high;
        self
    }
}

/// Largest region in the colour range and the circle enclosing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub contour: Contour,
    pub enclosed_by: Circle,
}

pub fn find_blob(image: &Image, params: &BlobParams) -> Result<Option<Blob>> {
    let mask = hsv_mask(image, &params.low, &params.high)?;
    let contours = find_external_contours(&mask)?;
    let Some(contour) = largest_contour(&contours) else {
        tracing::debug!("no blob in range");
        return Ok(None);
    };

    let circle = min_enclosing_circle(contour)?;
    tracing::debug!(
        candidates = contours.len(),
        x = circle.center.x,
        y = circle.center.y,
        radius = circle.radius,
        "blob found"
    );
    Ok(Some(Blob {
        contour: contour.clone(),
        enclosed_by: circle,
    }))
}
