use crate::{require_non_negative, DetectError, Result};
use ifp_core::{Image, Rect};
use ifp_imgproc::{
    approx_polygon, bounding_rect, canny, contour_area, find_external_contours, gaussian_blur,
    to_grayscale, validate_kernel_size, Contour,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    pub blur_size: u32,
    pub canny_low: f64,
    pub canny_high: f64,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub epsilon_fraction: f64,
    pub vertices: usize,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            blur_size: 5,
            canny_low: 75.0,
            canny_high: 200.0,
            epsilon_fraction: 0.01,
            vertices: 4,
        }
    }
}

impl ShapeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blur_size(mut self, size: u32) -> Self {
        self.blur_size = size;
        self
    }

    pub fn with_canny_thresholds(mut self, low: f64, high: f64) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    pub fn with_epsilon_fraction(mut self, fraction: f64) -> Self {
        self.epsilon_fraction = fraction;
        self
    }

    pub fn with_vertices(mut self, vertices: usize) -> Self {
        self.vertices = vertices;
        self
    }

    fn validate(&self) -> Result<()> {
        validate_kernel_size(self.blur_size)?;
        require_non_negative(self.canny_low, "low edge threshold")?;
        require_non_negative(self.canny_high, "high edge threshold")?;
        require_non_negative(self.epsilon_fraction, "epsilon fraction")?;
        if self.vertices < 3 {
            return Err(DetectError::InvalidParameter(format!(
                "a polygon needs at least 3 vertices, got {}",
                self.vertices
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMatch {
    pub contour: Contour,
    pub polygon: Contour,
    pub bounding_rect: Rect,
}

impl ShapeMatch {
    pub fn vertex_count(&self) -> usize {
        self.polygon.len()
    }
}

/// Largest edge contour that simplifies to `params.vertices` corners
/// (a quadrilateral by default).
pub fn find_quadrilateral(image: &Image, params: &ShapeParams) -> Result<Option<ShapeMatch>> {
    params.validate()?;
    let gray = to_grayscale(image)?;
    let blurred = gaussian_blur(&gray, params.blur_size)?;
    let edges = canny(&blurred, params.canny_low, params.canny_high)?;

    let mut candidates: Vec<(f64, Contour)> = find_external_contours(&edges)?
        .into_iter()
        .map(|c| (contour_area(&c), c))
        .collect();
    // stable: equal areas keep raster order
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (area, contour) in candidates {
        let polygon = approx_polygon(&contour, params.epsilon_fraction)?;
        tracing::trace!(area, vertices = polygon.len(), "shape candidate");
        if polygon.len() == params.vertices {
            let bounding_rect = bounding_rect(&contour)?;
            tracing::debug!(?bounding_rect, area, "shape found");
            return Ok(Some(ShapeMatch {
                contour,
                polygon,
                bounding_rect,
            }));
        }
    }

    tracing::debug!("no shape found");
    Ok(None)
}
