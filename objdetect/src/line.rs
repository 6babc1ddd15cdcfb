use crate::{require_non_negative, DetectError, Result};
use ifp_core::Image;
use ifp_imgproc::{convolve, to_grayscale, to_zero_threshold, Kernel};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Row-wise ridge kernel, strongest on thin bright vertical lines.
const LINE_KERNEL: [f64; 3] = [-1.0, 2.0, -1.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    /// Filter responses below this are zeroed before the row search.
    pub response_threshold: f64,
    /// Fewer qualifying rows than this make the line too short.
    pub min_rows: usize,
    /// Rows per averaged sample, before clamping to `[1, max_sample]`.
    pub rows_per_sample: usize,
    pub max_sample: usize,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            response_threshold: 45.0,
            min_rows: 4,
            rows_per_sample: 40,
            max_sample: 8,
        }
    }
}

impl LineParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response_threshold(mut self, threshold: f64) -> Self {
        self.response_threshold = threshold;
        self
    }

    pub fn with_min_rows(mut self, rows: usize) -> Self {
        self.min_rows = rows;
        self
    }

    pub fn with_sampling(mut self, rows_per_sample: usize, max_sample: usize) -> Self {
        self.rows_per_sample = rows_per_sample;
        self.max_sample = max_sample;
        self
    }

    fn validate(&self) -> Result<()> {
        require_non_negative(self.response_threshold, "line response threshold")?;
        if self.min_rows == 0 || self.rows_per_sample == 0 || self.max_sample == 0 {
            return Err(DetectError::InvalidParameter(format!(
                "line row counts must be positive, got min_rows={}, rows_per_sample={}, max_sample={}",
                self.min_rows, self.rows_per_sample, self.max_sample
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEstimate {
    /// `offset` is the horizontal position in `[-1, 1]` (left to right);
    /// `orientation` is the horizontal drift of the top sample relative to
    /// the bottom one per row of height, positive when the top of the line
    /// lies right of its bottom, limited to `[-π/2, π/2]`.
    Found { offset: f64, orientation: f64 },
    TooShort,
    NotFound,
}

impl LineEstimate {
    pub fn is_found(&self) -> bool {
        matches!(self, LineEstimate::Found { .. })
    }
}

/// Column of the first maximum in every row, skipping rows whose maximum
/// sits in column 0 (which includes empty rows).
fn row_peaks(response: &Image) -> Vec<(u32, u32)> {
    (0..response.height())
        .filter_map(|y| {
            let row = response.row(y);
            let (col, _) = row
                .iter()
                .enumerate()
                .fold((0usize, 0u8), |best, (x, &v)| if v > best.1 { (x, v) } else { best });
            (col != 0).then_some((y, col as u32))
        })
        .collect()
}

fn mean_column(peaks: &[(u32, u32)]) -> f64 {
    peaks.iter().map(|&(_, c)| c as f64).sum::<f64>() / peaks.len() as f64
}

/// Position and tilt of the dominant bright vertical line.
pub fn detect_vertical_line(image: &Image, params: &LineParams) -> Result<LineEstimate> {
    params.validate()?;
    let gray = to_grayscale(image)?;
    let kernel = Kernel::from_slice(&LINE_KERNEL, 3, 1)?;
    let response = to_zero_threshold(&convolve(&gray, &kernel), params.response_threshold)?;

    let peaks = row_peaks(&response);
    let count = peaks.len();
    if count == 0 {
        tracing::debug!("no line rows");
        return Ok(LineEstimate::NotFound);
    }
    if count < params.min_rows {
        tracing::debug!(rows = count, "line too short");
        return Ok(LineEstimate::TooShort);
    }

    let sample = (count / params.rows_per_sample).clamp(1, params.max_sample);
    let mid_start = (count / 2).saturating_sub(sample / 2);
    let top = mean_column(&peaks[..sample]);
    let middle = mean_column(&peaks[mid_start..mid_start + sample]);
    let bottom = mean_column(&peaks[count - sample..]);

    let span = (peaks[count - 1].0 - peaks[0].0) as f64;
    let orientation = ((top - bottom) / span).clamp(-FRAC_PI_2, FRAC_PI_2);
    let offset = (middle / image.width() as f64) * 2.0 - 1.0;

    tracing::debug!(rows = count, sample, top, middle, bottom, offset, orientation, "line found");
    Ok(LineEstimate::Found {
        offset,
        orientation,
    })
}
