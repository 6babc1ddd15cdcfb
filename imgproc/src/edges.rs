use crate::{convolve_f64, require_channels, require_finite, sobel_kernels, ImgprocError, Result};
use ifp_core::{FloatImage, Image};
use rayon::prelude::*;

// tan(22.5°) and tan(67.5°)
const TAN_22_5: f64 = 0.414_213_562_373_095;
const TAN_67_5: f64 = 2.414_213_562_373_095;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Horizontal,
    Vertical,
    /// Gradient along the main diagonal (x and y grow together).
    Falling,
    Rising,
}

fn direction(gx: f64, gy: f64) -> Direction {
    let ax = gx.abs();
    let ay = gy.abs();
    if ay < ax * TAN_22_5 {
        Direction::Horizontal
    } else if ay > ax * TAN_67_5 {
        Direction::Vertical
    } else if (gx < 0.0) == (gy < 0.0) {
        Direction::Falling
    } else {
        Direction::Rising
    }
}

/// Signed 3x3 Sobel derivatives `(gx, gy)` of a single-channel image with
/// replicated borders.
pub fn sobel(image: &Image) -> Result<(FloatImage, FloatImage)> {
    require_channels(image, 1, "Sobel")?;
    let (kx, ky) = sobel_kernels();
    let gx = convolve_f64(image, &kx)?;
    let gy = convolve_f64(image, &ky)?;
    Ok((gx, gy))
}

fn non_max_suppression(
    width: usize,
    height: usize,
    mag: &[f64],
    gx: &[f64],
    gy: &[f64],
) -> Vec<f64> {
    let mut out = vec![0.0f64; width * height];
    if width < 3 || height < 3 {
        return out;
    }

    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            if y == 0 || y >= height - 1 {
                return;
            }
            let r0 = (y - 1) * width;
            let r1 = y * width;
            let r2 = (y + 1) * width;

            for x in 1..width - 1 {
                let idx = r1 + x;
                let m = mag[idx];
                if m == 0.0 {
                    continue;
                }
                let keep = match direction(gx[idx], gy[idx]) {
                    Direction::Horizontal => m > mag[idx - 1] && m >= mag[idx + 1],
                    Direction::Vertical => m > mag[r0 + x] && m >= mag[r2 + x],
                    Direction::Falling => m > mag[r0 + x - 1] && m > mag[r2 + x + 1],
                    Direction::Rising => m > mag[r0 + x + 1] && m > mag[r2 + x - 1],
                };
                if keep {
                    out_row[x] = m;
                }
            }
        });

    out
}

fn hysteresis(width: usize, height: usize, nms: &[f64], low: f64, high: f64) -> Vec<u8> {
    const STRONG: u8 = 255;
    const WEAK: u8 = 1;

    let mut state = vec![0u8; width * height];
    let mut stack = Vec::new();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let idx = y * width + x;
            let v = nms[idx];
            if v > high {
                state[idx] = STRONG;
                stack.push((x, y));
            } else if v > low {
                state[idx] = WEAK;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                let nidx = ny * width + nx;
                if state[nidx] == WEAK {
                    state[nidx] = STRONG;
                    stack.push((nx, ny));
                }
            }
        }
    }

    state
        .par_iter_mut()
        .for_each(|s| *s = if *s == STRONG { 255 } else { 0 });
    state
}

/// Canny edge detector on a single-channel image: Sobel gradients with L1
/// magnitude, four-direction non-maximum suppression, then hysteresis with
/// 8-connectivity. Pixels on the outermost ring are never edges.
///
/// Thresholds are swapped when `low > high`. Output is a 0/255 mask.
pub fn canny(image: &Image, low: f64, high: f64) -> Result<Image> {
    require_channels(image, 1, "Canny")?;
    for (value, name) in [(low, "low threshold"), (high, "high threshold")] {
        require_finite(value, name)?;
        if value < 0.0 {
            return Err(ImgprocError::InvalidParameter(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
    }
    let (low, high) = if low > high { (high, low) } else { (low, high) };

    let width = image.width() as usize;
    let height = image.height() as usize;
    let (gx, gy) = sobel(image)?;
    let mag: Vec<f64> = gx
        .as_slice()
        .par_iter()
        .zip(gy.as_slice())
        .map(|(dx, dy)| dx.abs() + dy.abs())
        .collect();

    let nms = non_max_suppression(width, height, &mag, gx.as_slice(), gy.as_slice());
    let edges = hysteresis(width, height, &nms, low, high);
    tracing::trace!(
        width,
        height,
        low,
        high,
        edge_pixels = edges.iter().filter(|&&v| v != 0).count(),
        "canny"
    );
    Ok(Image::from_raw(image.width(), image.height(), 1, edges)?)
}
