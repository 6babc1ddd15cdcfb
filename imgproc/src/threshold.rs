use crate::{
    dilate, erode, gaussian_blur, require_channels, require_finite, to_hsv, ImgprocError, Result,
};
use ifp_core::Image;
use rayon::prelude::*;

pub const HSV_MASK_BLUR_SIZE: u32 = 11;
pub const HSV_MASK_MORPH_SIZE: u32 = 3;
pub const HSV_MASK_MORPH_ITERATIONS: u32 = 2;

fn validate_bounds(channels: u8, low: &[f64], high: &[f64]) -> Result<()> {
    let channels = channels as usize;
    if low.len() != channels || high.len() != channels {
        return Err(ImgprocError::InvalidParameter(format!(
            "range bounds need {channels} value(s) each, got {} and {}",
            low.len(),
            high.len()
        )));
    }
    for &v in low.iter().chain(high) {
        require_finite(v, "range bound")?;
    }
    Ok(())
}

/// Single-channel mask: 255 where every channel lies in `[low, high]`
/// (inclusive), 0 elsewhere. One bound per image channel is required;
/// bounds are rounded to the nearest sample value first.
pub fn range_mask(image: &Image, low: &[f64], high: &[f64]) -> Result<Image> {
    validate_bounds(image.channels(), low, high)?;
    let low: Vec<f64> = low.iter().map(|v| v.round()).collect();
    let high: Vec<f64> = high.iter().map(|v| v.round()).collect();

    let channels = image.channels() as usize;
    let mut mask = image.gray_like();
    mask.as_raw_mut()
        .par_iter_mut()
        .zip(image.as_raw().par_chunks_exact(channels))
        .for_each(|(m, px)| {
            let inside = px
                .iter()
                .zip(low.iter().zip(&high))
                .all(|(&v, (&lo, &hi))| lo <= v as f64 && v as f64 <= hi);
            *m = if inside { 255 } else { 0 };
        });

    Ok(mask)
}

/// Keep samples `>= threshold`, zero the rest. Single-channel only.
pub fn to_zero_threshold(image: &Image, threshold: f64) -> Result<Image> {
    require_channels(image, 1, "to-zero threshold")?;
    require_finite(threshold, "threshold")?;

    let mut dst = image.blank_like();
    dst.as_raw_mut()
        .par_iter_mut()
        .zip(image.as_raw().par_iter())
        .for_each(|(out, &v)| {
            *out = if v as f64 >= threshold { v } else { 0 };
        });
    Ok(dst)
}

/// Mask of the BGR pixels whose HSV value lies within `[low, high]`, cleaned
/// up with an erode/dilate pass:
/// blur(11) -> HSV -> range mask -> erode(3, 2) -> dilate(3, 2).
pub fn hsv_mask(image: &Image, low: &[f64], high: &[f64]) -> Result<Image> {
    require_channels(image, 3, "HSV mask")?;
    validate_bounds(3, low, high)?;

    let blurred = gaussian_blur(image, HSV_MASK_BLUR_SIZE)?;
    let hsv = to_hsv(&blurred)?;
    let mask = range_mask(&hsv, low, high)?;
    let mask = erode(&mask, HSV_MASK_MORPH_SIZE, HSV_MASK_MORPH_ITERATIONS)?;
    dilate(&mask, HSV_MASK_MORPH_SIZE, HSV_MASK_MORPH_ITERATIONS)
}
