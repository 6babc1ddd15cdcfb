use crate::{require_channels, ImgprocError, Result};
use ifp_core::Image;
use rayon::prelude::*;
use rayon::ThreadPool;

// Fixed-point luma weights (Q14) for 0.114 B + 0.587 G + 0.299 R.
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;
const LUMA_SHIFT: u32 = 14;

fn bgr_to_luma(b: u8, g: u8, r: u8) -> u8 {
    let acc = b as u32 * LUMA_B + g as u32 * LUMA_G + r as u32 * LUMA_R;
    ((acc + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// BGR to HSV with the 8-bit ranges H in [0, 179], S and V in [0, 255].
pub fn bgr_to_hsv_pixel(b: u8, g: u8, r: u8) -> [u8; 3] {
    let v = b.max(g).max(r);
    let min = b.min(g).min(r);
    let diff = (v - min) as f64;

    let s = if v == 0 {
        0
    } else {
        (diff * 255.0 / v as f64).round() as u8
    };

    let hue_degrees = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g as f64 - b as f64) / diff
    } else if v == g {
        120.0 + 60.0 * (b as f64 - r as f64) / diff
    } else {
        240.0 + 60.0 * (r as f64 - g as f64) / diff
    };
    let hue_degrees = if hue_degrees < 0.0 {
        hue_degrees + 360.0
    } else {
        hue_degrees
    };

    let mut h = (hue_degrees / 2.0).round() as u32;
    if h >= 180 {
        h -= 180;
    }
    [h as u8, s, v]
}

pub fn to_grayscale(image: &Image) -> Result<Image> {
    to_grayscale_in_pool(image, None)
}

/// Luma conversion. Single-channel input is copied; BGRA ignores alpha.
pub fn to_grayscale_in_pool(image: &Image, pool: Option<&ThreadPool>) -> Result<Image> {
    let channels = image.channels() as usize;
    match channels {
        1 => return Ok(image.clone()),
        3 | 4 => {}
        n => {
            return Err(ImgprocError::UnsupportedFormat(format!(
                "grayscale conversion expects 1, 3 or 4 channels, got {n}"
            )))
        }
    }

    let run = || {
        let mut gray = image.gray_like();
        gray.as_raw_mut()
            .par_iter_mut()
            .zip(image.as_raw().par_chunks_exact(channels))
            .for_each(|(g, px)| {
                *g = bgr_to_luma(px[0], px[1], px[2]);
            });
        gray
    };

    Ok(match pool {
        Some(p) => p.install(run),
        None => run(),
    })
}

pub fn to_hsv(image: &Image) -> Result<Image> {
    to_hsv_in_pool(image, None)
}

pub fn to_hsv_in_pool(image: &Image, pool: Option<&ThreadPool>) -> Result<Image> {
    require_channels(image, 3, "HSV conversion")?;

    let run = || {
        let mut hsv = image.blank_like();
        hsv.as_raw_mut()
            .par_chunks_exact_mut(3)
            .zip(image.as_raw().par_chunks_exact(3))
            .for_each(|(out, px)| {
                out.copy_from_slice(&bgr_to_hsv_pixel(px[0], px[1], px[2]));
            });
        hsv
    };

    Ok(match pool {
        Some(p) => p.install(run),
        None => run(),
    })
}

/// Replicate a gray channel into a BGR image, e.g. as a base for overlays.
pub fn gray_to_bgr(gray: &Image) -> Result<Image> {
    require_channels(gray, 1, "gray to BGR conversion")?;
    let data = gray.as_raw().iter().flat_map(|&g| [g, g, g]).collect();
    Ok(Image::from_raw(gray.width(), gray.height(), 3, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_matches_standard_weights() {
        // 0.114*200 + 0.587*150 + 0.299*100 = 140.75
        let img = Image::filled(4, 4, &[200, 150, 100]).unwrap();
        let gray = to_grayscale(&img).unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.pixel(0, 0), &[141]);
    }

    #[test]
    fn white_and_black_are_extremes() {
        assert_eq!(bgr_to_luma(255, 255, 255), 255);
        assert_eq!(bgr_to_luma(0, 0, 0), 0);
    }

    #[test]
    fn primary_colors_map_to_opencv_hues() {
        assert_eq!(bgr_to_hsv_pixel(0, 0, 255), [0, 255, 255]);
        assert_eq!(bgr_to_hsv_pixel(0, 255, 0), [60, 255, 255]);
        assert_eq!(bgr_to_hsv_pixel(255, 0, 0), [120, 255, 255]);
        assert_eq!(bgr_to_hsv_pixel(0, 255, 255), [30, 255, 255]);
    }

    #[test]
    fn gray_pixels_have_no_saturation() {
        assert_eq!(bgr_to_hsv_pixel(90, 90, 90), [0, 0, 90]);
        assert_eq!(bgr_to_hsv_pixel(0, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn hsv_half_saturation() {
        // V = 200, min = 100 -> S = 100 * 255 / 200 = 127.5
        let [_, s, v] = bgr_to_hsv_pixel(100, 100, 200);
        assert_eq!(v, 200);
        assert_eq!(s, 128);
    }

    #[test]
    fn hsv_rejects_gray_input() {
        let img = Image::new(2, 2, 1).unwrap();
        assert!(matches!(
            to_hsv(&img),
            Err(ImgprocError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn gray_to_bgr_replicates() {
        let gray = Image::filled(2, 2, &[77]).unwrap();
        let bgr = gray_to_bgr(&gray).unwrap();
        assert_eq!(bgr.pixel(1, 1), &[77, 77, 77]);
    }
}
