use crate::{ImgprocError, Result};
use ifp_core::Image;
use rayon::prelude::*;

/// Bilinear resize with pixel-centre alignment, every channel independently.
pub fn resize_linear(src: &Image, width: u32, height: u32) -> Result<Image> {
    if width == 0 || height == 0 {
        return Err(ImgprocError::InvalidParameter(format!(
            "target size must be non-zero, got {width}x{height}"
        )));
    }
    let channels = src.channels() as usize;
    let src_w = src.width() as usize;
    let src_h = src.height() as usize;
    let scale_x = src_w as f64 / width as f64;
    let scale_y = src_h as f64 / height as f64;
    let data = src.as_raw();
    let mut dst = Image::new(width, height, src.channels())?;

    let sample = |x: usize, y: usize, c: usize| data[(y * src_w + x) * channels + c] as f64;

    dst.as_raw_mut()
        .par_chunks_mut(width as usize * channels)
        .enumerate()
        .for_each(|(y, row)| {
            let fy = ((y as f64 + 0.5) * scale_y - 0.5).max(0.0);
            let y0 = (fy as usize).min(src_h - 1);
            let y1 = (y0 + 1).min(src_h - 1);
            let dy = fy - y0 as f64;

            for x in 0..width as usize {
                let fx = ((x as f64 + 0.5) * scale_x - 0.5).max(0.0);
                let x0 = (fx as usize).min(src_w - 1);
                let x1 = (x0 + 1).min(src_w - 1);
                let dx = fx - x0 as f64;

                for c in 0..channels {
                    let v0 = sample(x0, y0, c) * (1.0 - dx) + sample(x1, y0, c) * dx;
                    let v1 = sample(x0, y1, c) * (1.0 - dx) + sample(x1, y1, c) * dx;
                    let v = v0 * (1.0 - dy) + v1 * dy;
                    row[x * channels + c] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Ok(dst)
}

/// Resize to `new_width`, keeping the aspect ratio (height truncated).
pub fn resize_by_width(image: &Image, new_width: u32) -> Result<Image> {
    let new_height = (image.height() as f64 * (new_width as f64 / image.width() as f64)) as u32;
    resize_linear(image, new_width, new_height)
}

/// Resize to `new_height`, keeping the aspect ratio (width truncated).
pub fn resize_by_height(image: &Image, new_height: u32) -> Result<Image> {
    let new_width = (image.width() as f64 * (new_height as f64 / image.height() as f64)) as u32;
    resize_linear(image, new_width, new_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_by_width_keeps_aspect_ratio() {
        let img = Image::new(640, 480, 3).unwrap();
        let out = resize_by_width(&img, 320).unwrap();
        assert_eq!(out.dimensions(), (320, 240));
        assert_eq!(out.channels(), 3);

        let odd = Image::new(101, 33, 1).unwrap();
        assert_eq!(resize_by_width(&odd, 50).unwrap().dimensions(), (50, 16));
    }

    #[test]
    fn resize_by_height_keeps_aspect_ratio() {
        let img = Image::new(300, 200, 1).unwrap();
        assert_eq!(resize_by_height(&img, 100).unwrap().dimensions(), (150, 100));
    }

    #[test]
    fn constant_image_stays_constant() {
        let img = Image::filled(17, 9, &[12, 34, 56]).unwrap();
        let out = resize_linear(&img, 40, 21).unwrap();
        assert!(out.as_raw().chunks_exact(3).all(|px| px == [12, 34, 56]));
    }

    #[test]
    fn upscale_interpolates_between_samples() {
        let img = Image::from_raw(2, 1, 1, vec![0, 100]).unwrap();
        let out = resize_linear(&img, 4, 1).unwrap();
        assert_eq!(out.as_raw(), &[0, 25, 75, 100]);
    }

    #[test]
    fn degenerate_target_is_rejected() {
        let img = Image::new(100, 2, 1).unwrap();
        assert!(matches!(
            resize_by_width(&img, 10),
            Err(ImgprocError::InvalidParameter(_))
        ));
    }
}
