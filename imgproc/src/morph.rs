use crate::{validate_kernel_size, Result};
use ifp_core::Image;
use rayon::prelude::*;

pub const DEFAULT_MORPH_KERNEL_SIZE: u32 = 3;
pub const DEFAULT_MORPH_ITERATIONS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphType {
    Erode,
    Dilate,
}

/// Binary neighbourhood stored as offsets from the anchor (the centre).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    size: u32,
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    /// Elliptical element inscribed in a `size` x `size` square.
    ///
    /// Row `dy` spans `round(r * sqrt(1 - dy^2 / r^2))` columns either side
    /// of the centre, with `r = size / 2`; a 3x3 element is a cross.
    pub fn ellipse(size: u32) -> Result<Self> {
        validate_kernel_size(size)?;
        let r = (size / 2) as i32;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut offsets = Vec::new();
        for dy in -r..=r {
            let dx = (r as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
            for ox in -dx..=dx {
                offsets.push((ox, dy));
            }
        }

        Ok(Self { size, offsets })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        self.offsets.contains(&(dx, dy))
    }
}

fn morph_once(current: &Image, element: &StructuringElement, op: MorphType) -> Image {
    let width = current.width() as i32;
    let height = current.height() as i32;
    let channels = current.channels() as usize;
    let src = current.as_raw();
    let mut output = current.blank_like();

    output
        .as_raw_mut()
        .par_chunks_mut(width as usize * channels)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for x in 0..width {
                for c in 0..channels {
                    let mut acc = match op {
                        MorphType::Erode => u8::MAX,
                        MorphType::Dilate => u8::MIN,
                    };
                    // Neighbours outside the image do not take part.
                    for &(kx, ky) in element.offsets() {
                        let px = x + kx;
                        let py = y + ky;
                        if px < 0 || px >= width || py < 0 || py >= height {
                            continue;
                        }
                        let val = src[(py as usize * width as usize + px as usize) * channels + c];
                        acc = match op {
                            MorphType::Erode => acc.min(val),
                            MorphType::Dilate => acc.max(val),
                        };
                    }
                    row[x as usize * channels + c] = acc;
                }
            }
        });

    output
}

pub fn morph(
    src: &Image,
    morph_type: MorphType,
    element: &StructuringElement,
    iterations: u32,
) -> Image {
    let mut output = src.clone();
    for _ in 0..iterations {
        output = morph_once(&output, element, morph_type);
    }
    output
}

/// Minimum over an elliptical neighbourhood, applied `iterations` times.
pub fn erode(image: &Image, kernel_size: u32, iterations: u32) -> Result<Image> {
    let element = StructuringElement::ellipse(kernel_size)?;
    Ok(morph(image, MorphType::Erode, &element, iterations))
}

/// Maximum over an elliptical neighbourhood, applied `iterations` times.
pub fn dilate(image: &Image, kernel_size: u32, iterations: u32) -> Result<Image> {
    let element = StructuringElement::ellipse(kernel_size)?;
    Ok(morph(image, MorphType::Dilate, &element, iterations))
}

pub fn erode_default(image: &Image) -> Result<Image> {
    erode(image, DEFAULT_MORPH_KERNEL_SIZE, DEFAULT_MORPH_ITERATIONS)
}

pub fn dilate_default(image: &Image) -> Result<Image> {
    dilate(image, DEFAULT_MORPH_KERNEL_SIZE, DEFAULT_MORPH_ITERATIONS)
}

/// Erosion followed by dilation with the same element and iteration count.
pub fn open(image: &Image, kernel_size: u32, iterations: u32) -> Result<Image> {
    let element = StructuringElement::ellipse(kernel_size)?;
    let eroded = morph(image, MorphType::Erode, &element, iterations);
    Ok(morph(&eroded, MorphType::Dilate, &element, iterations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_3_is_a_cross() {
        let se = StructuringElement::ellipse(3).unwrap();
        assert_eq!(se.offsets().len(), 5);
        assert!(se.contains(0, 0));
        assert!(se.contains(-1, 0));
        assert!(se.contains(0, 1));
        assert!(!se.contains(1, 1));
    }

    #[test]
    fn ellipse_5_drops_only_corners() {
        let se = StructuringElement::ellipse(5).unwrap();
        // Rows: 1, 5, 5, 5, 1 -> dx = 0, 2, 2, 2, 0
        assert_eq!(se.offsets().len(), 17);
        assert!(se.contains(2, 1));
        assert!(!se.contains(1, 2));
        assert!(se.contains(0, -2));
    }

    #[test]
    fn ellipse_1_is_identity() {
        let se = StructuringElement::ellipse(1).unwrap();
        assert_eq!(se.offsets(), &[(0, 0)]);
    }

    #[test]
    fn even_or_zero_sizes_are_rejected() {
        assert!(StructuringElement::ellipse(4).is_err());
        assert!(StructuringElement::ellipse(0).is_err());
        let img = Image::new(4, 4, 1).unwrap();
        assert!(erode(&img, 2, 1).is_err());
    }

    #[test]
    fn dilate_grows_single_pixel_into_cross() {
        let mut img = Image::new(7, 7, 1).unwrap();
        img.put_pixel(3, 3, &[255]);
        let out = dilate_default(&img).unwrap();
        assert_eq!(out.pixel(2, 3), &[255]);
        assert_eq!(out.pixel(3, 4), &[255]);
        assert_eq!(out.pixel(2, 2), &[0]);
        assert_eq!(out.as_raw().iter().filter(|&&v| v == 255).count(), 5);
    }

    #[test]
    fn erode_removes_isolated_pixel() {
        let mut img = Image::new(7, 7, 1).unwrap();
        img.put_pixel(3, 3, &[255]);
        let out = erode_default(&img).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn zero_iterations_copy_input() {
        let mut img = Image::new(5, 5, 1).unwrap();
        img.put_pixel(1, 1, &[9]);
        assert_eq!(erode(&img, 3, 0).unwrap(), img);
    }

    #[test]
    fn foreground_touching_border_survives_erosion() {
        let img = Image::filled(6, 6, &[255]).unwrap();
        let out = erode(&img, 3, 2).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 255));
    }
}
