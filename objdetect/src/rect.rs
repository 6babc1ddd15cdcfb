use crate::Result;
use ifp_core::{Image, Rect};

/// Pretrained rectangle detector, e.g. a face cascade. Closures taking an
/// image and returning rectangles implement it too.
pub trait RectDetector {
    fn detect(&self, image: &Image) -> Vec<Rect>;
}

impl<F> RectDetector for F
where
    F: Fn(&Image) -> Vec<Rect>,
{
    fn detect(&self, image: &Image) -> Vec<Rect> {
        self(image)
    }
}

pub fn apply_detector<D: RectDetector + ?Sized>(detector: &D, image: &Image) -> Vec<Rect> {
    let rects = detector.detect(image);
    tracing::debug!(count = rects.len(), "detector applied");
    rects
}

/// Run the detector on `roi` only. Rectangles are relative to the region.
pub fn apply_detector_to_region<D: RectDetector + ?Sized>(
    detector: &D,
    image: &Image,
    roi: Rect,
) -> Result<Vec<Rect>> {
    let region = image.region(roi)?;
    Ok(apply_detector(detector, &region))
}

/// Like [`apply_detector_to_region`] with the results in full-image coordinates.
pub fn detect_in_region_absolute<D: RectDetector + ?Sized>(
    detector: &D,
    image: &Image,
    roi: Rect,
) -> Result<Vec<Rect>> {
    Ok(apply_detector_to_region(detector, image, roi)?
        .into_iter()
        .map(|local| offset_rect(roi, local))
        .collect())
}

/// Translate a rectangle found inside `containing` into the coordinates
/// `containing` itself is expressed in.
pub fn offset_rect(containing: Rect, local: Rect) -> Rect {
    Rect::new(
        containing.x + local.x,
        containing.y + local.y,
        local.width,
        local.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DetectError;

    /// Bounding box of all non-zero pixels, if any.
    fn bright_box(image: &Image) -> Vec<Rect> {
        let mut hits = Vec::new();
        for y in 0..image.height() {
            for x in 0..image.width() {
                if image.pixel(x, y)[0] > 0 {
                    hits.push((x, y));
                }
            }
        }
        if hits.is_empty() {
            return Vec::new();
        }
        let x0 = hits.iter().map(|p| p.0).min().unwrap();
        let y0 = hits.iter().map(|p| p.1).min().unwrap();
        let x1 = hits.iter().map(|p| p.0).max().unwrap();
        let y1 = hits.iter().map(|p| p.1).max().unwrap();
        vec![Rect::new(x0 as i32, y0 as i32, x1 - x0 + 1, y1 - y0 + 1)]
    }

    fn scene() -> Image {
        let mut img = Image::new(50, 40, 1).unwrap();
        for y in 20..25 {
            for x in 30..36 {
                img.put_pixel(x, y, &[200]);
            }
        }
        img
    }

    #[test]
    fn offset_rect_adds_origin() {
        let roi = Rect::new(10, 20, 100, 80);
        let local = Rect::new(3, 4, 5, 6);
        assert_eq!(offset_rect(roi, local), Rect::new(13, 24, 5, 6));
    }

    #[test]
    fn closures_are_detectors() {
        let img = scene();
        let found = apply_detector(&bright_box, &img);
        assert_eq!(found, vec![Rect::new(30, 20, 6, 5)]);

        let nothing = |_: &Image| -> Vec<Rect> { Vec::new() };
        assert!(apply_detector(&nothing, &img).is_empty());
    }

    #[test]
    fn region_results_are_local_until_offset() {
        let img = scene();
        let roi = Rect::new(25, 15, 20, 20);
        let local = apply_detector_to_region(&bright_box, &img, roi).unwrap();
        assert_eq!(local, vec![Rect::new(5, 5, 6, 5)]);
        let absolute = detect_in_region_absolute(&bright_box, &img, roi).unwrap();
        assert_eq!(absolute, vec![Rect::new(30, 20, 6, 5)]);
    }

    #[test]
    fn region_outside_image_fails() {
        let img = scene();
        let err = apply_detector_to_region(&bright_box, &img, Rect::new(40, 30, 20, 20));
        assert!(matches!(err, Err(DetectError::Core(_))));
    }
}
