use crate::{
    apply_detector, detect_blur, detect_vertical_line, find_blob, find_quadrilateral, Blob,
    BlobParams, BlurParams, BlurReport, LineEstimate, LineParams, RectDetector, Result,
    ShapeMatch, ShapeParams,
};
use ifp_core::{Image, Rect};

/// One detector and its parameters.
pub enum Pipeline<'a> {
    Sharpness(BlurParams),
    Rectangles(&'a dyn RectDetector),
    Blob(BlobParams),
    Line(LineParams),
    Shape(ShapeParams),
}

impl Pipeline<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Pipeline::Sharpness(_) => "sharpness",
            Pipeline::Rectangles(_) => "rectangles",
            Pipeline::Blob(_) => "blob",
            Pipeline::Line(_) => "line",
            Pipeline::Shape(_) => "shape",
        }
    }
}

/// Outcome of a single pipeline run; the variant matches the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    Sharpness(BlurReport),
    Rectangles(Vec<Rect>),
    Blob(Option<Blob>),
    Line(LineEstimate),
    Shape(Option<ShapeMatch>),
}

impl DetectionResult {
    /// False when the pipeline ran but found nothing.
    pub fn is_found(&self) -> bool {
        match self {
            DetectionResult::Sharpness(_) => true,
            DetectionResult::Rectangles(rects) => !rects.is_empty(),
            DetectionResult::Blob(blob) => blob.is_some(),
            DetectionResult::Line(line) => line.is_found(),
            DetectionResult::Shape(shape) => shape.is_some(),
        }
    }
}

pub fn run_pipeline(image: &Image, pipeline: &Pipeline<'_>) -> Result<DetectionResult> {
    let span = tracing::debug_span!("pipeline", name = pipeline.name());
    let _guard = span.enter();

    Ok(match pipeline {
        Pipeline::Sharpness(params) => DetectionResult::Sharpness(detect_blur(image, params)?),
        Pipeline::Rectangles(detector) => {
            DetectionResult::Rectangles(apply_detector(*detector, image))
        }
        Pipeline::Blob(params) => DetectionResult::Blob(find_blob(image, params)?),
        Pipeline::Line(params) => DetectionResult::Line(detect_vertical_line(image, params)?),
        Pipeline::Shape(params) => DetectionResult::Shape(find_quadrilateral(image, params)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_pipeline_yields_its_own_variant() {
        let img = Image::filled(32, 32, &[40, 40, 40]).unwrap();
        let detector = |_: &Image| -> Vec<Rect> { vec![Rect::new(1, 2, 3, 4)] };

        let sharp = run_pipeline(&img, &Pipeline::Sharpness(BlurParams::default())).unwrap();
        assert!(matches!(sharp, DetectionResult::Sharpness(r) if r.blurry));

        let rects = run_pipeline(&img, &Pipeline::Rectangles(&detector)).unwrap();
        assert_eq!(rects, DetectionResult::Rectangles(vec![Rect::new(1, 2, 3, 4)]));

        let blob = run_pipeline(&img, &Pipeline::Blob(BlobParams::default())).unwrap();
        assert_eq!(blob, DetectionResult::Blob(None));
        assert!(!blob.is_found());

        let line = run_pipeline(&img, &Pipeline::Line(LineParams::default())).unwrap();
        assert_eq!(line, DetectionResult::Line(LineEstimate::NotFound));

        let shape = run_pipeline(&img, &Pipeline::Shape(ShapeParams::default())).unwrap();
        assert_eq!(shape, DetectionResult::Shape(None));
    }
}
