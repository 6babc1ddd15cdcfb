use ifp_core::{Circle, Error, Image, Rect};
use image::{GrayImage, Luma};
use nalgebra::Point2;

#[test]
fn test_gray_image_interop() {
    let mut gray = GrayImage::new(8, 6);
    gray.put_pixel(3, 2, Luma([99]));

    let img = Image::from_gray_image(&gray).unwrap();
    assert!(img.is_gray());
    assert_eq!(img.dimensions(), (8, 6));
    assert_eq!(img.pixel(3, 2), &[99]);
    assert_eq!(img.to_gray_image().unwrap(), gray);
}

#[test]
fn test_region_of_interest_with_rect_corners() {
    let mut img = Image::new(20, 10, 3).unwrap();
    img.put_pixel(12, 6, &[1, 2, 3]);

    let roi = Rect::new(10, 5, 4, 3);
    assert_eq!(roi.min_point(), (10, 5));
    assert_eq!(roi.max_point(), (14, 8));

    let sub = img.region(roi).unwrap();
    assert_eq!(sub.dimensions(), (4, 3));
    assert_eq!(sub.channels(), 3);
    assert_eq!(sub.pixel(2, 1), &[1, 2, 3]);
    assert_eq!(sub.row_stride(), 12);
}

#[test]
fn test_region_rejects_out_of_bounds() {
    let img = Image::new(20, 10, 1).unwrap();
    assert!(matches!(
        img.region(Rect::new(18, 0, 4, 4)),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_translate_matches_offset_semantics() {
    let local = Rect::new(2, 3, 7, 8);
    assert_eq!(local.translate(10, 20), Rect::new(12, 23, 7, 8));
}

#[test]
fn test_circle_containment() {
    let circle = Circle::new(Point2::new(10.0, 10.0), 2.0);
    assert!(circle.contains(&Point2::new(12.0, 10.0), 1e-9));
    assert!(!circle.contains(&Point2::new(12.5, 10.0), 1e-9));
}
