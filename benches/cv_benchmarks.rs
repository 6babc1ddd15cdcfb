//! Benchmarks for the pixel primitives and the detection pipelines

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ifp::imgproc::{canny, dilate, erode, find_external_contours, gaussian_blur, to_grayscale, to_hsv};
use ifp::objdetect::{
    detect_blur, detect_vertical_line, find_blob, find_quadrilateral, BlobParams, BlurParams,
    LineParams, ShapeParams,
};
use ifp::Image;
use std::time::Duration;

/// BGR scene with a green disc, a white square and a bright vertical line.
fn create_scene(size: u32) -> Image {
    let mut img = Image::new(size, size, 3).unwrap();
    let s = size as i32;
    let (cx, cy, r) = (s / 4, s / 4, s / 8);
    for y in 0..s {
        for x in 0..s {
            if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                img.put_pixel(x as u32, y as u32, &[0, 255, 0]);
            } else if x > s / 2 && x < 3 * s / 4 && y > s / 2 && y < 3 * s / 4 {
                img.put_pixel(x as u32, y as u32, &[255, 255, 255]);
            } else if x == 7 * s / 8 {
                img.put_pixel(x as u32, y as u32, &[255, 255, 255]);
            }
        }
    }
    img
}

fn benchmark_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    for size in [128u32, 256, 512] {
        let scene = create_scene(size);
        let gray = to_grayscale(&scene).unwrap();
        let label = format!("{}x{}", size, size);

        group.bench_with_input(BenchmarkId::new("to_hsv", &label), &scene, |b, img| {
            b.iter(|| to_hsv(black_box(img)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("gaussian_blur_11", &label), &scene, |b, img| {
            b.iter(|| gaussian_blur(black_box(img), 11).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("erode_dilate", &label), &gray, |b, img| {
            b.iter(|| dilate(&erode(black_box(img), 3, 2).unwrap(), 3, 2).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("canny", &label), &gray, |b, img| {
            b.iter(|| canny(black_box(img), 75.0, 200.0).unwrap());
        });

        let edges = canny(&gray, 75.0, 200.0).unwrap();
        group.bench_with_input(BenchmarkId::new("contours", &label), &edges, |b, img| {
            b.iter(|| find_external_contours(black_box(img)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipelines");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    for size in [256u32, 512] {
        let scene = create_scene(size);
        let label = format!("{}x{}", size, size);

        group.bench_with_input(BenchmarkId::new("blur", &label), &scene, |b, img| {
            b.iter(|| detect_blur(black_box(img), &BlurParams::default()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("blob", &label), &scene, |b, img| {
            b.iter(|| find_blob(black_box(img), &BlobParams::default()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("line", &label), &scene, |b, img| {
            b.iter(|| detect_vertical_line(black_box(img), &LineParams::default()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("shape", &label), &scene, |b, img| {
            b.iter(|| find_quadrilateral(black_box(img), &ShapeParams::default()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_primitives, benchmark_pipelines);
criterion_main!(benches);
