use crate::{require_channels, validate_kernel_size, ImgprocError, Result};
use ifp_core::{FloatImage, Image};
use rayon::prelude::*;

/// Correlation kernel with odd dimensions, anchored at its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl Kernel {
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width % 2 == 0 || height % 2 == 0 {
            return Err(ImgprocError::InvalidParameter(format!(
                "kernel dimensions must be positive and odd, got {width}x{height}"
            )));
        }
        if data.len() != width * height {
            return Err(ImgprocError::InvalidParameter(format!(
                "kernel data has {} weights, expected {}",
                data.len(),
                width * height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_slice(data: &[f64], width: usize, height: usize) -> Result<Self> {
        Self::new(data.to_vec(), width, height)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn center(&self) -> (isize, isize) {
        ((self.width / 2) as isize, (self.height / 2) as isize)
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    pub fn weights(&self) -> &[f64] {
        &self.data
    }
}

pub fn laplacian_kernel() -> Kernel {
    Kernel {
        data: vec![0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0],
        width: 3,
        height: 3,
    }
}

pub fn sobel_kernels() -> (Kernel, Kernel) {
    let gx = Kernel {
        data: vec![-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0],
        width: 3,
        height: 3,
    };
    let gy = Kernel {
        data: vec![-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0],
        width: 3,
        height: 3,
    };
    (gx, gy)
}

/// Sigma used for a Gaussian of `kernel_size` taps when none is given.
pub fn gaussian_sigma(kernel_size: u32) -> f64 {
    0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

pub fn gaussian_kernel_1d(size: usize, sigma: f64) -> Vec<f64> {
    let center = (size / 2) as isize;
    let sigma2 = sigma * sigma;

    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = (i as isize - center) as f64;
            (-(x * x) / (2.0 * sigma2)).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    if sum != 0.0 {
        for v in &mut kernel {
            *v /= sum;
        }
    }
    kernel
}

#[inline]
fn replicate(coord: isize, len: usize) -> usize {
    coord.clamp(0, len as isize - 1) as usize
}

#[inline]
fn saturate_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn correlate_at(
    src: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &Kernel,
    x: usize,
    y: usize,
    c: usize,
) -> f64 {
    let (kx_center, ky_center) = kernel.center();
    let mut sum = 0.0f64;
    for ky in 0..kernel.height {
        let sy = replicate(y as isize + ky as isize - ky_center, height);
        let row = sy * width;
        for kx in 0..kernel.width {
            let sx = replicate(x as isize + kx as isize - kx_center, width);
            sum += src[(row + sx) * channels + c] as f64 * kernel.get(kx, ky);
        }
    }
    sum
}

/// 2D correlation with replicated borders. Every channel is filtered on its
/// own and the result is rounded and saturated to 8 bits.
pub fn convolve(image: &Image, kernel: &Kernel) -> Image {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let channels = image.channels() as usize;
    let src = image.as_raw();
    let mut output = image.blank_like();

    output
        .as_raw_mut()
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                for c in 0..channels {
                    let sum = correlate_at(src, width, height, channels, kernel, x, y, c);
                    row[x * channels + c] = saturate_u8(sum);
                }
            }
        });

    output
}

/// Same correlation as [`convolve`] on a single-channel image, keeping the
/// signed response.
pub fn convolve_f64(image: &Image, kernel: &Kernel) -> Result<FloatImage> {
    require_channels(image, 1, "floating-point convolution")?;
    let width = image.width() as usize;
    let height = image.height() as usize;
    let src = image.as_raw();
    let mut output = FloatImage::new(image.width(), image.height())?;

    output
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = correlate_at(src, width, height, 1, kernel, x, y, 0);
            }
        });

    Ok(output)
}

/// Row pass with `kx` followed by a column pass with `ky`, both odd-length.
pub fn separable_convolve(image: &Image, kx: &[f64], ky: &[f64]) -> Result<Image> {
    if kx.len() % 2 == 0 || ky.len() % 2 == 0 {
        return Err(ImgprocError::InvalidParameter(format!(
            "separable kernels must have odd lengths, got {} and {}",
            kx.len(),
            ky.len()
        )));
    }

    let width = image.width() as usize;
    let height = image.height() as usize;
    let channels = image.channels() as usize;
    let stride = width * channels;
    let rx = (kx.len() / 2) as isize;
    let ry = (ky.len() / 2) as isize;
    let src = image.as_raw();

    let mut tmp = vec![0.0f64; stride * height];
    tmp.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row = &src[y * stride..(y + 1) * stride];
            for x in 0..width {
                for c in 0..channels {
                    let mut sum = 0.0;
                    for (k, &w) in kx.iter().enumerate() {
                        let sx = replicate(x as isize + k as isize - rx, width);
                        sum += row[sx * channels + c] as f64 * w;
                    }
                    row_out[x * channels + c] = sum;
                }
            }
        });

    let mut output = image.blank_like();
    output
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (i, out) in row_out.iter_mut().enumerate() {
                let mut sum = 0.0;
                for (k, &w) in ky.iter().enumerate() {
                    let sy = replicate(y as isize + k as isize - ry, height);
                    sum += tmp[sy * stride + i] * w;
                }
                *out = saturate_u8(sum);
            }
        });

    Ok(output)
}

/// Gaussian blur with a square kernel of `kernel_size` taps and the sigma
/// derived from that size.
pub fn gaussian_blur(image: &Image, kernel_size: u32) -> Result<Image> {
    validate_kernel_size(kernel_size)?;
    let taps = gaussian_kernel_1d(kernel_size as usize, gaussian_sigma(kernel_size));
    separable_convolve(image, &taps, &taps)
}

/// Discrete Laplacian of a single-channel image, unsaturated.
pub fn laplacian(image: &Image) -> Result<FloatImage> {
    convolve_f64(image, &laplacian_kernel())
}
