use crate::{Error, Rect, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};

pub const MAX_CHANNELS: u8 = 4;

fn validate_shape(width: u32, height: u32, channels: u8) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions(format!(
            "image dimensions must be non-zero, got {width}x{height}"
        )));
    }
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(Error::InvalidDimensions(format!(
            "channel count must be between 1 and {MAX_CHANNELS}, got {channels}"
        )));
    }
    Ok(())
}

fn sample_count(width: u32, height: u32, channels: u8) -> usize {
    width as usize * height as usize * channels as usize
}

/// Interleaved 8-bit image, row-major. Three-channel images are BGR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Image {
    /// Zero-filled image.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self> {
        validate_shape(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0; sample_count(width, height, channels)],
        })
    }

    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        validate_shape(width, height, channels)?;
        let expected = sample_count(width, height, channels);
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Image with every pixel set to `pixel`; the channel count is `pixel.len()`.
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Result<Self> {
        let channels = u8::try_from(pixel.len()).map_err(|_| {
            Error::InvalidDimensions(format!("too many channels: {}", pixel.len()))
        })?;
        validate_shape(width, height, channels)?;
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(sample_count(width, height, channels))
            .collect();
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn is_gray(&self) -> bool {
        self.channels == 1
    }

    /// Number of samples in one row.
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} image",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Samples of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let offset = self.pixel_offset(x, y);
        &self.data[offset..offset + self.channels as usize]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let offset = self.pixel_offset(x, y);
        let channels = self.channels as usize;
        &mut self.data[offset..offset + channels]
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds or when
    /// `value` has the wrong number of samples.
    pub fn put_pixel(&mut self, x: u32, y: u32, value: &[u8]) {
        self.pixel_mut(x, y).copy_from_slice(value);
    }

    /// Zeroed image with the same dimensions and channel count.
    pub fn blank_like(&self) -> Image {
        Image {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: vec![0; self.data.len()],
        }
    }

    /// Zeroed single-channel image with the same dimensions.
    pub fn gray_like(&self) -> Image {
        Image {
            width: self.width,
            height: self.height,
            channels: 1,
            data: vec![0; self.width as usize * self.height as usize],
        }
    }

    /// Copy of the region of interest `rect`, which must lie inside the image.
    pub fn region(&self, rect: Rect) -> Result<Image> {
        let bounds = Rect::new(0, 0, self.width, self.height);
        if rect.is_empty() || !bounds.contains_rect(&rect) {
            return Err(Error::InvalidParameter(format!(
                "region {rect:?} is empty or outside the {}x{} image",
                self.width, self.height
            )));
        }

        let channels = self.channels as usize;
        let stride = self.row_stride();
        let x0 = rect.x as usize * channels;
        let run = rect.width as usize * channels;
        let mut data = Vec::with_capacity(run * rect.height as usize);
        for y in rect.y as usize..rect.y as usize + rect.height as usize {
            let start = y * stride + x0;
            data.extend_from_slice(&self.data[start..start + run]);
        }
        Image::from_raw(rect.width, rect.height, self.channels, data)
    }

    pub fn from_gray_image(gray: &GrayImage) -> Result<Self> {
        Self::from_raw(gray.width(), gray.height(), 1, gray.as_raw().clone())
    }

    /// Convert an RGB buffer into BGR sample order.
    pub fn from_rgb_image(rgb: &RgbImage) -> Result<Self> {
        let data = rgb
            .pixels()
            .flat_map(|Rgb([r, g, b])| [*b, *g, *r])
            .collect();
        Self::from_raw(rgb.width(), rgb.height(), 3, data)
    }

    pub fn to_gray_image(&self) -> Result<GrayImage> {
        self.expect_channels(1)?;
        let mut gray = GrayImage::new(self.width, self.height);
        for (out, &v) in gray.pixels_mut().zip(self.data.iter()) {
            *out = Luma([v]);
        }
        Ok(gray)
    }

    /// Convert a BGR image into an RGB buffer for rendering or encoding.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        self.expect_channels(3)?;
        let mut rgb = RgbImage::new(self.width, self.height);
        for (out, px) in rgb.pixels_mut().zip(self.data.chunks_exact(3)) {
            *out = Rgb([px[2], px[1], px[0]]);
        }
        Ok(rgb)
    }

    pub fn expect_channels(&self, expected: u8) -> Result<()> {
        if self.channels != expected {
            return Err(Error::UnsupportedChannels {
                expected,
                actual: self.channels,
            });
        }
        Ok(())
    }
}

/// Single-channel `f64` buffer holding signed, unsaturated filter responses.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl FloatImage {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        validate_shape(width, height, 1)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; sample_count(width, height, 1)],
        })
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<f64>) -> Result<Self> {
        validate_shape(width, height, 1)?;
        let expected = sample_count(width, height, 1);
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sized_images() {
        assert!(matches!(
            Image::new(0, 10, 1),
            Err(Error::InvalidDimensions(_))
        ));
        assert!(Image::new(10, 10, 0).is_err());
        assert!(Image::new(10, 10, 5).is_err());
    }

    #[test]
    fn from_raw_checks_length() {
        let err = Image::from_raw(2, 2, 3, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            Error::BufferSize {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn filled_repeats_pixel() {
        let img = Image::filled(3, 2, &[1, 2, 3]).unwrap();
        assert_eq!(img.channels(), 3);
        assert_eq!(img.pixel(2, 1), &[1, 2, 3]);
        assert_eq!(img.as_raw().len(), 18);
    }

    #[test]
    fn region_copies_samples() {
        let mut img = Image::new(6, 4, 1).unwrap();
        img.put_pixel(3, 2, &[200]);
        let roi = img.region(Rect::new(2, 1, 3, 2)).unwrap();
        assert_eq!(roi.dimensions(), (3, 2));
        assert_eq!(roi.pixel(1, 1), &[200]);
        assert_eq!(roi.as_raw().iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn region_outside_image_fails() {
        let img = Image::new(6, 4, 1).unwrap();
        assert!(img.region(Rect::new(4, 0, 3, 2)).is_err());
        assert!(img.region(Rect::new(-1, 0, 2, 2)).is_err());
        assert!(img.region(Rect::new(0, 0, 0, 2)).is_err());
    }

    #[test]
    fn rgb_round_trip_swaps_channel_order() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, Rgb([10, 20, 30]));
        let bgr = Image::from_rgb_image(&rgb).unwrap();
        assert_eq!(bgr.pixel(0, 0), &[30, 20, 10]);
        assert_eq!(bgr.to_rgb_image().unwrap(), rgb);
    }

    #[test]
    fn gray_conversion_requires_one_channel() {
        let img = Image::new(2, 2, 3).unwrap();
        assert_eq!(
            img.to_gray_image().unwrap_err(),
            Error::UnsupportedChannels {
                expected: 1,
                actual: 3
            }
        );
    }
}
