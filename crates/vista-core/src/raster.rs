use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use ndarray::Array2;

use crate::error::{Result, ViewError};

/// Interleaved 8-bit pixel layout of a [`Raster`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            _ => Err(ViewError::UnsupportedPixelLayout { channels }),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// An immutable 8-bit raster, row-major with interleaved channels.
///
/// Handing a `Raster` to the view moves it: the view owns the pixels
/// exclusively until the next assignment. Hosts that want to keep their own
/// copy clone it explicitly before assigning.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap a raw pixel buffer, validating layout and size.
    pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        let format = PixelFormat::from_channels(channels)?;
        if width == 0 || height == 0 {
            return Err(ViewError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(ViewError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// A raster with every byte set to `value`.
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: u8) -> Result<Self> {
        let len = width as usize * height as usize * format.channels();
        Self::from_raw(width, height, format.channels(), vec![value; len])
    }

    /// Convert a decoded `image` buffer. Only 8-bit gray, RGB and RGBA are accepted.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        let (w, h) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(buf) => Self::from_raw(w, h, 1, buf.as_raw().clone()),
            DynamicImage::ImageRgb8(buf) => Self::from_raw(w, h, 3, buf.as_raw().clone()),
            DynamicImage::ImageRgba8(buf) => Self::from_raw(w, h, 4, buf.as_raw().clone()),
            other => Err(ViewError::UnsupportedColorType(format!("{:?}", other.color()))),
        }
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        let (w, h) = (self.width, self.height);
        let data = self.data.clone();
        // Dimensions were validated on construction, so from_raw cannot fail.
        match self.format {
            PixelFormat::Gray => GrayImage::from_raw(w, h, data)
                .map(DynamicImage::ImageLuma8)
                .unwrap_or_else(|| DynamicImage::new_luma8(w, h)),
            PixelFormat::Rgb => RgbImage::from_raw(w, h, data)
                .map(DynamicImage::ImageRgb8)
                .unwrap_or_else(|| DynamicImage::new_rgb8(w, h)),
            PixelFormat::Rgba => RgbaImage::from_raw(w, h, data)
                .map(DynamicImage::ImageRgba8)
                .unwrap_or_else(|| DynamicImage::new_rgba8(w, h)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of the pixel at `(x, y)`; `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * c;
        Some(&self.data[start..start + c])
    }

    /// Split into one f32 plane per channel, values in [0, 255].
    pub fn to_planes(&self) -> Vec<Array2<f32>> {
        let (w, h) = (self.width as usize, self.height as usize);
        let c = self.channels();
        (0..c)
            .map(|ch| {
                Array2::from_shape_fn((h, w), |(row, col)| {
                    self.data[(row * w + col) * c + ch] as f32
                })
            })
            .collect()
    }

    /// Interleave planes back into a raster, rounding and clamping to u8.
    pub fn from_planes(planes: &[Array2<f32>], format: PixelFormat) -> Result<Self> {
        let c = format.channels();
        if planes.len() != c {
            return Err(ViewError::UnsupportedPixelLayout {
                channels: planes.len(),
            });
        }
        let (h, w) = planes[0].dim();
        let mut data = Vec::with_capacity(h * w * c);
        for row in 0..h {
            for col in 0..w {
                for plane in planes {
                    data.push(plane[[row, col]].round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        Self::from_raw(w as u32, h as u32, c, data)
    }
}
