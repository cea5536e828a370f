//! In-memory raster shared by every filter stage.

use crate::error::FilterError;
use image::RgbImage;
use serde::Serialize;

/// Interleaved channels per pixel. Fixed for every frame.
pub const CHANNELS: usize = 3;

/// Representation actually stored in a frame's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Device-native RGB, the only space that is encoded to disk
    Rgb,
    /// Hue 0..180, saturation 0..255, value 0..255
    Hsv,
    /// Lightness scaled to 0..255, a/b offset by 128
    Lab,
}

/// Three-channel 8-bit image tagged with its color space.
///
/// Dimensions never change after construction; transforms build new frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: RgbImage,
    space: ColorSpace,
}

impl Frame {
    pub fn new(pixels: RgbImage, space: ColorSpace) -> Self {
        Self { pixels, space }
    }

    /// Wrap device-native RGB pixels
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self::new(pixels, ColorSpace::Rgb)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    pub fn space(&self) -> ColorSpace {
        self.space
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbImage {
        self.pixels
    }

    /// Fail unless the frame holds `expected` data.
    pub fn require(&self, step: &'static str, expected: ColorSpace) -> Result<(), FilterError> {
        if self.space == expected {
            Ok(())
        } else {
            Err(FilterError::UnsupportedColorSpace {
                step,
                expected,
                found: self.space,
            })
        }
    }

    /// New frame of the same size and space with every subpixel remapped.
    pub fn map_subpixels<F>(&self, mut f: F) -> Frame
    where
        F: FnMut(u8) -> u8,
    {
        let mut out = self.pixels.clone();
        for value in out.iter_mut() {
            *value = f(*value);
        }
        Frame::new(out, self.space)
    }
}

/// Round and saturate a floating point intensity into 0..=255.
#[inline]
pub fn saturate_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use image::Rgb;

    /// Deterministic xorshift stream for synthetic test pixels.
    pub struct Noise(u64);

    impl Noise {
        pub fn new(seed: u64) -> Self {
            Self(seed.max(1))
        }

        pub fn next_u8(&mut self) -> u8 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 >> 24) as u8
        }
    }

    /// Textured RGB frame: a diagonal gradient with seeded grain on top.
    pub fn textured_frame(width: u32, height: u32, seed: u64) -> Frame {
        let mut noise = Noise::new(seed);
        let pixels = RgbImage::from_fn(width, height, |x, y| {
            let base = ((x + y) * 255 / (width + height).max(1)) as u8;
            let grain = |n: u8| base.saturating_add(n / 4).saturating_sub(32);
            Rgb([
                grain(noise.next_u8()),
                grain(noise.next_u8()) / 2 + 60,
                grain(noise.next_u8()).saturating_add(20),
            ])
        });
        Frame::from_rgb(pixels)
    }
}
