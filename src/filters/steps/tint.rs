use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame};

/// Add a fixed per-channel bias (R, G, B), saturated.
pub fn apply(frame: Frame, bias: [f32; 3]) -> Result<Frame, FilterError> {
    frame.require("tint", ColorSpace::Rgb)?;
    let mut out = frame.into_pixels();
    for pixel in out.pixels_mut() {
        for (value, shift) in pixel.0.iter_mut().zip(bias) {
            *value = saturate_u8(*value as f32 + shift);
        }
    }
    Ok(Frame::from_rgb(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_warm_tint_adds_more_to_red() {
        let img = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let result = apply(Frame::from_rgb(img), [15.0, 10.0, 5.0]).unwrap();
        assert_eq!(result.pixels().get_pixel(1, 1).0, [115, 110, 105]);
    }

    #[test]
    fn test_tint_clamps_at_white() {
        let img = RgbImage::from_pixel(2, 2, Rgb([250, 240, 255]));
        let result = apply(Frame::from_rgb(img), [20.0, 15.0, 10.0]).unwrap();
        assert_eq!(result.pixels().get_pixel(0, 0).0, [255, 255, 255]);
    }
}
