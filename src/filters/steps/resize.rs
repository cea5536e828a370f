use crate::error::FilterError;
use crate::frame::{ColorSpace, Frame};
use image::imageops::{self, FilterType};

/// Gentle super-resolution factor
pub const DEFAULT_UPSCALE: f32 = 1.2;

/// Bicubic upscale by `factor`. Changes dimensions, so it is never part of
/// a look; kept as a standalone utility.
pub fn upscale(frame: Frame, factor: f32) -> Result<Frame, FilterError> {
    frame.require("upscale", ColorSpace::Rgb)?;
    if !(factor.is_finite() && factor > 0.0) {
        return Err(FilterError::InvalidResult(format!(
            "upscale factor must be positive, got {}",
            factor
        )));
    }

    let (width, height) = frame.dimensions();
    let new_width = ((width as f32 * factor).round() as u32).max(1);
    let new_height = ((height as f32 * factor).round() as u32).max(1);

    let resized = imageops::resize(frame.pixels(), new_width, new_height, FilterType::CatmullRom);
    Ok(Frame::from_rgb(resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_upscale_grows_by_factor() {
        let frame = Frame::from_rgb(RgbImage::new(100, 50));
        let result = upscale(frame, DEFAULT_UPSCALE).unwrap();
        assert_eq!(result.dimensions(), (120, 60));
    }

    #[test]
    fn test_upscale_rejects_bad_factor() {
        let frame = Frame::from_rgb(RgbImage::new(10, 10));
        assert!(upscale(frame.clone(), 0.0).is_err());
        assert!(upscale(frame, f32::NAN).is_err());
    }
}
