use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame};
use image::RgbImage;

/// Stretch intensities so the darkest subpixel maps to 0 and the brightest to 255.
///
/// Min/max are taken over all channels together, so channel balance is kept.
/// Input that already spans the full range is returned unchanged.
pub fn apply(frame: Frame) -> Result<Frame, FilterError> {
    frame.require("auto_level", ColorSpace::Rgb)?;
    let (min_val, max_val) = find_min_max(frame.pixels());

    // Flat image, or nothing to stretch
    if max_val <= min_val || (min_val == 0 && max_val == 255) {
        return Ok(frame);
    }

    let range = (max_val - min_val) as f32;
    Ok(frame.map_subpixels(|v| saturate_u8((v - min_val) as f32 / range * 255.0)))
}

fn find_min_max(img: &RgbImage) -> (u8, u8) {
    let mut min = 255u8;
    let mut max = 0u8;

    for &val in img.iter() {
        min = min.min(val);
        max = max.max(val);
    }

    (min, max)
}
