use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame};

/// Darkening multiplier for the pixel at column `x`, row `y`.
///
/// 1.0 at the image center, `1 - strength` at distance `max_distance`
/// (center to the (0, 0) corner), linear in between.
pub fn factor(x: u32, y: u32, width: u32, height: u32, strength: f64) -> f64 {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let max_distance = (cx * cx + cy * cy).sqrt();
    if max_distance == 0.0 {
        return 1.0;
    }

    let dx = x as f64 - cx;
    let dy = y as f64 - cy;
    let distance = (dx * dx + dy * dy).sqrt();
    1.0 - (distance / max_distance) * strength
}

/// Radial vignette: scale every channel by the pixel's factor, saturated.
pub fn apply(frame: Frame, strength: f32) -> Result<Frame, FilterError> {
    frame.require("vignette", ColorSpace::Rgb)?;
    let (width, height) = frame.dimensions();
    let mut out = frame.into_pixels();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let f = factor(x, y, width, height, strength as f64);
        for value in pixel.0.iter_mut() {
            *value = saturate_u8((*value as f64 * f) as f32);
        }
    }
    Ok(Frame::from_rgb(out))
}
