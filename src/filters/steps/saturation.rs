use crate::color;
use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame};

/// Mild boost kept for a possible "vivid" look; no recipe uses it yet
pub const BOOST_FACTOR: f32 = 1.05;

/// Scale color intensity without touching hue or brightness.
pub fn apply(frame: Frame, factor: f32) -> Result<Frame, FilterError> {
    frame.require("saturation", ColorSpace::Rgb)?;
    let hsv = color::rgb_to_hsv(&frame)?;
    let scaled = scale_saturation(&hsv, factor)?;
    color::hsv_to_rgb(&scaled)
}

/// Multiply the S plane of an HSV frame, saturating at 255.
pub fn scale_saturation(hsv: &Frame, factor: f32) -> Result<Frame, FilterError> {
    hsv.require("scale_saturation", ColorSpace::Hsv)?;
    let mut planes = color::split(hsv);
    for value in planes[1].iter_mut() {
        *value = saturate_u8(*value as f32 * factor);
    }
    color::merge(&planes, ColorSpace::Hsv)
}

/// Gentle +5% saturation pass
pub fn boost(frame: Frame) -> Result<Frame, FilterError> {
    apply(frame, BOOST_FACTOR)
}
