use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame};

/// Affine brightness/contrast: `out = in * scale + offset`, saturated.
pub fn apply(frame: Frame, scale: f32, offset: f32) -> Result<Frame, FilterError> {
    frame.require("affine", ColorSpace::Rgb)?;
    Ok(frame.map_subpixels(|v| saturate_u8(v as f32 * scale + offset)))
}
