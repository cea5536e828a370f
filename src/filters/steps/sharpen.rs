use crate::error::FilterError;
use crate::frame::{ColorSpace, Frame};
use image::RgbImage;
use imageproc::filter::filter3x3;

/// Unsharp-style kernel: neighbours -0.1, center 1.8. Weights sum to 1.0
/// so average brightness is kept while local contrast rises.
pub const KERNEL: [f32; 9] = [-0.1, -0.1, -0.1, -0.1, 1.8, -0.1, -0.1, -0.1, -0.1];

/// Apply the 3x3 sharpening convolution to every channel
pub fn apply(frame: Frame) -> Result<Frame, FilterError> {
    frame.require("sharpen", ColorSpace::Rgb)?;
    let sharpened: RgbImage = filter3x3(frame.pixels(), &KERNEL);
    Ok(Frame::from_rgb(sharpened))
}
