//! Individual filter steps

pub mod clahe;
pub mod contrast;
pub mod denoise;
pub mod levels;
pub mod local_contrast;
pub mod resize;
pub mod saturation;
pub mod sharpen;
pub mod tint;
pub mod vignette;
