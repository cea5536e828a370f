//! Base enhancement: denoise, white balance, auto-level.
//!
//! Usable on its own as a clean-up pass. The looks call the individual
//! steps directly instead of this pass, and only Ollie repeats the white
//! balance after denoising.

use super::pipeline::{FilterRecipe, Step};
use super::steps::denoise::DenoiseParams;
use super::steps::local_contrast::WHITE_BALANCE_CLIP_LIMIT;
use crate::error::FilterError;
use crate::frame::Frame;

/// Output name of the base pass when rendered next to the looks
pub const CLEAN_NAME: &str = "Clean";

const BASE: &[Step] = &[
    Step::Denoise(DenoiseParams::LIGHT),
    Step::LocalContrast {
        clip_limit: WHITE_BALANCE_CLIP_LIMIT,
    },
    Step::AutoLevel,
];

/// The base pass as a recipe
pub fn recipe() -> FilterRecipe {
    FilterRecipe::new(CLEAN_NAME, BASE.to_vec())
}

/// Run the base pass on a copy of `source`
pub fn process(source: &Frame) -> Result<Frame, FilterError> {
    Ok(recipe().apply(source)?.frame)
}
