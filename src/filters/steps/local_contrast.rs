use super::clahe;
use crate::color;
use crate::error::FilterError;
use crate::frame::{ColorSpace, Frame};

/// Moderate clip limit used for white balance; avoids haloing
pub const WHITE_BALANCE_CLIP_LIMIT: f32 = 1.5;

/// CLAHE on lightness only: RGB -> Lab, equalize L, back to RGB.
pub fn apply(frame: Frame, clip_limit: f32) -> Result<Frame, FilterError> {
    frame.require("local_contrast", ColorSpace::Rgb)?;
    let lab = color::rgb_to_lab(&frame)?;
    let equalized = equalize_lightness(&lab, clip_limit)?;
    color::lab_to_rgb(&equalized)
}

/// Equalize the L plane of a Lab frame, leaving a and b untouched.
pub fn equalize_lightness(lab: &Frame, clip_limit: f32) -> Result<Frame, FilterError> {
    lab.require("equalize_lightness", ColorSpace::Lab)?;
    let mut planes = color::split(lab);
    planes[0] = clahe::equalize(&planes[0], clip_limit, clahe::DEFAULT_GRID);
    color::merge(&planes, ColorSpace::Lab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::fixtures::textured_frame;

    #[test]
    fn test_chroma_planes_are_untouched() {
        let lab = color::rgb_to_lab(&textured_frame(32, 24, 9)).unwrap();
        let result = equalize_lightness(&lab, 3.0).unwrap();

        let before = color::split(&lab);
        let after = color::split(&result);
        assert_eq!(before[1], after[1]);
        assert_eq!(before[2], after[2]);
        assert_ne!(before[0], after[0]);
    }

    #[test]
    fn test_local_contrast_returns_rgb_of_same_size() {
        let frame = textured_frame(17, 13, 2);
        let result = apply(frame, WHITE_BALANCE_CLIP_LIMIT).unwrap();
        assert_eq!(result.space(), ColorSpace::Rgb);
        assert_eq!(result.dimensions(), (17, 13));
    }

    #[test]
    fn test_lightness_equalization_requires_lab() {
        let frame = textured_frame(4, 4, 1);
        assert!(equalize_lightness(&frame, 1.5).is_err());
    }
}
