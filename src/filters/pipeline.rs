use crate::error::FilterError;
use crate::frame::{ColorSpace, Frame};
use serde::Serialize;
use std::time::Instant;

use super::steps;
use super::steps::denoise::DenoiseParams;

/// One numeric stage of a recipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Non-local means smoothing
    Denoise(DenoiseParams),
    /// CLAHE on Lab lightness
    LocalContrast { clip_limit: f32 },
    /// Min-max stretch to the full 8-bit range
    AutoLevel,
    /// HSV saturation multiplier
    Saturation { factor: f32 },
    /// `out = in * scale + offset`
    Affine { scale: f32, offset: f32 },
    /// Additive per-channel bias, RGB order
    Tint { bias: [f32; 3] },
    /// 3x3 sharpening convolution
    Sharpen,
    /// Radial darkening toward the corners
    Vignette { strength: f32 },
    /// Bicubic resize; changes dimensions
    Upscale { factor: f32 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Denoise(_) => "denoise",
            Self::LocalContrast { .. } => "local_contrast",
            Self::AutoLevel => "auto_level",
            Self::Saturation { .. } => "saturation",
            Self::Affine { .. } => "affine",
            Self::Tint { .. } => "tint",
            Self::Sharpen => "sharpen",
            Self::Vignette { .. } => "vignette",
            Self::Upscale { .. } => "upscale",
        }
    }

    fn run(&self, frame: Frame) -> Result<Frame, FilterError> {
        match *self {
            Self::Denoise(params) => steps::denoise::apply(frame, &params),
            Self::LocalContrast { clip_limit } => steps::local_contrast::apply(frame, clip_limit),
            Self::AutoLevel => steps::levels::apply(frame),
            Self::Saturation { factor } => steps::saturation::apply(frame, factor),
            Self::Affine { scale, offset } => steps::contrast::apply(frame, scale, offset),
            Self::Tint { bias } => steps::tint::apply(frame, bias),
            Self::Sharpen => steps::sharpen::apply(frame),
            Self::Vignette { strength } => steps::vignette::apply(frame, strength),
            Self::Upscale { factor } => steps::resize::upscale(frame, factor),
        }
    }
}

/// Warm, soft vintage
const OLLIE: &[Step] = &[
    Step::Denoise(DenoiseParams::LIGHT),
    Step::LocalContrast { clip_limit: 1.5 },
    Step::Saturation { factor: 1.15 },
    Step::Affine { scale: 1.1, offset: 5.0 },
    Step::Tint { bias: [15.0, 10.0, 5.0] },
];

/// Dramatic, high contrast
const EIFFEL: &[Step] = &[
    Step::Denoise(DenoiseParams::LIGHT),
    Step::LocalContrast { clip_limit: 3.0 },
    Step::Affine { scale: 1.3, offset: -10.0 },
    Step::Saturation { factor: 1.20 },
    Step::Sharpen,
];

/// Desaturated, cinematic
const REEL: &[Step] = &[
    Step::Denoise(DenoiseParams::LIGHT),
    Step::Saturation { factor: 0.85 },
    Step::Affine { scale: 1.15, offset: 0.0 },
    Step::Vignette { strength: 0.4 },
    Step::Tint { bias: [20.0, 15.0, 10.0] },
];

/// Named looks rendered for every capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Ollie,
    Eiffel,
    Reel,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Ollie, Variant::Eiffel, Variant::Reel];

    /// Name used in output file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollie => "Ollie",
            Self::Eiffel => "Eiffel",
            Self::Reel => "Reel",
        }
    }

    pub fn steps(&self) -> &'static [Step] {
        match self {
            Self::Ollie => OLLIE,
            Self::Eiffel => EIFFEL,
            Self::Reel => REEL,
        }
    }
}

/// Timing information for a single step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Output of a recipe
#[derive(Debug, Clone)]
pub struct Rendered {
    pub frame: Frame,
    pub steps: Vec<StepTiming>,
}

/// A named, fixed chain of steps
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRecipe {
    name: String,
    steps: Vec<Step>,
}

impl FilterRecipe {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn variant(variant: Variant) -> Self {
        Self::new(variant.as_str(), variant.steps().to_vec())
    }

    /// The three standard looks, in rendering order
    pub fn standard() -> Vec<Self> {
        Variant::ALL.iter().map(|v| Self::variant(*v)).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step on a private copy of `source`.
    ///
    /// The result must be device RGB with the source's dimensions.
    pub fn apply(&self, source: &Frame) -> Result<Rendered, FilterError> {
        source.require("recipe input", ColorSpace::Rgb)?;

        let mut timings = Vec::with_capacity(self.steps.len());
        let mut frame = source.clone();

        for step in &self.steps {
            frame = self.run_step(step, frame, &mut timings)?;
        }

        if frame.space() != ColorSpace::Rgb {
            return Err(FilterError::InvalidResult(format!(
                "{} ended in {:?}",
                self.name,
                frame.space()
            )));
        }
        if frame.dimensions() != source.dimensions() {
            return Err(FilterError::InvalidResult(format!(
                "{} changed dimensions from {:?} to {:?}",
                self.name,
                source.dimensions(),
                frame.dimensions()
            )));
        }

        Ok(Rendered {
            frame,
            steps: timings,
        })
    }

    fn run_step(
        &self,
        step: &Step,
        frame: Frame,
        timings: &mut Vec<StepTiming>,
    ) -> Result<Frame, FilterError> {
        let step_start = Instant::now();
        let result = step.run(frame)?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("{}: {} took {}ms", self.name, step.name(), time_ms);
        timings.push(StepTiming {
            name: step.name().to_string(),
            time_ms,
        });
        Ok(result)
    }
}
