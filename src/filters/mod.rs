//! Photo filter pipeline
//!
//! Numeric steps, the recipes that chain them into named looks, and the
//! standalone base enhancement pass.

pub mod base;
pub mod pipeline;
pub mod steps;

pub use pipeline::{FilterRecipe, Rendered, Step, StepTiming, Variant};
