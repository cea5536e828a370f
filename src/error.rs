use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::frame::ColorSpace;

/// Guard-stage failures. Any of these aborts the whole job before a single
/// variant runs.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputError {
    #[error("Missing path")]
    MissingPath,

    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Incomplete transfer: {size} bytes (min: {min} bytes)")]
    IncompleteTransfer { size: u64, min: u64 },

    #[error("Decode failure: {detail}")]
    Decode { detail: String },
}

/// A single variant's transform failed. Contained by the orchestrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Step {step} expects {expected:?} input, found {found:?}")]
    UnsupportedColorSpace {
        step: &'static str,
        expected: ColorSpace,
        found: ColorSpace,
    },

    #[error("Channel planes do not line up: {0}")]
    PlaneMismatch(String),

    #[error("Invalid result: {0}")]
    InvalidResult(String),
}

/// Encoding or writing one variant's output failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Io(String),

    #[error("Failed to encode output: {0}")]
    Encode(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Failure class recorded on a failed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Filter,
    Output,
}

/// Per-variant failure, either stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariantError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl VariantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VariantError::Filter(_) => ErrorKind::Filter,
            VariantError::Output(_) => ErrorKind::Output,
        }
    }
}

impl From<std::io::Error> for OutputError {
    fn from(err: std::io::Error) -> Self {
        OutputError::Io(err.to_string())
    }
}

impl From<image::ImageError> for OutputError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => OutputError::Io(e.to_string()),
            other => OutputError::Encode(other.to_string()),
        }
    }
}
