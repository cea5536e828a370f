//! Stylized variants for freshly captured photos.
//!
//! Each capture is checked, decoded once, rendered through every look, and
//! moved to the archive once at least one look has been written.

pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod filters;
pub mod frame;
pub mod orchestrator;
pub mod source;

pub use config::{Args, Config};
pub use orchestrator::{FilterOutcome, Orchestrator, ProcessingReport};
