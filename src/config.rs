use clap::Parser;
use std::path::PathBuf;

/// Smallest file accepted as a finished transfer
pub const DEFAULT_MIN_SOURCE_BYTES: u64 = 1024;

/// JPEG quality for rendered variants
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Parser, Debug)]
#[command(name = "capture-filters")]
#[command(about = "Render stylized variants of freshly captured photos")]
#[command(version)]
pub struct Args {
    /// Directory that receives rendered variants
    #[arg(long, env = "CAPTURE_EDITED_DIR", default_value = "edited")]
    pub edited_dir: PathBuf,

    /// Directory that originals are moved to after a successful render
    #[arg(long, env = "CAPTURE_ARCHIVE_DIR", default_value = "raw")]
    pub archive_dir: PathBuf,

    /// Files smaller than this are treated as incomplete transfers
    #[arg(long, env = "CAPTURE_MIN_SOURCE_BYTES", default_value_t = DEFAULT_MIN_SOURCE_BYTES)]
    pub min_source_bytes: u64,

    /// JPEG quality for rendered variants (1-100)
    #[arg(long, env = "CAPTURE_JPEG_QUALITY", default_value_t = DEFAULT_JPEG_QUALITY)]
    pub jpeg_quality: u8,

    /// Render the looks of one capture concurrently
    #[arg(long)]
    pub parallel_variants: bool,

    /// Captures processed at the same time
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    /// Also process every capture found in this directory
    #[arg(long)]
    pub scan: Option<PathBuf>,

    /// Additionally write the base enhancement pass as its own output
    #[arg(long)]
    pub clean_pass: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Captured files to process
    pub paths: Vec<PathBuf>,
}

/// Processing configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub edited_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub min_source_bytes: u64,
    pub jpeg_quality: u8,
    pub parallel_variants: bool,
    pub clean_pass: bool,
}

impl Config {
    /// Defaults for everything except the two output locations
    pub fn new(edited_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            edited_dir: edited_dir.into(),
            archive_dir: archive_dir.into(),
            min_source_bytes: DEFAULT_MIN_SOURCE_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            parallel_variants: false,
            clean_pass: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            edited_dir: args.edited_dir,
            archive_dir: args.archive_dir,
            min_source_bytes: args.min_source_bytes,
            jpeg_quality: args.jpeg_quality.clamp(1, 100),
            parallel_variants: args.parallel_variants,
            clean_pass: args.clean_pass,
        }
    }
}
