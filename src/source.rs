//! Source captures: inspection and intake filtering.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix some capture apps give files that are still being transferred
const PENDING_PREFIX: &str = ".pending-";

/// Extensions accepted from the capture folder
const CAPTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// A captured file as found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub size: u64,
    pub exists: bool,
}

impl SourceAsset {
    /// Stat `path`. Anything that is not a regular file counts as missing.
    pub fn inspect(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Self {
                path: path.to_path_buf(),
                size: meta.len(),
                exists: true,
            },
            _ => Self {
                path: path.to_path_buf(),
                size: 0,
                exists: false,
            },
        }
    }

    /// File name without extension
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension as written on disk, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
    }
}

/// Whether a file name looks like a finished capture worth processing.
///
/// Transient names (`.pending-*` and other dot-files) and non-JPEG
/// extensions are skipped.
pub fn is_capture_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with(PENDING_PREFIX) || name.starts_with('.') {
        return false;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            CAPTURE_EXTENSIONS
                .iter()
                .any(|allowed| e.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// List capture candidates directly inside `dir`, sorted by name.
pub fn scan_directory(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_capture_candidate(&path) {
            found.push(path);
        }
    }
    found.sort();
    tracing::debug!("Found {} capture(s) in {}", found.len(), dir.display());
    Ok(found)
}
