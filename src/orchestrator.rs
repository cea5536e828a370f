//! Per-capture job: guard the source, render every look, relocate the original.

use crate::codec;
use crate::config::Config;
use crate::error::{ErrorKind, InputError, VariantError};
use crate::filters::{base, FilterRecipe, StepTiming};
use crate::frame::Frame;
use crate::source::SourceAsset;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Extension used when the source has none and its format is unknown
const FALLBACK_EXTENSION: &str = "jpg";

/// Result of rendering one look
#[derive(Debug, Clone, Serialize)]
pub struct FilterOutcome {
    pub variant: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Summary of one capture's job
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingReport {
    pub source: PathBuf,
    pub attempted: usize,
    pub succeeded: usize,
    pub outcomes: Vec<FilterOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_error: Option<InputError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocation_warning: Option<String>,
    pub total_time_ms: u64,
}

impl ProcessingReport {
    fn rejected(source: &Path, err: InputError, start: Instant) -> Self {
        Self {
            source: source.to_path_buf(),
            attempted: 0,
            succeeded: 0,
            outcomes: Vec::new(),
            input_error: Some(err),
            archived_to: None,
            relocation_warning: None,
            total_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// At least one look was written
    pub fn is_success(&self) -> bool {
        self.input_error.is_none() && self.succeeded > 0
    }
}

/// Runs capture jobs against a fixed set of recipes
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Config,
    recipes: Vec<FilterRecipe>,
}

impl Orchestrator {
    /// The standard looks, plus the clean pass when enabled
    pub fn new(config: Config) -> Self {
        let mut recipes = FilterRecipe::standard();
        if config.clean_pass {
            recipes.push(base::recipe());
        }
        Self::with_recipes(config, recipes)
    }

    pub fn with_recipes(config: Config, recipes: Vec<FilterRecipe>) -> Self {
        Self { config, recipes }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn recipes(&self) -> &[FilterRecipe] {
        &self.recipes
    }

    /// Process one capture end to end. Never panics on bad input; every
    /// failure is reported in the returned summary.
    pub fn process(&self, path: &Path) -> ProcessingReport {
        let start = Instant::now();

        let (asset, decoded) = match self.admit(path) {
            Ok(admitted) => admitted,
            Err(err) => {
                tracing::error!("Rejected {}: {}", path.display(), err);
                return ProcessingReport::rejected(path, err, start);
            }
        };

        tracing::info!(
            "Processing {} ({}x{}, {} bytes)",
            path.display(),
            decoded.frame.width(),
            decoded.frame.height(),
            asset.size
        );

        ensure_dir(&self.config.edited_dir);
        ensure_dir(&self.config.archive_dir);

        let extension = asset
            .extension()
            .or_else(|| {
                decoded
                    .format
                    .and_then(|f| f.extensions_str().first().map(|e| e.to_string()))
            })
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
        let base_name = asset.base_name();

        let render = |recipe: &FilterRecipe| {
            let output = self
                .config
                .edited_dir
                .join(format!("{}-{}.{}", base_name, recipe.name(), extension));
            self.render_variant(recipe, &decoded.frame, output)
        };

        let outcomes: Vec<FilterOutcome> = if self.config.parallel_variants {
            self.recipes.par_iter().map(render).collect()
        } else {
            self.recipes.iter().map(render).collect()
        };

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let mut report = ProcessingReport {
            source: path.to_path_buf(),
            attempted: self.recipes.len(),
            succeeded,
            outcomes,
            input_error: None,
            archived_to: None,
            relocation_warning: None,
            total_time_ms: 0,
        };

        if succeeded == 0 {
            tracing::error!(
                "All {} looks failed for {}; leaving it in place",
                report.attempted,
                path.display()
            );
        } else {
            let destination = self.archive_destination(path);
            match relocate(path, &destination) {
                Ok(()) => {
                    tracing::info!("Archived {} to {}", path.display(), destination.display());
                    report.archived_to = Some(destination);
                }
                Err(e) => {
                    tracing::warn!("Failed to archive {}: {}", path.display(), e);
                    report.relocation_warning = Some(e.to_string());
                }
            }
        }

        report.total_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Finished {}: {}/{} looks in {}ms",
            path.display(),
            report.succeeded,
            report.attempted,
            report.total_time_ms
        );
        report
    }

    /// Guards, in order: path given, file present, transfer complete, decodable.
    fn admit(&self, path: &Path) -> Result<(SourceAsset, codec::Decoded), InputError> {
        if path.as_os_str().is_empty() {
            return Err(InputError::MissingPath);
        }

        let asset = SourceAsset::inspect(path);
        if !asset.exists {
            return Err(InputError::NotFound {
                path: path.to_path_buf(),
            });
        }

        if asset.size < self.config.min_source_bytes {
            return Err(InputError::IncompleteTransfer {
                size: asset.size,
                min: self.config.min_source_bytes,
            });
        }

        let decoded = codec::decode(path)?;
        Ok((asset, decoded))
    }

    fn render_variant(
        &self,
        recipe: &FilterRecipe,
        source: &Frame,
        output: PathBuf,
    ) -> FilterOutcome {
        let start = Instant::now();
        let mut steps = Vec::new();

        let result = recipe
            .apply(source)
            .map_err(VariantError::from)
            .and_then(|rendered| {
                steps = rendered.steps;
                codec::encode(rendered.frame.pixels(), &output, self.config.jpeg_quality)
                    .map_err(VariantError::from)
            });
        let time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::info!(
                    "{} written to {} in {}ms",
                    recipe.name(),
                    output.display(),
                    time_ms
                );
                FilterOutcome {
                    variant: recipe.name().to_string(),
                    success: true,
                    output_path: Some(output),
                    error_kind: None,
                    error: None,
                    time_ms,
                    steps,
                }
            }
            Err(err) => {
                tracing::warn!("{} failed: {}", recipe.name(), err);
                FilterOutcome {
                    variant: recipe.name().to_string(),
                    success: false,
                    output_path: None,
                    error_kind: Some(err.kind()),
                    error: Some(err.to_string()),
                    time_ms,
                    steps,
                }
            }
        }
    }

    fn archive_destination(&self, path: &Path) -> PathBuf {
        match path.file_name() {
            Some(name) => self.config.archive_dir.join(name),
            None => self.config.archive_dir.clone(),
        }
    }
}

/// Create `dir` if needed. Failure only logs; the writes that depend on it
/// report their own errors.
fn ensure_dir(dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        tracing::warn!("Failed to create {}: {}", dir.display(), e);
    }
}

/// Move a file, copying across filesystems when a plain rename cannot.
fn relocate(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!("Rename failed ({}), falling back to copy", rename_err);
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Step;
    use crate::frame::fixtures::textured_frame;
    use tempfile::TempDir;

    struct Workspace {
        _root: TempDir,
        incoming: PathBuf,
        edited: PathBuf,
        archive: PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let incoming = root.path().join("incoming");
            fs::create_dir(&incoming).unwrap();
            Self {
                edited: root.path().join("edited"),
                archive: root.path().join("raw"),
                incoming,
                _root: root,
            }
        }

        fn config(&self) -> Config {
            Config::new(&self.edited, &self.archive)
        }

        fn capture(&self, name: &str) -> PathBuf {
            let path = self.incoming.join(name);
            textured_frame(64, 48, 11).pixels().save(&path).unwrap();
            path
        }

        fn edited_names(&self) -> Vec<String> {
            let mut names: Vec<String> = match fs::read_dir(&self.edited) {
                Ok(entries) => entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect(),
                Err(_) => Vec::new(),
            };
            names.sort();
            names
        }
    }

    fn broken_recipe() -> FilterRecipe {
        FilterRecipe::new("Broken", vec![Step::Upscale { factor: 1.2 }])
    }

    #[test]
    fn test_all_looks_written_and_original_archived() {
        let ws = Workspace::new();
        let source = ws.capture("IMG_0001.png");

        let report = Orchestrator::new(ws.config()).process(&source);

        assert!(report.is_success());
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 3);
        assert_eq!(
            ws.edited_names(),
            vec!["IMG_0001-Eiffel.png", "IMG_0001-Ollie.png", "IMG_0001-Reel.png"]
        );
        assert!(!source.exists());
        assert_eq!(report.archived_to, Some(ws.archive.join("IMG_0001.png")));
        assert!(ws.archive.join("IMG_0001.png").exists());

        for outcome in &report.outcomes {
            let written = codec::decode(outcome.output_path.as_ref().unwrap()).unwrap();
            assert_eq!(written.frame.dimensions(), (64, 48));
        }
    }

    #[test]
    fn test_one_failing_look_does_not_stop_the_others() {
        let ws = Workspace::new();
        let source = ws.capture("IMG_0002.png");
        let mut recipes = FilterRecipe::standard();
        recipes[1] = broken_recipe();

        let report = Orchestrator::with_recipes(ws.config(), recipes).process(&source);

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        let broken = &report.outcomes[1];
        assert!(!broken.success);
        assert_eq!(broken.error_kind, Some(ErrorKind::Filter));
        assert!(broken.output_path.is_none());
        assert_eq!(
            ws.edited_names(),
            vec!["IMG_0002-Ollie.png", "IMG_0002-Reel.png"]
        );
        assert!(report.archived_to.is_some());
        assert!(!source.exists());
    }

    #[test]
    fn test_original_stays_when_every_look_fails() {
        let ws = Workspace::new();
        let source = ws.capture("IMG_0003.png");

        let report =
            Orchestrator::with_recipes(ws.config(), vec![broken_recipe(), broken_recipe()])
                .process(&source);

        assert!(!report.is_success());
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 0);
        assert!(source.exists());
        assert!(report.archived_to.is_none());
        assert!(ws.edited_names().is_empty());
    }

    #[test]
    fn test_unwritable_output_is_an_output_failure() {
        let ws = Workspace::new();
        let source = ws.capture("IMG_0004.png");
        fs::write(&ws.edited, b"not a directory").unwrap();

        let report = Orchestrator::new(ws.config()).process(&source);

        assert_eq!(report.succeeded, 0);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.error_kind == Some(ErrorKind::Output)));
        assert!(source.exists());
    }

    #[test]
    fn test_failed_relocation_is_only_a_warning() {
        let ws = Workspace::new();
        let source = ws.capture("IMG_0005.png");
        fs::write(&ws.archive, b"not a directory").unwrap();

        let report = Orchestrator::new(ws.config()).process(&source);

        assert!(report.is_success());
        assert_eq!(report.succeeded, 3);
        assert!(report.relocation_warning.is_some());
        assert!(report.archived_to.is_none());
        assert!(source.exists());
    }

    #[test]
    fn test_guards_reject_before_any_look_runs() {
        let ws = Workspace::new();
        let orchestrator = Orchestrator::new(ws.config());

        let report = orchestrator.process(Path::new(""));
        assert_eq!(report.input_error, Some(InputError::MissingPath));

        let missing = ws.incoming.join("gone.jpg");
        let report = orchestrator.process(&missing);
        assert_eq!(report.input_error, Some(InputError::NotFound { path: missing }));

        let short = ws.incoming.join("short.jpg");
        fs::write(&short, vec![0xFFu8; 10]).unwrap();
        let report = orchestrator.process(&short);
        assert_eq!(
            report.input_error,
            Some(InputError::IncompleteTransfer { size: 10, min: 1024 })
        );

        let garbage = ws.incoming.join("garbage.jpg");
        fs::write(&garbage, vec![0x42u8; 2000]).unwrap();
        let report = orchestrator.process(&garbage);
        assert!(matches!(report.input_error, Some(InputError::Decode { .. })));

        for path in [&short, &garbage] {
            assert!(path.exists());
        }
        assert!(ws.edited_names().is_empty());
    }

    #[test]
    fn test_parallel_variants_match_sequential_results() {
        let ws = Workspace::new();
        let mut config = ws.config();
        config.parallel_variants = true;
        config.clean_pass = true;
        let source = ws.capture("IMG_0006.png");

        let report = Orchestrator::new(config).process(&source);

        assert_eq!(report.attempted, 4);
        assert_eq!(report.succeeded, 4);
        let variants: Vec<&str> = report.outcomes.iter().map(|o| o.variant.as_str()).collect();
        assert_eq!(variants, vec!["Ollie", "Eiffel", "Reel", "Clean"]);
        assert!(ws.edited_names().contains(&"IMG_0006-Clean.png".to_string()));
    }

    #[test]
    fn test_report_serializes_without_empty_fields() {
        let ws = Workspace::new();
        let report = Orchestrator::new(ws.config()).process(&ws.incoming.join("gone.jpg"));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["attempted"], 0);
        assert_eq!(json["input_error"]["kind"], "not_found");
        assert!(json.get("archived_to").is_none());
    }
}
