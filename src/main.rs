use anyhow::Context;
use capture_filters::{source, Args, Config, Orchestrator};
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut paths = args.paths.clone();
    if let Some(dir) = &args.scan {
        let found = source::scan_directory(dir)
            .with_context(|| format!("Failed to scan {}", dir.display()))?;
        paths.extend(found);
    }

    let mut seen = HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));

    if paths.is_empty() {
        anyhow::bail!("No captures to process");
    }

    let jobs = args.jobs.max(1);
    let config = Config::from(args);

    tracing::info!("Starting capture-filters v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Processing {} capture(s) into {}",
        paths.len(),
        config.edited_dir.display()
    );

    let orchestrator = Arc::new(Orchestrator::new(config));

    let reports: Vec<_> = stream::iter(paths)
        .map(|path| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::task::spawn_blocking(move || orchestrator.process(&path))
        })
        .buffer_unordered(jobs)
        .collect()
        .await;

    let mut failed = 0;
    for report in reports {
        let report = report.context("Capture job panicked")?;
        if !report.is_success() {
            failed += 1;
        }
        println!("{}", serde_json::to_string(&report)?);
    }

    if failed > 0 {
        anyhow::bail!("{} capture(s) produced no output", failed);
    }
    Ok(())
}
