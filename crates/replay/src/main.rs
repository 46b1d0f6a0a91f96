mod replay;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qbview_core::{load_config, validate_config, Synchronizer};

use report::Report;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var("QBVIEW_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Payload directory: {:?}", config.replay.payload_dir);

    let payloads = replay::payload_files(&config.replay.payload_dir)
        .await
        .context("Failed to list payload files")?;
    info!("Found {} payload files", payloads.len());

    let mut sync = Synchronizer::new();
    let stats = replay::apply_payloads(&mut sync, &payloads).await?;
    info!(
        "Replayed {} payloads ({} data changes, {} filter changes), next rid {}",
        stats.ticks,
        stats.data_changes,
        stats.filter_changes,
        sync.rid()
    );

    let trees = match &config.replay.files_dir {
        Some(dir) => replay::load_content_trees(dir, sync.snapshot())
            .await
            .context("Failed to build content trees")?,
        None => Default::default(),
    };

    let report = Report::new(&sync, &stats, &trees, config.report.include_empty_buckets);
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    Ok(())
}
