//! StageLog: trajectory and obstacle reconstruction for Player/Stage logs
//!
//! - `batch` (default) -- Decode every `<algorithm>/<difficulty>/*.log` under a
//!   log directory and export tables plus a grouped summary
//! - `trial`           -- Decode a single log file and print its summary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use stagelog_core::prelude::*;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Reconstruct robot paths and obstacle clouds from Player/Stage logs
#[derive(Parser)]
#[command(name = "stagelog", version, about)]
struct Cli {
    /// Path to a JSON pipeline configuration (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads for batch decoding.
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Goal x coordinate for distance-to-target metrics.
    #[arg(long, global = true, requires = "target_y", allow_hyphen_values = true)]
    target_x: Option<f64>,

    /// Goal y coordinate for distance-to-target metrics.
    #[arg(long, global = true, requires = "target_x", allow_hyphen_values = true)]
    target_y: Option<f64>,

    /// How to handle trials whose pose and scan counts differ.
    #[arg(long, global = true)]
    alignment: Option<Alignment>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Alignment {
    Strict,
    Truncate,
}

impl From<Alignment> for AlignmentPolicy {
    fn from(value: Alignment) -> Self {
        match value {
            Alignment::Strict => AlignmentPolicy::Strict,
            Alignment::Truncate => AlignmentPolicy::Truncate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every trial under a log directory.
    Batch {
        /// Directory laid out as <algorithm>/<difficulty>/*.log.
        #[arg(short, long, default_value = "logs")]
        log_dir: PathBuf,

        /// Directory for exported tables and summary.json.
        #[arg(short, long, default_value = "plots")]
        out: PathBuf,
    },

    /// Decode one log file and print its summary as JSON.
    Trial {
        /// Path to the log file.
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Trial { path }) => cmd_trial(&config, path),
        Some(Commands::Batch { log_dir, out }) => cmd_batch(&config, log_dir, out).await,
        None => cmd_batch(&config, PathBuf::from("logs"), PathBuf::from("plots")).await,
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let (Some(x), Some(y)) = (cli.target_x, cli.target_y) {
        config.target = Some(Point2::new(x, y));
    }
    if let Some(alignment) = cli.alignment {
        config.alignment = alignment.into();
    }

    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_trial(config: &PipelineConfig, path: PathBuf) -> Result<()> {
    let metadata = TrialMetadata::from_path(&path);
    let trial = decode_trial(metadata, config)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let summary = TrialSummary::from_trial(&trial, config.target);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn cmd_batch(config: &PipelineConfig, log_dir: PathBuf, out: PathBuf) -> Result<()> {
    tracing::info!(
        log_dir = %log_dir.display(),
        workers = config.worker_count(),
        "processing log directory"
    );

    let report = process_log_dir(&log_dir, config)
        .await
        .with_context(|| format!("Failed to process {}", log_dir.display()))?;

    for failure in &report.failures {
        tracing::warn!(
            trial = %failure.metadata.title(),
            path = %failure.metadata.path.display(),
            "skipped: {}",
            failure.error
        );
    }
    if report.results.is_empty() && !report.failures.is_empty() {
        tracing::error!(log_dir = %log_dir.display(), "no trial could be decoded");
    }

    let (summary, summary_path) = export_report(&out, report, config.target)
        .with_context(|| format!("Failed to export results to {}", out.display()))?;

    for (label, times) in &summary.time_comparison {
        tracing::info!("{label}: {times:.2?}");
    }
    tracing::info!(summary = %summary_path.display(), "done");
    Ok(())
}
