//! Batch processing
//!
//! Decodes many trials on a bounded pool of blocking workers. A failing trial
//! is recorded and the rest of the batch keeps going.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::catalog::discover;
use crate::config::PipelineConfig;
use crate::error::{Result, StageLogError};
use crate::trial::{decode_trial, TrialMetadata, TrialResult};

/// A trial that could not be decoded
#[derive(Debug)]
pub struct TrialFailure {
    pub metadata: TrialMetadata,
    pub error: StageLogError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully decoded trials, in submission order
    pub results: Vec<TrialResult>,
    /// Trials that failed, in submission order
    pub failures: Vec<TrialFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decode `trials` with at most `config.workers` running at once
pub async fn run_batch(trials: Vec<TrialMetadata>, config: &PipelineConfig) -> BatchReport {
    let permits = Arc::new(Semaphore::new(config.worker_count()));
    let config = Arc::new(config.clone());
    let mut tasks = JoinSet::new();

    for (slot, metadata) in trials.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let config = Arc::clone(&config);
        tasks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (slot, metadata, Err(StageLogError::Worker(e.to_string()))),
            };
            let fallback = metadata.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let result = decode_trial(metadata.clone(), &config);
                (metadata, result)
            })
            .await;
            match outcome {
                Ok((metadata, result)) => (slot, metadata, result),
                Err(e) => (slot, fallback, Err(StageLogError::Worker(e.to_string()))),
            }
        });
    }

    let mut finished = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(entry) => finished.push(entry),
            Err(e) => tracing::error!("batch worker panicked: {e}"),
        }
    }
    finished.sort_by_key(|(slot, _, _)| *slot);

    let mut report = BatchReport::default();
    for (_, metadata, result) in finished {
        match result {
            Ok(trial) => report.results.push(trial),
            Err(error) => {
                tracing::warn!(trial = %metadata.title(), "trial failed: {error}");
                report.failures.push(TrialFailure { metadata, error });
            }
        }
    }

    tracing::info!(
        decoded = report.results.len(),
        failed = report.failures.len(),
        "batch complete"
    );
    report
}

/// Discover every trial under `log_dir` and decode them all
pub async fn process_log_dir<P: AsRef<Path>>(
    log_dir: P,
    config: &PipelineConfig,
) -> Result<BatchReport> {
    let trials = discover(log_dir, config)?;
    Ok(run_batch(trials, config).await)
}
