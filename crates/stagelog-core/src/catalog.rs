//! Experiment catalog
//!
//! Discovers trial logs laid out as `<log_dir>/<algorithm>/<difficulty>/*.log`
//! and numbers them from 1 inside each algorithm/difficulty group.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CatalogOrder, PipelineConfig};
use crate::error::{Result, StageLogError};
use crate::trial::TrialMetadata;

/// Subdirectories or files of `dir`, in the requested order
fn list(dir: &Path, order: CatalogOrder, want_dirs: bool) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StageLogError::from_io(dir, e))? {
        let path = entry.map_err(|e| StageLogError::from_io(dir, e))?.path();
        if path.is_dir() == want_dirs {
            entries.push(path);
        }
    }
    if order == CatalogOrder::Filename {
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }
    Ok(entries)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find every trial log under `log_dir`
pub fn discover<P: AsRef<Path>>(log_dir: P, config: &PipelineConfig) -> Result<Vec<TrialMetadata>> {
    let log_dir = log_dir.as_ref();
    if !log_dir.is_dir() {
        return Err(StageLogError::InvalidLayout(format!(
            "{} is not a directory",
            log_dir.display()
        )));
    }

    let order = config.catalog_order;
    let mut trials = Vec::new();
    for algorithm_dir in list(log_dir, order, true)? {
        let algorithm = dir_name(&algorithm_dir);
        for difficulty_dir in list(&algorithm_dir, order, true)? {
            let difficulty = dir_name(&difficulty_dir);
            let logs = list(&difficulty_dir, order, false)?
                .into_iter()
                .filter(|p| {
                    p.extension()
                        .is_some_and(|ext| ext == config.log_extension.as_str())
                });
            for (i, path) in logs.enumerate() {
                trials.push(TrialMetadata::new(i + 1, path, &algorithm, &difficulty));
            }
        }
    }

    tracing::info!(
        log_dir = %log_dir.display(),
        trials = trials.len(),
        "discovered trial logs"
    );
    Ok(trials)
}
