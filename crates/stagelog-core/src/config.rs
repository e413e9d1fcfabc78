//! Pipeline configuration
//!
//! Loaded from a JSON file; every field falls back to its default when absent.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, StageLogError};
use crate::projection::Point2;

/// What to do when a trial has a different number of pose samples and scans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Fail the trial
    #[default]
    Strict,
    /// Keep the common prefix of both sequences
    Truncate,
}

/// How trial files are ordered before indices are assigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrder {
    /// Sorted by file name
    #[default]
    Filename,
    /// Whatever order the platform's directory listing returns
    Filesystem,
}

/// Settings shared by every stage of trial processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pose/scan length mismatch handling
    pub alignment: AlignmentPolicy,

    /// Trial ordering inside each algorithm/difficulty group
    pub catalog_order: CatalogOrder,

    /// Worker pool size for batch processing
    pub workers: usize,

    /// Goal position used for distance-to-target metrics
    pub target: Option<Point2>,

    /// Extension of trial log files, without the dot
    pub log_extension: String,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentPolicy::default(),
            catalog_order: CatalogOrder::default(),
            workers: default_workers(),
            target: None,
            log_extension: "log".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StageLogError::from_io(path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| StageLogError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no pipeline can run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(StageLogError::Config("workers must be at least 1".into()));
        }
        if self.log_extension.is_empty() {
            return Err(StageLogError::Config("log_extension must not be empty".into()));
        }
        Ok(())
    }

    /// Worker count, never less than one
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "alignment": "truncate", "target": { "x": -8.0, "y": -7.5 } }"#)
                .unwrap();
        assert_eq!(config.alignment, AlignmentPolicy::Truncate);
        assert_eq!(config.target, Some(Point2::new(-8.0, -7.5)));
        assert_eq!(config.catalog_order, CatalogOrder::Filename);
        assert_eq!(config.log_extension, "log");
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_from_file_rejects_zero_workers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{ "workers": 0 }"#).unwrap();
        assert!(matches!(
            PipelineConfig::from_file(&path),
            Err(StageLogError::Config(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PipelineConfig::from_file(dir.path().join("nope.json")),
            Err(StageLogError::NotFound(_))
        ));
    }
}
