//! # StageLog Core Library
//!
//! Reconstructs robot trajectories and obstacle clouds from Player/Stage
//! simulator logs.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Interface filtering and decoding of `laser` and `position2d` log lines
//! - Laser scan and pose frame building
//! - Polar-to-world obstacle projection
//! - Experiment discovery over `<algorithm>/<difficulty>/*.log` trees
//! - Parallel batch decoding with per-trial failure isolation
//! - Grouped summaries and CSV/JSON export
//!
//! ## Example
//!
//! ```rust,ignore
//! use stagelog_core::prelude::*;
//!
//! let config = PipelineConfig::default();
//! let report = process_log_dir("logs", &config).await?;
//! let groups = group_results(report.results);
//! for (label, times) in time_comparison(&groups) {
//!     println!("{label}: {times:?}");
//! }
//! ```

pub mod aggregate;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod frames;
pub mod metrics;
pub mod projection;
pub mod telemetry;
pub mod trial;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregate::{group_results, time_comparison, GroupedTrials};
    pub use crate::batch::{process_log_dir, run_batch, BatchReport, TrialFailure};
    pub use crate::catalog::discover;
    pub use crate::config::{AlignmentPolicy, CatalogOrder, PipelineConfig};
    pub use crate::error::StageLogError;
    pub use crate::export::{export_batch, export_report, export_trial, BatchSummary};
    pub use crate::frames::{LaserScan, PoseSample};
    pub use crate::metrics::{TrialMetrics, TrialSummary};
    pub use crate::projection::{ObstacleCloud, Point2};
    pub use crate::telemetry::Interface;
    pub use crate::trial::{decode_trial, TrialMetadata, TrialResult};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
