//! Result export
//!
//! Writes per-trial CSV tables and a batch summary for downstream plotting.

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::aggregate::{group_results, time_comparison, GroupedTrials};
use crate::batch::BatchReport;
use crate::error::{Result, StageLogError};
use crate::metrics::{TrialMetrics, TrialSummary};
use crate::projection::Point2;
use crate::trial::TrialResult;

/// Batch summary written to `summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// RFC 3339 generation time
    pub generated: String,
    pub target: Option<Point2>,
    pub trials: GroupedTrials<TrialSummary>,
    /// `(label, elapsed seconds per trial)`
    pub time_comparison: Vec<(String, Vec<f64>)>,
    /// Titles of trials that failed to decode
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn new(
        groups: &GroupedTrials<TrialResult>,
        target: Option<Point2>,
        failed: Vec<String>,
    ) -> Self {
        Self {
            generated: Utc::now().to_rfc3339(),
            target,
            trials: groups.map(|t| TrialSummary::from_trial(t, target)),
            time_comparison: time_comparison(groups),
            failed,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| StageLogError::Export {
            path: path.to_path_buf(),
            source,
        })
}

fn finish(path: &Path, written: io::Result<()>) -> Result<()> {
    written.map_err(|source| StageLogError::Export {
        path: path.to_path_buf(),
        source,
    })
}

/// Empty cell for a missing value
fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

fn path_rows<W: Write>(
    writer: &mut W,
    trial: &TrialResult,
    metrics: &TrialMetrics,
) -> io::Result<()> {
    writeln!(
        writer,
        "time,x,y,heading,vx,vy,v_heading,speed,acceleration,distance_to_target,nearest_obstacle"
    )?;
    for (i, pose) in trial.pose_samples.iter().enumerate() {
        let to_target = metrics
            .distance_to_target
            .as_ref()
            .and_then(|d| d.get(i).copied());
        let nearest = metrics.nearest_obstacle.get(i).copied().flatten();
        writeln!(
            writer,
            "{:.3},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{},{}",
            pose.time,
            pose.x,
            pose.y,
            pose.heading,
            pose.vx,
            pose.vy,
            pose.v_heading,
            metrics.speed[i],
            metrics.acceleration[i],
            cell(to_target),
            cell(nearest)
        )?;
    }
    writer.flush()
}

fn obstacle_rows<W: Write>(writer: &mut W, trial: &TrialResult) -> io::Result<()> {
    writeln!(writer, "time,beam,x,y")?;
    for cloud in &trial.obstacle_clouds {
        for (beam, point) in cloud.points.iter().enumerate() {
            if let Some(p) = point {
                writeln!(writer, "{:.3},{},{:.4},{:.4}", cloud.time, beam, p.x, p.y)?;
            }
        }
    }
    writer.flush()
}

/// Write the pose trajectory with its per-sample metrics
///
/// Columns: `time,x,y,heading,vx,vy,v_heading,speed,acceleration,distance_to_target,nearest_obstacle`.
/// `distance_to_target` is empty without a target, `nearest_obstacle` when the scan saw nothing.
pub fn write_path_csv<P: AsRef<Path>>(
    path: P,
    trial: &TrialResult,
    target: Option<Point2>,
) -> Result<()> {
    let path = path.as_ref();
    let metrics = TrialMetrics::from_trial(trial, target);
    let mut writer = create(path)?;
    finish(path, path_rows(&mut writer, trial, &metrics))
}

/// Write obstacle hits as `time,beam,x,y`; missing beams are omitted
pub fn write_obstacles_csv<P: AsRef<Path>>(path: P, trial: &TrialResult) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    finish(path, obstacle_rows(&mut writer, trial))
}

/// Write both CSV tables for a trial into `out_dir`, named after its title
pub fn export_trial<P: AsRef<Path>>(
    out_dir: P,
    trial: &TrialResult,
    target: Option<Point2>,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    let title = trial.metadata.title();
    let path_csv = out_dir.join(format!("{title}.path.csv"));
    let obstacles_csv = out_dir.join(format!("{title}.obstacles.csv"));

    write_path_csv(&path_csv, trial, target)?;
    write_obstacles_csv(&obstacles_csv, trial)?;
    Ok(vec![path_csv, obstacles_csv])
}

/// Write every trial's tables plus `summary.json` into `out_dir`
pub fn export_batch<P: AsRef<Path>>(
    out_dir: P,
    groups: &GroupedTrials<TrialResult>,
    summary: &BatchSummary,
) -> Result<PathBuf> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|source| StageLogError::Export {
        path: out_dir.to_path_buf(),
        source,
    })?;

    for (_, _, trials) in groups.iter() {
        for trial in trials {
            export_trial(out_dir, trial, summary.target)?;
        }
    }

    let summary_path = out_dir.join("summary.json");
    let content = serde_json::to_string_pretty(summary)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
    let written = content.and_then(|c| fs::write(&summary_path, c));
    finish(&summary_path, written)?;

    tracing::info!(out_dir = %out_dir.display(), trials = groups.len(), "exported batch");
    Ok(summary_path)
}

/// Group a finished batch and export it, failed trials listed in the summary
///
/// Still writes `summary.json` when no trial decoded.
pub fn export_report<P: AsRef<Path>>(
    out_dir: P,
    report: BatchReport,
    target: Option<Point2>,
) -> Result<(BatchSummary, PathBuf)> {
    let failed = report.failures.iter().map(|f| f.metadata.title()).collect();
    let groups = group_results(report.results);
    let summary = BatchSummary::new(&groups, target, failed);
    let summary_path = export_batch(out_dir, &groups, &summary)?;
    Ok((summary, summary_path))
}
