//! Trial decoding
//!
//! Runs the full single-file pipeline: filter the laser and position2d
//! streams, decode their headers and rows, build frames and project
//! obstacles.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::frames::{build_laser_scans, build_pose_samples, LaserScan, PoseSample};
use crate::projection::{align, project_trial, ObstacleCloud};
use crate::telemetry::{
    decode_laser_header, decode_laser_row, decode_position_row, skip_position_header,
    Interface, InterfaceLines, LaserConfig, LaserGeometry,
};

/// Identity of one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialMetadata {
    /// 1-based position inside its algorithm/difficulty group
    pub index: usize,
    pub path: PathBuf,
    pub algorithm: String,
    pub difficulty: String,
}

impl TrialMetadata {
    pub fn new(
        index: usize,
        path: impl Into<PathBuf>,
        algorithm: impl Into<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        Self {
            index,
            path: path.into(),
            algorithm: algorithm.into(),
            difficulty: difficulty.into(),
        }
    }

    /// Metadata for a lone log file, named after its two parent directories
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let parent_name = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let difficulty_dir = path.parent();
        let algorithm_dir = difficulty_dir.and_then(Path::parent);
        Self::new(
            1,
            path,
            parent_name(algorithm_dir),
            parent_name(difficulty_dir),
        )
    }

    /// Display title, also used to name exported artifacts
    pub fn title(&self) -> String {
        format!("{} - {} - {}", self.algorithm, self.difficulty, self.index)
    }
}

/// Everything decoded from one trial log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub metadata: TrialMetadata,
    pub geometry: LaserGeometry,
    pub laser_config: LaserConfig,
    pub laser_scans: Vec<LaserScan>,
    pub pose_samples: Vec<PoseSample>,
    /// One cloud per scan, same order
    pub obstacle_clouds: Vec<ObstacleCloud>,
}

impl TrialResult {
    /// Number of aligned pose/scan/cloud triples
    pub fn len(&self) -> usize {
        self.pose_samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pose_samples.is_empty()
    }
}

/// Decode the laser stream: two header lines, then one scan per row
fn read_laser(path: &Path) -> Result<(LaserGeometry, LaserConfig, Vec<LaserScan>)> {
    let mut lines = InterfaceLines::open(path, Interface::Laser)?;
    let (geometry, laser_config) = decode_laser_header(&mut lines)?;
    let rows = lines
        .map(|record| record.and_then(|r| decode_laser_row(&r, &laser_config)))
        .collect::<Result<Vec<_>>>()?;
    Ok((geometry, laser_config, build_laser_scans(rows)))
}

/// Decode the position2d stream: one discarded header, then one pose per row
fn read_positions(path: &Path) -> Result<Vec<PoseSample>> {
    let mut lines = InterfaceLines::open(path, Interface::Position2d)?;
    skip_position_header(&mut lines)?;
    let rows = lines
        .map(|record| record.and_then(|r| decode_position_row(&r)))
        .collect::<Result<Vec<_>>>()?;
    build_pose_samples(rows)
}

/// Decode and project one trial
pub fn decode_trial(metadata: TrialMetadata, config: &PipelineConfig) -> Result<TrialResult> {
    let (geometry, laser_config, mut laser_scans) = read_laser(&metadata.path)?;
    let mut pose_samples = read_positions(&metadata.path)?;

    align(&mut pose_samples, &mut laser_scans, config.alignment)?;
    let obstacle_clouds = project_trial(&pose_samples, &laser_scans)?;

    tracing::info!(
        trial = %metadata.title(),
        scans = laser_scans.len(),
        "decoded trial"
    );

    Ok(TrialResult {
        metadata,
        geometry,
        laser_config,
        laser_scans,
        pose_samples,
        obstacle_clouds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let meta = TrialMetadata::new(2, "logs/astar/easy/run.log", "astar", "easy");
        assert_eq!(meta.title(), "astar - easy - 2");
    }

    #[test]
    fn test_metadata_from_path() {
        let meta = TrialMetadata::from_path("logs/wavefront/hard/run3.log");
        assert_eq!(meta.algorithm, "wavefront");
        assert_eq!(meta.difficulty, "hard");
        assert_eq!(meta.index, 1);
    }
}
