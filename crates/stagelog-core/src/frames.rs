//! Laser scan and pose frames
//!
//! Typed per-row records built from decoded telemetry rows, in row order.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StageLogError};
use crate::telemetry::{LaserRow, PositionRow};

/// One laser sweep
///
/// `ranges[k]` is `None` when the raw reading reached `max_range`, the
/// sensor's no-return sentinel, or is not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    pub time: f64,
    pub scan_id: i64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub resolution: f64,
    pub max_range: f64,
    pub count: usize,
    pub ranges: Vec<Option<f64>>,
    pub intensities: Vec<f64>,
}

impl LaserScan {
    /// Build a scan from a decoded row, masking sentinel ranges
    pub fn from_row(row: LaserRow) -> Self {
        let max_range = row.max_range;
        let ranges = row
            .ranges
            .into_iter()
            .map(|r| (r.is_finite() && r < max_range).then_some(r))
            .collect();

        Self {
            time: row.time,
            scan_id: row.scan_id,
            min_angle: row.min_angle,
            max_angle: row.max_angle,
            resolution: row.resolution,
            max_range,
            count: row.count,
            ranges,
            intensities: row.intensities,
        }
    }

    /// Angle between adjacent beams
    ///
    /// A single beam scan has no spacing; its only beam sits at `min_angle`.
    pub fn angle_step(&self) -> f64 {
        if self.count > 1 {
            (self.max_angle - self.min_angle) / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    /// Beams that returned a hit
    pub fn valid_returns(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_some()).count()
    }
}

/// Robot pose and velocity at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    /// Radians, not normalized
    pub heading: f64,
    pub vx: f64,
    pub vy: f64,
    pub v_heading: f64,
}

impl From<PositionRow> for PoseSample {
    fn from(row: PositionRow) -> Self {
        Self {
            time: row.time,
            x: row.px,
            y: row.py,
            heading: row.pa,
            vx: row.vx,
            vy: row.vy,
            v_heading: row.va,
        }
    }
}

/// Build scans from decoded laser rows in row order
pub fn build_laser_scans<I: IntoIterator<Item = LaserRow>>(rows: I) -> Vec<LaserScan> {
    rows.into_iter().map(LaserScan::from_row).collect()
}

/// Build pose samples from decoded position rows in row order
///
/// Timestamps must not decrease; the first row that goes backwards fails
/// the trial with [`StageLogError::TimeOrder`].
pub fn build_pose_samples<I: IntoIterator<Item = PositionRow>>(
    rows: I,
) -> Result<Vec<PoseSample>> {
    let mut samples: Vec<PoseSample> = Vec::new();
    for row in rows {
        if let Some(previous) = samples.last() {
            if row.time < previous.time {
                return Err(StageLogError::TimeOrder {
                    line: row.line,
                    previous: previous.time,
                    next: row.time,
                });
            }
        }
        samples.push(row.into());
    }
    Ok(samples)
}
