//! Obstacle projection
//!
//! Converts each laser scan from the robot's polar frame into world-frame
//! points using the pose sampled alongside it:
//!
//! ```text
//! bearing_k = heading + min_angle + k * angle_step
//! x_k       = pose.x + range_k * cos(bearing_k)
//! y_k       = pose.y + range_k * sin(bearing_k)
//! ```
//!
//! Clouds keep one entry per beam so index `k` always refers to beam `k`.

use serde::{Deserialize, Serialize};

use crate::config::AlignmentPolicy;
use crate::error::{Result, StageLogError};
use crate::frames::{LaserScan, PoseSample};

/// A world-frame point in meters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    #[inline]
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// World-frame obstacle points for one scan, aligned with its beams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleCloud {
    /// Scan timestamp
    pub time: f64,
    pub points: Vec<Option<Point2>>,
}

impl ObstacleCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points that correspond to a laser return, skipping missing beams
    pub fn hits(&self) -> impl Iterator<Item = &Point2> {
        self.points.iter().flatten()
    }
}

/// Project one scan into the world frame from `pose`
pub fn project_scan(pose: &PoseSample, scan: &LaserScan) -> ObstacleCloud {
    let step = scan.angle_step();
    let points = scan
        .ranges
        .iter()
        .enumerate()
        .map(|(k, range)| {
            range.map(|r| {
                let bearing = pose.heading + scan.min_angle + k as f64 * step;
                let (sin, cos) = bearing.sin_cos();
                Point2::new(pose.x + r * cos, pose.y + r * sin)
            })
        })
        .collect();

    ObstacleCloud {
        time: scan.time,
        points,
    }
}

/// Pair poses with scans by position, applying `policy` when the counts differ
///
/// Returns the number of pairs kept. With [`AlignmentPolicy::Truncate`] both
/// sequences are cut to that length.
pub fn align(
    poses: &mut Vec<PoseSample>,
    scans: &mut Vec<LaserScan>,
    policy: AlignmentPolicy,
) -> Result<usize> {
    if poses.len() == scans.len() {
        return Ok(poses.len());
    }

    match policy {
        AlignmentPolicy::Strict => Err(StageLogError::Misaligned {
            poses: poses.len(),
            scans: scans.len(),
        }),
        AlignmentPolicy::Truncate => {
            let kept = poses.len().min(scans.len());
            tracing::warn!(
                poses = poses.len(),
                scans = scans.len(),
                kept,
                "truncating misaligned pose and scan sequences"
            );
            poses.truncate(kept);
            scans.truncate(kept);
            Ok(kept)
        }
    }
}

/// Project every aligned pose/scan pair; lengths must already match
pub fn project_trial(poses: &[PoseSample], scans: &[LaserScan]) -> Result<Vec<ObstacleCloud>> {
    if poses.len() != scans.len() {
        return Err(StageLogError::Misaligned {
            poses: poses.len(),
            scans: scans.len(),
        });
    }
    Ok(poses
        .iter()
        .zip(scans)
        .map(|(pose, scan)| project_scan(pose, scan))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn pose(x: f64, y: f64, heading: f64) -> PoseSample {
        PoseSample {
            time: 0.0,
            x,
            y,
            heading,
            vx: 0.0,
            vy: 0.0,
            v_heading: 0.0,
        }
    }

    fn scan(min_angle: f64, max_angle: f64, ranges: Vec<Option<f64>>) -> LaserScan {
        LaserScan {
            time: 0.0,
            scan_id: 0,
            min_angle,
            max_angle,
            resolution: 0.0,
            max_range: 8.0,
            count: ranges.len(),
            intensities: vec![0.0; ranges.len()],
            ranges,
        }
    }

    fn assert_point(actual: Option<Point2>, x: f64, y: f64) {
        let p = actual.expect("expected a point");
        assert_abs_diff_eq!(p.x, x, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, y, epsilon = 1e-6);
    }

    #[test]
    fn test_half_circle_scan_with_missing_beam() {
        let cloud = project_scan(
            &pose(0.0, 0.0, 0.0),
            &scan(-FRAC_PI_2, FRAC_PI_2, vec![Some(1.0), None, Some(2.0)]),
        );
        assert_eq!(cloud.len(), 3);
        assert_point(cloud.points[0], 0.0, -1.0);
        assert!(cloud.points[1].is_none());
        assert_point(cloud.points[2], 0.0, 2.0);
        assert_eq!(cloud.hits().count(), 2);
    }

    #[test]
    fn test_pose_offset_and_heading() {
        let cloud = project_scan(&pose(1.0, 2.0, FRAC_PI_2), &scan(0.0, 0.0, vec![Some(3.0)]));
        assert_point(cloud.points[0], 1.0, 5.0);
    }

    #[test]
    fn test_bearing_is_not_wrapped() {
        let cloud = project_scan(
            &pose(0.0, 0.0, 3.0 * PI),
            &scan(0.0, PI, vec![Some(1.0), Some(1.0)]),
        );
        assert_point(cloud.points[0], -1.0, 0.0);
        assert_point(cloud.points[1], 1.0, 0.0);
    }

    #[test]
    fn test_empty_scan() {
        let cloud = project_scan(&pose(0.0, 0.0, 0.0), &scan(-1.0, 1.0, vec![]));
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_align_strict_rejects_mismatch() {
        let mut poses = vec![pose(0.0, 0.0, 0.0); 3];
        let mut scans = vec![scan(0.0, 1.0, vec![Some(1.0)]); 2];
        assert!(matches!(
            align(&mut poses, &mut scans, AlignmentPolicy::Strict),
            Err(StageLogError::Misaligned { poses: 3, scans: 2 })
        ));
        assert_eq!(poses.len(), 3);
    }

    #[test]
    fn test_align_truncate_to_shorter() {
        let mut poses = vec![pose(0.0, 0.0, 0.0); 3];
        let mut scans = vec![scan(0.0, 1.0, vec![Some(1.0)]); 2];
        let kept = align(&mut poses, &mut scans, AlignmentPolicy::Truncate).unwrap();
        assert_eq!(kept, 2);
        assert_eq!(poses.len(), 2);
        assert_eq!(project_trial(&poses, &scans).unwrap().len(), 2);
    }
}
