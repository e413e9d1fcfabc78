//! Per-trial metrics
//!
//! Derived series consumed by presentation: speed, acceleration, distance to
//! a goal and clearance to the nearest observed obstacle.

use serde::{Deserialize, Serialize};

use crate::frames::PoseSample;
use crate::projection::{ObstacleCloud, Point2};
use crate::trial::TrialResult;

/// Time between the first and last pose sample
pub fn elapsed_time(poses: &[PoseSample]) -> f64 {
    match (poses.first(), poses.last()) {
        (Some(first), Some(last)) => last.time - first.time,
        _ => 0.0,
    }
}

/// Planar speed of one sample
#[inline]
pub fn scalar_speed(pose: &PoseSample) -> f64 {
    pose.vx.hypot(pose.vy)
}

/// Numerical derivative of scalar speed over time
///
/// Central differences for interior samples, one-sided at the ends. Zero time
/// steps produce zero.
pub fn acceleration(poses: &[PoseSample]) -> Vec<f64> {
    let n = poses.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let slope = |a: &PoseSample, b: &PoseSample| {
        let dt = b.time - a.time;
        if dt == 0.0 {
            0.0
        } else {
            (scalar_speed(b) - scalar_speed(a)) / dt
        }
    };

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(n - 1);
            slope(&poses[lo], &poses[hi])
        })
        .collect()
}

/// Distance from every pose to `target`
pub fn distance_to_target(poses: &[PoseSample], target: Point2) -> Vec<f64> {
    poses
        .iter()
        .map(|p| Point2::new(p.x, p.y).distance(&target))
        .collect()
}

/// Closest obstacle hit for each aligned pose/cloud pair, `None` when the scan saw nothing
pub fn distance_to_nearest_obstacle(
    poses: &[PoseSample],
    clouds: &[ObstacleCloud],
) -> Vec<Option<f64>> {
    poses
        .iter()
        .zip(clouds)
        .map(|(pose, cloud)| {
            let origin = Point2::new(pose.x, pose.y);
            cloud
                .hits()
                .map(|p| p.distance(&origin))
                .min_by(f64::total_cmp)
        })
        .collect()
}

/// Per-sample series for one trial, aligned with its pose samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialMetrics {
    pub speed: Vec<f64>,
    pub acceleration: Vec<f64>,
    /// Present only when a goal is given
    pub distance_to_target: Option<Vec<f64>>,
    pub nearest_obstacle: Vec<Option<f64>>,
}

impl TrialMetrics {
    pub fn from_trial(trial: &TrialResult, target: Option<Point2>) -> Self {
        let poses = &trial.pose_samples;
        Self {
            speed: poses.iter().map(scalar_speed).collect(),
            acceleration: acceleration(poses),
            distance_to_target: target.map(|t| distance_to_target(poses, t)),
            nearest_obstacle: distance_to_nearest_obstacle(poses, &trial.obstacle_clouds),
        }
    }

    pub fn mean_speed(&self) -> f64 {
        if self.speed.is_empty() {
            0.0
        } else {
            self.speed.iter().sum::<f64>() / self.speed.len() as f64
        }
    }
}

/// Headline numbers for one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub title: String,
    pub algorithm: String,
    pub difficulty: String,
    pub index: usize,
    /// Seconds
    pub elapsed: f64,
    pub samples: usize,
    pub scans: usize,
    pub mean_speed: f64,
    pub final_distance_to_target: Option<f64>,
    pub min_obstacle_distance: Option<f64>,
}

impl TrialSummary {
    /// Summarize a decoded trial; target distance only when a goal is given
    pub fn from_trial(trial: &TrialResult, target: Option<Point2>) -> Self {
        let poses = &trial.pose_samples;
        let metrics = TrialMetrics::from_trial(trial, target);
        let final_distance_to_target = metrics
            .distance_to_target
            .as_ref()
            .and_then(|d| d.last().copied());
        let min_obstacle_distance = metrics
            .nearest_obstacle
            .iter()
            .flatten()
            .copied()
            .min_by(f64::total_cmp);

        let meta = &trial.metadata;
        Self {
            title: meta.title(),
            algorithm: meta.algorithm.clone(),
            difficulty: meta.difficulty.clone(),
            index: meta.index,
            elapsed: elapsed_time(poses),
            samples: poses.len(),
            scans: trial.laser_scans.len(),
            mean_speed: metrics.mean_speed(),
            final_distance_to_target,
            min_obstacle_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample(time: f64, x: f64, y: f64, vx: f64, vy: f64) -> PoseSample {
        PoseSample {
            time,
            x,
            y,
            heading: 0.0,
            vx,
            vy,
            v_heading: 0.0,
        }
    }

    #[test]
    fn test_elapsed_time() {
        let poses: Vec<_> = (0..100)
            .map(|i| sample(i as f64 / 10.0, 0.0, 0.0, 0.0, 0.0))
            .collect();
        assert_abs_diff_eq!(elapsed_time(&poses), 9.9, epsilon = 1e-9);
        assert_eq!(elapsed_time(&poses[..1]), 0.0);
        assert_eq!(elapsed_time(&[]), 0.0);
    }

    #[test]
    fn test_scalar_speed_and_acceleration() {
        let poses = vec![
            sample(0.0, 0.0, 0.0, 0.0, 0.0),
            sample(1.0, 0.0, 0.0, 3.0, 4.0),
            sample(2.0, 0.0, 0.0, 6.0, 8.0),
        ];
        assert_eq!(scalar_speed(&poses[1]), 5.0);

        let acc = acceleration(&poses);
        assert_eq!(acc.len(), 3);
        assert_abs_diff_eq!(acc[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(acc[1], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(acc[2], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_acceleration_zero_dt() {
        let poses = vec![
            sample(1.0, 0.0, 0.0, 0.0, 0.0),
            sample(1.0, 0.0, 0.0, 1.0, 0.0),
        ];
        assert_eq!(acceleration(&poses), vec![0.0, 0.0]);
    }

    #[test]
    fn test_distance_to_target() {
        let poses = vec![sample(0.0, 0.0, 0.0, 0.0, 0.0), sample(1.0, -8.0, -7.5, 0.0, 0.0)];
        let d = distance_to_target(&poses, Point2::new(-8.0, -7.5));
        assert_abs_diff_eq!(d[0], 8.0f64.hypot(7.5), epsilon = 1e-12);
        assert_eq!(d[1], 0.0);
    }

    fn trial(poses: Vec<PoseSample>, clouds: Vec<ObstacleCloud>) -> TrialResult {
        use crate::telemetry::{LaserConfig, LaserGeometry};
        use crate::trial::TrialMetadata;

        TrialResult {
            metadata: TrialMetadata::new(1, "a/b/run.log", "a", "b"),
            geometry: LaserGeometry::default(),
            laser_config: LaserConfig {
                scan_id: 0,
                min_angle: 0.0,
                max_angle: 0.0,
                resolution: 0.0,
                max_range: 8.0,
                count: 1,
            },
            laser_scans: Vec::new(),
            pose_samples: poses,
            obstacle_clouds: clouds,
        }
    }

    #[test]
    fn test_trial_metrics_series() {
        let poses = vec![
            sample(0.0, 0.0, 0.0, 3.0, 4.0),
            sample(1.0, 3.0, 4.0, 6.0, 8.0),
        ];
        let clouds = vec![
            ObstacleCloud {
                time: 0.0,
                points: vec![Some(Point2::new(1.0, 0.0))],
            },
            ObstacleCloud {
                time: 1.0,
                points: vec![None],
            },
        ];
        let trial = trial(poses, clouds);

        let metrics = TrialMetrics::from_trial(&trial, Some(Point2::new(3.0, 4.0)));
        assert_eq!(metrics.speed, vec![5.0, 10.0]);
        assert_eq!(metrics.acceleration, vec![5.0, 5.0]);
        assert_eq!(metrics.distance_to_target, Some(vec![5.0, 0.0]));
        assert_eq!(metrics.nearest_obstacle, vec![Some(1.0), None]);
        assert_abs_diff_eq!(metrics.mean_speed(), 7.5, epsilon = 1e-12);

        let summary = TrialSummary::from_trial(&trial, None);
        assert_eq!(summary.final_distance_to_target, None);
        assert_eq!(summary.min_obstacle_distance, Some(1.0));
        assert_eq!(TrialMetrics::from_trial(&trial, None).distance_to_target, None);
    }

    #[test]
    fn test_nearest_obstacle_skips_missing() {
        let poses = vec![sample(0.0, 0.0, 0.0, 0.0, 0.0); 2];
        let clouds = vec![
            ObstacleCloud {
                time: 0.0,
                points: vec![Some(Point2::new(3.0, 4.0)), None, Some(Point2::new(0.0, 2.0))],
            },
            ObstacleCloud {
                time: 0.1,
                points: vec![None, None],
            },
        ];
        assert_eq!(
            distance_to_nearest_obstacle(&poses, &clouds),
            vec![Some(2.0), None]
        );
    }
}
