//! Pose estimation: wheel odometry fused with absolute vision poses.
//!
//! # Algorithm
//!
//! Every tick [`PoseEstimator::update`] integrates wheel odometry and
//! records the result in a [`PoseHistory`]. Vision arrives late (camera
//! latency), so [`PoseEstimator::fuse_vision`] looks up where the estimate
//! was when the frame was captured and corrects that point in the history:
//!
//! ```text
//! sample    = history(t_capture)
//! residual  = log(sample → observation)          (SE(2) twist)
//! kᵢ        = qᵢ² / (qᵢ² + √(qᵢ²·rᵢ²))          (per axis)
//! corrected = sample ⊕ exp(k ∘ residual)
//! pose'     = corrected ⊕ (sample⁻¹ ⊕ pose)      (replay motion since t_capture)
//! ```
//!
//! `q` are the odometry standard deviations and `r` the observation's. A
//! larger `r` means a smaller gain and a smaller correction for the same
//! residual.
//!
//! The observation's heading is replaced by the gyro-derived heading at
//! capture time, so vision moves translation only.

mod history;
mod odometry;
pub mod trust;

pub use history::PoseHistory;
pub use odometry::SwerveOdometry;
pub use trust::{RejectReason, TrustConfig, VisionFrame, VisionStdDevs};

use serde::{Deserialize, Serialize};

use crate::core::{Pose2D, Twist2D, WheelPosition};
use crate::kinematics::{MODULE_COUNT, SwerveKinematics};

/// Estimator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Odometry standard deviations `[x m, y m, heading rad]`.
    ///
    /// Default: 0.1 each
    #[serde(default = "default_state_std_devs")]
    pub state_std_devs: [f64; 3],

    /// How far back vision may reach (seconds).
    ///
    /// Default: 1.5
    #[serde(default = "default_history_window")]
    pub history_window_s: f64,

    #[serde(default)]
    pub trust: TrustConfig,
}

fn default_state_std_devs() -> [f64; 3] {
    [0.1, 0.1, 0.1]
}
fn default_history_window() -> f64 {
    1.5
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            state_std_devs: default_state_std_devs(),
            history_window_s: default_history_window(),
            trust: TrustConfig::default(),
        }
    }
}

/// Result of offering a vision frame to the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionOutcome {
    Applied {
        std_devs: VisionStdDevs,
        /// Distance the current estimate moved (m)
        correction: f64,
    },
    Rejected(RejectReason),
}

impl FusionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FusionOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PoseEstimator {
    config: EstimatorConfig,
    odometry: SwerveOdometry,
    history: PoseHistory,
    pose: Pose2D,
}

impl PoseEstimator {
    pub fn new(
        config: EstimatorConfig,
        kinematics: SwerveKinematics,
        gyro_heading: f64,
        positions: [WheelPosition; MODULE_COUNT],
        initial_pose: Pose2D,
    ) -> Self {
        let history = PoseHistory::new(config.history_window_s);
        Self {
            odometry: SwerveOdometry::new(kinematics, gyro_heading, positions, initial_pose),
            history,
            pose: initial_pose,
            config,
        }
    }

    /// Current best estimate.
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Integrate one tick of odometry.
    pub fn update(
        &mut self,
        timestamp_us: u64,
        gyro_heading: f64,
        positions: [WheelPosition; MODULE_COUNT],
    ) -> Pose2D {
        self.pose = self.odometry.update(gyro_heading, positions);
        self.history.push(self.pose, timestamp_us);
        self.pose
    }

    /// Integrate motion since the last tick without recording a history
    /// sample. Used before the wheel counts are rebased.
    pub fn catch_up(&mut self, gyro_heading: f64, positions: [WheelPosition; MODULE_COUNT]) -> Pose2D {
        self.pose = self.odometry.update(gyro_heading, positions);
        self.pose
    }

    /// Re-seat the estimate and drop the history.
    pub fn reset(
        &mut self,
        gyro_heading: f64,
        positions: [WheelPosition; MODULE_COUNT],
        pose: Pose2D,
    ) {
        self.odometry.reset(gyro_heading, positions, pose);
        self.history.clear();
        self.pose = pose;
    }

    /// Classify a vision frame and fold it in if it is trusted.
    ///
    /// `now_us` is the control loop clock when the frame was read; the
    /// capture time is `now_us - latency`.
    pub fn fuse_vision(&mut self, frame: &VisionFrame, now_us: u64) -> FusionOutcome {
        let (estimate, std_devs) = match trust::classify(frame, &self.pose, &self.config.trust) {
            Ok(v) => v,
            Err(reason) => {
                log::debug!("PoseEstimator: vision rejected ({reason})");
                return FusionOutcome::Rejected(reason);
            }
        };

        let latency_us = (estimate.latency_s * 1_000_000.0) as u64;
        let capture_us = now_us.saturating_sub(latency_us);
        self.add_vision_measurement(estimate.pose, capture_us, std_devs)
    }

    /// Fuse an already-trusted observation captured at `timestamp_us`.
    pub fn add_vision_measurement(
        &mut self,
        observed: Pose2D,
        timestamp_us: u64,
        std_devs: VisionStdDevs,
    ) -> FusionOutcome {
        let Some(sample) = self.history.sample(timestamp_us) else {
            log::debug!("PoseEstimator: vision at {timestamp_us}us outside history");
            return FusionOutcome::Rejected(RejectReason::OutsideHistory);
        };

        // Gyro heading wins over vision heading
        let observed = observed.with_theta(sample.theta);

        let r = [std_devs.xy, std_devs.xy, std_devs.heading];
        let gain: [f64; 3] = std::array::from_fn(|i| {
            let q2 = self.config.state_std_devs[i].powi(2);
            let r2 = r[i].powi(2);
            if q2 == 0.0 { 0.0 } else { q2 / (q2 + (q2 * r2).sqrt()) }
        });

        let residual = sample.log(&observed);
        let scaled = Twist2D::new(
            residual.dx * gain[0],
            residual.dy * gain[1],
            residual.dtheta * gain[2],
        );
        let corrected = sample.exp(&scaled);
        let shift = |p: &Pose2D| corrected.compose(&p.relative_to(&sample));

        let before = self.pose;
        self.pose = shift(&self.pose);
        self.history.rewrite_from(timestamp_us, shift);
        self.odometry.reset_pose(self.pose);

        let correction = before.translation().distance(&self.pose.translation());
        log::trace!(
            "PoseEstimator: fused vision xy_sd={:.2} moved {:.3}m",
            std_devs.xy,
            correction
        );
        FusionOutcome::Applied {
            std_devs,
            correction,
        }
    }
}
