//! Swerve wheel odometry with gyro-trusted heading.
//!
//! Translation comes from the wheel position deltas through inverse
//! kinematics; heading comes from the gyro plus a fixed offset set at the
//! last reset. Each step integrates the body twist on SE(2) rather than
//! adding heading and translation separately.

use crate::core::math::{angle_diff, normalize_angle};
use crate::core::{Pose2D, WheelPosition};
use crate::kinematics::{MODULE_COUNT, SwerveKinematics};

#[derive(Debug, Clone)]
pub struct SwerveOdometry {
    kinematics: SwerveKinematics,
    pose: Pose2D,
    /// Field heading minus gyro heading
    gyro_offset: f64,
    previous_heading: f64,
    previous_positions: [WheelPosition; MODULE_COUNT],
}

impl SwerveOdometry {
    pub fn new(
        kinematics: SwerveKinematics,
        gyro_heading: f64,
        positions: [WheelPosition; MODULE_COUNT],
        initial_pose: Pose2D,
    ) -> Self {
        Self {
            kinematics,
            pose: initial_pose,
            gyro_offset: initial_pose.theta - gyro_heading,
            previous_heading: initial_pose.theta,
            previous_positions: positions,
        }
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Integrate one step of wheel motion.
    pub fn update(&mut self, gyro_heading: f64, positions: [WheelPosition; MODULE_COUNT]) -> Pose2D {
        let heading = normalize_angle(gyro_heading + self.gyro_offset);

        let mut twist = self.kinematics.to_twist(&self.previous_positions, &positions);
        twist.dtheta = angle_diff(self.previous_heading, heading);

        let moved = self.pose.exp(&twist);
        self.pose = Pose2D::new(moved.x, moved.y, heading);
        self.previous_heading = heading;
        self.previous_positions = positions;
        self.pose
    }

    /// Re-seat the pose, taking new gyro and wheel references.
    pub fn reset(
        &mut self,
        gyro_heading: f64,
        positions: [WheelPosition; MODULE_COUNT],
        pose: Pose2D,
    ) {
        self.pose = pose;
        self.gyro_offset = pose.theta - gyro_heading;
        self.previous_heading = pose.theta;
        self.previous_positions = positions;
    }

    /// Overwrite the pose without touching the gyro or wheel references.
    ///
    /// The heading offset is re-derived so the next update continues from
    /// `pose.theta`.
    pub fn reset_pose(&mut self, pose: Pose2D) {
        self.gyro_offset += angle_diff(self.pose.theta, pose.theta);
        self.previous_heading = pose.theta;
        self.pose = pose;
    }
}
