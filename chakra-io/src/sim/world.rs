//! Ground-truth physics for the simulated robot.
//!
//! Each step reads what the drivetrain commanded into the wheels, moves the
//! true pose by the resulting rigid-body motion, and feeds the sensors:
//! encoders (with slip), gyro (with drift), and the camera (with latency
//! and position noise).

use std::collections::VecDeque;

use chakra_drive::field::{Alliance, orbit_point};
use chakra_drive::{MODULE_COUNT, Pose2D, SwerveKinematics, Translation2D, Twist2D, WheelState};

use super::noise::NoiseGenerator;
use super::vision::{SimVision, SimVisionFrame};
use super::{SimConfig, SimGyro, SimWheel};

/// Tags mounted around each speaker
const TAGS_PER_SPEAKER: usize = 2;
/// True-pose history kept for latency replay (µs)
const TRUTH_HISTORY_US: u64 = 2_000_000;

pub struct SimWorld {
    config: SimConfig,
    kinematics: SwerveKinematics,
    wheels: [SimWheel; MODULE_COUNT],
    gyro: SimGyro,
    vision: SimVision,
    noise: NoiseGenerator,
    pose: Pose2D,
    time_us: u64,
    truth: VecDeque<(u64, Pose2D)>,
    /// Game piece the rear camera tracks, if placed
    object: Option<Translation2D>,
}

impl SimWorld {
    pub fn new(
        config: SimConfig,
        kinematics: SwerveKinematics,
        wheels: [SimWheel; MODULE_COUNT],
        gyro: SimGyro,
        vision: SimVision,
        start: Pose2D,
    ) -> Self {
        let noise = NoiseGenerator::new(config.seed);
        let mut world = Self {
            config,
            kinematics,
            wheels,
            gyro,
            vision,
            noise,
            pose: start,
            time_us: 0,
            truth: VecDeque::new(),
            object: None,
        };
        world.truth.push_back((0, start));
        world.publish_vision();
        world
    }

    /// True pose of the robot.
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    pub fn time_us(&self) -> u64 {
        self.time_us
    }

    pub fn wheel(&self, index: usize) -> &SimWheel {
        &self.wheels[index]
    }

    pub fn vision(&self) -> &SimVision {
        &self.vision
    }

    /// Place (or remove) the object seen by the rear camera.
    pub fn set_object(&mut self, object: Option<Translation2D>) {
        self.object = object;
        self.publish_vision();
    }

    /// Teleport without moving the sensors, as a bump would.
    pub fn displace(&mut self, pose: Pose2D) {
        self.pose = pose;
        self.truth.clear();
        self.truth.push_back((self.time_us, pose));
        self.publish_vision();
    }

    /// Advance the world by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        let mut states = [WheelState::default(); MODULE_COUNT];
        for (state, wheel) in states.iter_mut().zip(&self.wheels) {
            let (speed, angle) = wheel.command();
            *state = WheelState::new(speed, angle);
        }
        let velocity = self.kinematics.to_chassis_velocity(&states);

        let twist = Twist2D::new(velocity.vx * dt_s, velocity.vy * dt_s, velocity.omega * dt_s);
        self.pose = self.pose.exp(&twist);

        for (state, wheel) in states.iter().zip(&self.wheels) {
            let rolled = state.speed * dt_s;
            let slip = 1.0 + self.noise.gaussian(self.config.wheel_slip_std);
            wheel.advance(rolled * slip);
        }
        let drift = self.noise.gaussian(self.config.gyro_drift_std);
        self.gyro.advance(twist.dtheta, drift);

        self.time_us += (dt_s * 1e6).round() as u64;
        self.truth.push_back((self.time_us, self.pose));
        while let Some(&(t, _)) = self.truth.front()
            && t + TRUTH_HISTORY_US < self.time_us
        {
            self.truth.pop_front();
        }

        self.publish_vision();
    }

    /// True pose at or just before `time_us`.
    fn pose_at(&self, time_us: u64) -> Pose2D {
        self.truth
            .iter()
            .rev()
            .find(|(t, _)| *t <= time_us)
            .or(self.truth.front())
            .map_or(self.pose, |(_, p)| *p)
    }

    fn publish_vision(&mut self) {
        let vision = &self.config.vision;
        if !vision.enabled {
            self.vision.clear();
            return;
        }

        let here = self.pose.translation();
        let nearest_speaker = [Alliance::Blue, Alliance::Red]
            .into_iter()
            .map(|a| here.distance(&orbit_point(a)))
            .fold(f64::INFINITY, f64::min);

        let mut frame = SimVisionFrame::default();
        if nearest_speaker < vision.tag_range_m {
            let latency_us = (vision.latency_s * 1e6).round() as u64;
            let seen = self.pose_at(self.time_us.saturating_sub(latency_us));
            frame.tag_count = TAGS_PER_SPEAKER;
            frame.area = area_at(vision.tag_area_at_1m, nearest_speaker);
            frame.latency_s = vision.latency_s;
            frame.pose = Some(Pose2D::new(
                seen.x + self.noise.gaussian(vision.xy_noise_std),
                seen.y + self.noise.gaussian(vision.xy_noise_std),
                seen.theta,
            ));
        }
        if let Some(object) = self.object {
            frame.area = area_at(vision.object_area_at_1m, here.distance(&object));
        }
        self.vision.publish(frame);
    }
}

/// Apparent area falls off with the square of distance.
fn area_at(area_at_1m: f64, distance: f64) -> f64 {
    (area_at_1m / distance.max(1e-3).powi(2)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chakra_drive::hal::{Gyro, VisionSource, WheelActuator};

    fn quiet_world(start: Pose2D) -> SimWorld {
        let config = SimConfig {
            wheel_slip_std: 0.0,
            gyro_drift_std: 0.0,
            ..SimConfig::default()
        };
        let kinematics = SwerveKinematics::from_dimensions(0.5, 0.5).unwrap();
        let wheels = std::array::from_fn(SimWheel::new);
        SimWorld::new(config, kinematics, wheels, SimGyro::new(), SimVision::new(), start)
    }

    #[test]
    fn test_forward_wheels_move_forward() {
        let mut world = quiet_world(Pose2D::new(8.0, 4.0, 0.0));
        for i in 0..MODULE_COUNT {
            let mut wheel = world.wheel(i).clone();
            wheel.set_steer_angle(0.0).unwrap();
            wheel.set_drive_velocity(1.0).unwrap();
        }
        for _ in 0..50 {
            world.step(0.02);
        }
        assert_relative_eq!(world.pose().x, 9.0, epsilon = 1e-9);
        assert_relative_eq!(world.pose().y, 4.0, epsilon = 1e-9);
        assert_relative_eq!(world.wheel(0).drive_distance().unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(world.time_us(), 1_000_000);
    }

    #[test]
    fn test_gyro_follows_rotation() {
        let mut world = quiet_world(Pose2D::new(8.0, 4.0, 0.0));
        let kinematics = SwerveKinematics::from_dimensions(0.5, 0.5).unwrap();
        let states = kinematics.to_wheel_states(&chakra_drive::ChassisVelocity::new(0.0, 0.0, 1.0));
        for (i, state) in states.iter().enumerate() {
            let mut wheel = world.wheel(i).clone();
            wheel.set_steer_angle(state.angle).unwrap();
            wheel.set_drive_velocity(state.speed).unwrap();
        }
        let gyro = world.gyro.clone();
        for _ in 0..25 {
            world.step(0.02);
        }
        assert_relative_eq!(world.pose().theta, 0.5, epsilon = 1e-9);
        assert_relative_eq!(gyro.heading().unwrap(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_tags_visible_near_speaker_only() {
        let mut world = quiet_world(Pose2D::new(2.0, 5.55, 0.0));
        assert_eq!(world.vision().target_count(), TAGS_PER_SPEAKER);
        assert!(world.vision().pose_estimate().is_some());

        world.displace(Pose2D::new(8.0, 4.0, 0.0));
        assert!(!world.vision().has_target());
        assert!(world.vision().pose_estimate().is_none());
    }

    #[test]
    fn test_object_area_grows_when_closer() {
        let mut world = quiet_world(Pose2D::new(8.0, 4.0, 0.0));
        world.set_object(Some(Translation2D::new(6.0, 4.0)));
        let far = world.vision().target_area();
        world.displace(Pose2D::new(7.0, 4.0, 0.0));
        let near = world.vision().target_area();
        assert!(world.vision().has_target());
        assert!(near > far);
    }
}
