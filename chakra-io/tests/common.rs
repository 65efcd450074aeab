//! Shared setup for the simulated-robot scenarios.

#![allow(dead_code)]

use chakra_drive::Pose2D;
use chakra_drive::field::Alliance;
use chakra_io::{AppConfig, SimRobot};

/// Config with every noise source off, so estimates can be compared with
/// ground truth tightly.
pub fn quiet_config(alliance: Option<Alliance>, location: Option<u8>) -> AppConfig {
    let mut config = AppConfig::default();
    config.sim.alliance = alliance;
    config.sim.location = location;
    config.sim.wheel_slip_std = 0.0;
    config.sim.gyro_drift_std = 0.0;
    config.sim.vision.xy_noise_std = 0.0;
    config
}

pub fn quiet_robot(alliance: Option<Alliance>, location: Option<u8>) -> SimRobot {
    SimRobot::new(quiet_config(alliance, location)).unwrap()
}

/// Put both the real robot and the estimate at `pose`.
pub fn place(robot: &mut SimRobot, pose: Pose2D) {
    robot.world.displace(pose);
    robot.drive.lock().reset_pose(pose).unwrap();
}

/// Step until the runner goes idle. Returns the ticks taken, or `None` if
/// it was still busy after `max_ticks`.
pub fn run_until_idle(robot: &mut SimRobot, max_ticks: u64) -> Option<u64> {
    for tick in 1..=max_ticks {
        robot.step().unwrap();
        if robot.control.runner().is_idle() {
            return Some(tick);
        }
    }
    None
}

pub fn translation_error(a: &Pose2D, b: &Pose2D) -> f64 {
    a.translation().distance(&b.translation())
}
