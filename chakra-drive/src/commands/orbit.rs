//! Orbit: translate under driver control while facing a fixed field point.

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Command, stop_drive};
use crate::config::{DriveConfig, InputConfig, LimitsConfig};
use crate::control::{PidController, PidGains, SlewRateLimiter, apply_deadband};
use crate::core::ChassisVelocity;
use crate::drivetrain::SharedDrive;
use crate::error::Result;
use crate::field::orbit_point;
use crate::hal::{AllianceProvider, DriverInputSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitConfig {
    /// Heading PID; output in turn units before the turning coefficient
    #[serde(default = "default_orbit_pid")]
    pub pid: PidGains,
    /// Translation scale while orbiting
    #[serde(default = "default_speed_coefficient")]
    pub speed_coefficient: f64,
    /// Translation scale with fine control held
    #[serde(default = "default_fine_speed_coefficient")]
    pub fine_speed_coefficient: f64,
}

fn default_orbit_pid() -> PidGains {
    PidGains {
        kp: 0.55,
        ki: 0.0,
        kd: 0.0,
        tolerance: 0.5,
    }
}
fn default_speed_coefficient() -> f64 {
    0.25
}
fn default_fine_speed_coefficient() -> f64 {
    0.125
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            pid: default_orbit_pid(),
            speed_coefficient: default_speed_coefficient(),
            fine_speed_coefficient: default_fine_speed_coefficient(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitState {
    Idle,
    Active,
}

/// D-pad translation `(x, y)` for a POV angle.
///
/// Diagonals combine both axes: 315/0/45 forward, 135/180/225 back,
/// 225/270/315 left, 45/90/135 right.
pub fn dpad_translation(pov: Option<u16>, speed: f64) -> (f64, f64) {
    let Some(angle) = pov else {
        return (0.0, 0.0);
    };
    let x = match angle {
        315 | 0 | 45 => speed,
        135 | 180 | 225 => -speed,
        _ => 0.0,
    };
    let y = match angle {
        225 | 270 | 315 => speed,
        45 | 90 | 135 => -speed,
        _ => 0.0,
    };
    (x, y)
}

pub struct OrbitCommand {
    drive: SharedDrive,
    input: Box<dyn DriverInputSource>,
    alliance: Arc<dyn AllianceProvider>,
    config: OrbitConfig,
    input_config: InputConfig,
    limits: LimitsConfig,
    x_limiter: SlewRateLimiter,
    y_limiter: SlewRateLimiter,
    turning_limiter: SlewRateLimiter,
    pid: PidController,
    state: OrbitState,
    warned_no_alliance: bool,
}

impl OrbitCommand {
    pub fn new(
        drive: SharedDrive,
        input: Box<dyn DriverInputSource>,
        alliance: Arc<dyn AllianceProvider>,
        config: &DriveConfig,
    ) -> Self {
        let period = config.limits.loop_period_s;
        let mut pid = PidController::new(config.orbit.pid, period);
        pid.enable_continuous_input(-PI, PI);

        Self {
            drive,
            input,
            alliance,
            config: config.orbit.clone(),
            input_config: config.input.clone(),
            limits: config.limits.clone(),
            x_limiter: SlewRateLimiter::new(config.limits.drive_slew_rate, period),
            y_limiter: SlewRateLimiter::new(config.limits.drive_slew_rate, period),
            turning_limiter: SlewRateLimiter::new(config.limits.turning_slew_rate, period),
            pid,
            state: OrbitState::Idle,
            warned_no_alliance: false,
        }
    }

    pub fn state(&self) -> OrbitState {
        self.state
    }

    /// Heading error from the last tick (radians).
    pub fn heading_error(&self) -> f64 {
        self.pid.position_error()
    }
}

impl Command for OrbitCommand {
    fn name(&self) -> &str {
        "Orbit"
    }

    fn initialize(&mut self) -> Result<()> {
        self.pid.reset();
        self.x_limiter.reset(0.0);
        self.y_limiter.reset(0.0);
        self.turning_limiter.reset(0.0);
        self.warned_no_alliance = false;
        self.state = OrbitState::Active;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        // Without an alliance there is no point to face; hold the last output
        let Some(alliance) = self.alliance.alliance() else {
            if !self.warned_no_alliance {
                log::warn!("Orbit: alliance unknown, holding last output");
                self.warned_no_alliance = true;
            }
            return Ok(());
        };

        let input = self.input.read();
        let pose = self.drive.lock().pose();
        let point = orbit_point(alliance);

        let bearing = (point.y - pose.y).atan2(point.x - pose.x);
        let turning = self.pid.calculate(pose.theta, bearing);

        let x = apply_deadband(input.x, self.input_config.deadband);
        let y = apply_deadband(input.y, self.input_config.deadband);
        let x = self.x_limiter.calculate(x) * self.limits.drive_speed_coefficient;
        let y = self.y_limiter.calculate(y) * self.limits.drive_speed_coefficient;
        let turning =
            self.turning_limiter.calculate(turning) * self.limits.turning_speed_coefficient;

        let (dpad_x, dpad_y) = dpad_translation(input.pov, self.input_config.dpad_speed);
        let (vx, vy, omega) =
            if self.input_config.enable_dpad && (dpad_x != 0.0 || dpad_y != 0.0) {
                (dpad_x, dpad_y, 0.0)
            } else {
                (x, y, turning)
            };

        let velocity = if input.field_oriented {
            ChassisVelocity::from_field_relative(vx, vy, omega, pose.theta)
        } else {
            ChassisVelocity::new(vx, vy, omega)
        };

        let scale = if input.fine_control {
            self.config.fine_speed_coefficient
        } else {
            self.config.speed_coefficient
        };
        let velocity = ChassisVelocity::new(velocity.vx * scale, velocity.vy * scale, velocity.omega);

        self.drive.lock().set_chassis_velocity(velocity)
    }

    fn end(&mut self, interrupted: bool) {
        log::debug!("Orbit: ended (interrupted={interrupted})");
        self.state = OrbitState::Idle;
        stop_drive(&self.drive, "Orbit");
    }

    /// Runs until cancelled.
    fn is_finished(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpad_cardinals() {
        assert_eq!(dpad_translation(None, 0.25), (0.0, 0.0));
        assert_eq!(dpad_translation(Some(0), 0.25), (0.25, 0.0));
        assert_eq!(dpad_translation(Some(180), 0.25), (-0.25, 0.0));
        assert_eq!(dpad_translation(Some(270), 0.25), (0.0, 0.25));
        assert_eq!(dpad_translation(Some(90), 0.25), (0.0, -0.25));
    }

    #[test]
    fn test_dpad_diagonals() {
        assert_eq!(dpad_translation(Some(315), 0.25), (0.25, 0.25));
        assert_eq!(dpad_translation(Some(45), 0.25), (0.25, -0.25));
        assert_eq!(dpad_translation(Some(135), 0.25), (-0.25, -0.25));
        assert_eq!(dpad_translation(Some(225), 0.25), (-0.25, 0.25));
    }
}
