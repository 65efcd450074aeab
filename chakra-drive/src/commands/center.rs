//! Center on target: drive straight at a detected object until it looks
//! the right size.
//!
//! Apparent area is the distance proxy. The PID pushes it toward
//! `target_area`; the output is slew-limited and becomes a pure forward
//! (or, with a rear camera, backward) velocity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Command, stop_drive};
use crate::config::DriveConfig;
use crate::control::{PidController, PidGains, SlewRateLimiter};
use crate::core::ChassisVelocity;
use crate::drivetrain::SharedDrive;
use crate::error::Result;
use crate::hal::VisionSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterConfig {
    /// Apparent area (0..1) at which the target is close enough
    #[serde(default = "default_target_area")]
    pub target_area: f64,
    #[serde(default = "default_center_pid")]
    pub pid: PidGains,
    /// Output units per second
    #[serde(default = "default_slew_rate")]
    pub slew_rate: f64,
    /// Camera faces the rear, so approaching means negative vx
    #[serde(default = "default_reverse")]
    pub reverse: bool,
    /// Suggested scheduler timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_s: f64,
}

fn default_target_area() -> f64 {
    0.12
}
fn default_center_pid() -> PidGains {
    PidGains {
        kp: 1.5,
        ki: 0.0,
        kd: 0.0,
        tolerance: 0.01,
    }
}
fn default_slew_rate() -> f64 {
    1.0
}
fn default_reverse() -> bool {
    true
}
fn default_timeout() -> f64 {
    1.5
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            target_area: default_target_area(),
            pid: default_center_pid(),
            slew_rate: default_slew_rate(),
            reverse: default_reverse(),
            timeout_s: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterState {
    Idle,
    Active,
    /// Activated without a visible target; exits without moving
    NoTarget,
    Done,
}

pub struct CenterOnTargetCommand {
    drive: SharedDrive,
    vision: Arc<dyn VisionSource>,
    config: CenterConfig,
    drive_speed_coefficient: f64,
    limiter: SlewRateLimiter,
    pid: PidController,
    state: CenterState,
}

impl CenterOnTargetCommand {
    pub fn new(drive: SharedDrive, vision: Arc<dyn VisionSource>, config: &DriveConfig) -> Self {
        let period = config.limits.loop_period_s;
        Self {
            drive,
            vision,
            config: config.center.clone(),
            drive_speed_coefficient: config.limits.drive_speed_coefficient,
            limiter: SlewRateLimiter::new(config.center.slew_rate, period),
            pid: PidController::new(config.center.pid, period),
            state: CenterState::Idle,
        }
    }

    pub fn state(&self) -> CenterState {
        self.state
    }
}

impl Command for CenterOnTargetCommand {
    fn name(&self) -> &str {
        "CenterOnTarget"
    }

    fn initialize(&mut self) -> Result<()> {
        if !self.vision.has_target() {
            log::warn!("CenterOnTarget: no target visible, not moving");
            self.state = CenterState::NoTarget;
            return Ok(());
        }
        self.pid.reset();
        self.limiter.reset(0.0);
        self.state = CenterState::Active;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        if self.state != CenterState::Active {
            return Ok(());
        }

        let area = self.vision.target_area();
        let output = self.pid.calculate(area, self.config.target_area);
        let speed = self.limiter.calculate(output) * self.drive_speed_coefficient;
        let vx = if self.config.reverse { -speed } else { speed };

        let result = self.drive.lock().set_chassis_velocity(ChassisVelocity::new(vx, 0.0, 0.0));
        if self.pid.at_setpoint() {
            self.state = CenterState::Done;
        }
        result
    }

    fn end(&mut self, interrupted: bool) {
        log::debug!("CenterOnTarget: ended in {:?} (interrupted={interrupted})", self.state);
        if self.state == CenterState::Active {
            self.state = CenterState::Idle;
        }
        stop_drive(&self.drive, "CenterOnTarget");
    }

    fn is_finished(&self) -> bool {
        matches!(self.state, CenterState::Done | CenterState::NoTarget)
    }
}
