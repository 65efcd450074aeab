//! Straight-line path follower standing in for the trajectory service.
//!
//! Drives toward the goal along a straight line. Speed is the smallest of a
//! proportional term, a braking curve that stays inside the acceleration
//! limit, and the velocity limit.

use chakra_drive::control::SlewRateLimiter;
use chakra_drive::core::math::angle_diff;
use chakra_drive::hal::{PathConstraints, PathFollower};
use chakra_drive::{ChassisVelocity, Command, Pose2D, Result, SharedDrive};

const TRANSLATION_GAIN: f64 = 2.0;
const ROTATION_GAIN: f64 = 3.0;
/// Arrival tolerance (m)
const POSITION_TOLERANCE: f64 = 0.05;
/// Arrival tolerance (rad)
const HEADING_TOLERANCE: f64 = 0.035;

pub struct SimPathFollower {
    drive: SharedDrive,
    period_s: f64,
}

impl SimPathFollower {
    pub fn new(drive: SharedDrive, period_s: f64) -> Self {
        Self { drive, period_s }
    }
}

impl PathFollower for SimPathFollower {
    fn follow(&mut self, goal: Pose2D, constraints: PathConstraints) -> Result<Box<dyn Command>> {
        Ok(Box::new(GoToPose {
            drive: self.drive.clone(),
            goal,
            constraints,
            vx: SlewRateLimiter::new(constraints.max_acceleration, self.period_s),
            vy: SlewRateLimiter::new(constraints.max_acceleration, self.period_s),
            omega: SlewRateLimiter::new(constraints.max_angular_acceleration, self.period_s),
            arrived: false,
        }))
    }
}

/// Speed toward a goal `remaining` away.
///
/// `sqrt(a·d)` brakes at half the acceleration limit and `gain·d` takes over
/// only below `a / gain`, so the slew limiters never have to cut a
/// deceleration short.
fn approach_speed(remaining: f64, gain: f64, max_speed: f64, max_accel: f64) -> f64 {
    (remaining * gain)
        .min((max_accel * remaining).sqrt())
        .min(max_speed)
}

struct GoToPose {
    drive: SharedDrive,
    goal: Pose2D,
    constraints: PathConstraints,
    vx: SlewRateLimiter,
    vy: SlewRateLimiter,
    omega: SlewRateLimiter,
    arrived: bool,
}

impl Command for GoToPose {
    fn name(&self) -> &str {
        "GoToPose"
    }

    fn initialize(&mut self) -> Result<()> {
        self.vx.reset(0.0);
        self.vy.reset(0.0);
        self.omega.reset(0.0);
        self.arrived = false;
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        let mut drive = self.drive.lock();
        let pose = drive.pose();

        let offset = self.goal.translation().minus(&pose.translation());
        let distance = offset.norm();
        let heading_error = angle_diff(pose.theta, self.goal.theta);
        if distance < POSITION_TOLERANCE && heading_error.abs() < HEADING_TOLERANCE {
            self.arrived = true;
            return drive.stop();
        }

        let c = &self.constraints;
        let speed = approach_speed(distance, TRANSLATION_GAIN, c.max_velocity, c.max_acceleration);
        let (vx, vy) = if distance > 0.0 {
            (offset.x / distance * speed, offset.y / distance * speed)
        } else {
            (0.0, 0.0)
        };
        let omega = heading_error.signum()
            * approach_speed(
                heading_error.abs(),
                ROTATION_GAIN,
                c.max_angular_velocity,
                c.max_angular_acceleration,
            );

        drive.set_chassis_velocity(ChassisVelocity::from_field_relative(
            self.vx.calculate(vx),
            self.vy.calculate(vy),
            self.omega.calculate(omega),
            pose.theta,
        ))
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            log::info!("GoToPose: follow cancelled");
        }
        if let Err(e) = self.drive.lock().stop() {
            log::error!("GoToPose: stop failed: {e}");
        }
    }

    fn is_finished(&self) -> bool {
        self.arrived
    }
}
