//! One swerve wheel module: a steered drive wheel behind a [`WheelActuator`].

use crate::core::{WheelPosition, WheelState};
use crate::hal::WheelActuator;
use crate::kinematics::optimize;
use crate::error::Result;

/// Speeds below this are treated as a stop request (m/s).
const MIN_DRIVE_SPEED: f64 = 0.001;

pub struct SwerveModule {
    index: usize,
    actuator: Box<dyn WheelActuator>,
}

impl SwerveModule {
    pub fn new(index: usize, actuator: Box<dyn WheelActuator>) -> Self {
        Self { index, actuator }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Steer and drive toward `desired`, flipping direction when that
    /// saves steering travel.
    ///
    /// A near-zero speed stops the drive and leaves steering where it is, so
    /// the wheels do not snap back to zero when the sticks are released.
    pub fn set_desired_state(&mut self, desired: WheelState) -> Result<()> {
        if desired.speed.abs() < MIN_DRIVE_SPEED {
            return self.stop();
        }

        let current = self.actuator.steer_angle()?;
        let state = optimize(desired, current);
        self.actuator.set_steer_angle(state.angle)?;
        self.actuator.set_drive_velocity(state.speed)
    }

    pub fn get_position(&self) -> Result<WheelPosition> {
        Ok(WheelPosition::new(
            self.actuator.drive_distance()?,
            self.actuator.steer_angle()?,
        ))
    }

    pub fn get_state(&self) -> Result<WheelState> {
        Ok(WheelState::new(
            self.actuator.drive_velocity()?,
            self.actuator.steer_angle()?,
        ))
    }

    pub fn stop(&mut self) -> Result<()> {
        self.actuator.stop_drive()
    }

    pub fn zero_drive_encoder(&mut self) -> Result<()> {
        self.actuator.zero_drive_encoder()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use parking_lot::Mutex;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::sync::Arc;

    /// Ideal actuator: steering and drive reach their targets instantly.
    #[derive(Debug, Default)]
    pub(crate) struct FakeWheel {
        pub distance: f64,
        pub velocity: f64,
        pub angle: f64,
        pub steer_commands: usize,
        pub feedback_lost: bool,
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeActuator(pub Arc<Mutex<FakeWheel>>);

    impl WheelActuator for FakeActuator {
        fn drive_distance(&self) -> Result<f64> {
            let w = self.0.lock();
            if w.feedback_lost {
                return Err(Error::FeedbackLost {
                    module: 0,
                    reason: "encoder unplugged".into(),
                });
            }
            Ok(w.distance)
        }

        fn drive_velocity(&self) -> Result<f64> {
            Ok(self.0.lock().velocity)
        }

        fn steer_angle(&self) -> Result<f64> {
            Ok(self.0.lock().angle)
        }

        fn set_drive_velocity(&mut self, speed: f64) -> Result<()> {
            self.0.lock().velocity = speed;
            Ok(())
        }

        fn set_steer_angle(&mut self, angle: f64) -> Result<()> {
            let mut w = self.0.lock();
            w.angle = angle;
            w.steer_commands += 1;
            Ok(())
        }

        fn stop_drive(&mut self) -> Result<()> {
            self.0.lock().velocity = 0.0;
            Ok(())
        }

        fn zero_drive_encoder(&mut self) -> Result<()> {
            self.0.lock().distance = 0.0;
            Ok(())
        }
    }

    fn module() -> (SwerveModule, Arc<Mutex<FakeWheel>>) {
        let fake = FakeActuator::default();
        let wheel = fake.0.clone();
        (SwerveModule::new(0, Box::new(fake)), wheel)
    }

    #[test]
    fn test_set_desired_state_direct() {
        let (mut m, wheel) = module();
        m.set_desired_state(WheelState::new(1.5, 0.4)).unwrap();
        let w = wheel.lock();
        assert_relative_eq!(w.velocity, 1.5);
        assert_relative_eq!(w.angle, 0.4);
    }

    #[test]
    fn test_set_desired_state_reverses() {
        let (mut m, wheel) = module();
        m.set_desired_state(WheelState::new(2.0, PI - 0.1)).unwrap();
        let w = wheel.lock();
        assert_relative_eq!(w.velocity, -2.0);
        assert!(w.angle.abs() <= FRAC_PI_2);
    }

    #[test]
    fn test_zero_speed_holds_steering() {
        let (mut m, wheel) = module();
        m.set_desired_state(WheelState::new(1.0, 0.8)).unwrap();
        m.set_desired_state(WheelState::new(0.0, 0.0)).unwrap();
        let w = wheel.lock();
        assert_relative_eq!(w.velocity, 0.0);
        assert_relative_eq!(w.angle, 0.8);
        assert_eq!(w.steer_commands, 1);
    }

    #[test]
    fn test_position_and_zero() {
        let (mut m, wheel) = module();
        wheel.lock().distance = 3.2;
        assert_relative_eq!(m.get_position().unwrap().distance, 3.2);
        m.zero_drive_encoder().unwrap();
        assert_relative_eq!(m.get_position().unwrap().distance, 0.0);
    }

    #[test]
    fn test_feedback_lost_surfaces() {
        let (m, wheel) = module();
        wheel.lock().feedback_lost = true;
        assert!(matches!(m.get_position(), Err(Error::FeedbackLost { .. })));
    }
}
