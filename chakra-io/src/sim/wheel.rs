//! Simulated wheel module: ideal steering, drive velocity tracking, and an
//! encoder that can be unplugged.

use std::sync::Arc;

use chakra_drive::hal::WheelActuator;
use chakra_drive::{Error, Result};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct WheelSimState {
    commanded_velocity: f64,
    steer_angle: f64,
    /// Encoder reading (m)
    distance: f64,
    feedback_lost: bool,
    /// Motor controller refuses new setpoints
    faulted: bool,
}

/// One simulated module. Clones share state, so the world and the
/// drivetrain see the same wheel.
#[derive(Clone, Default)]
pub struct SimWheel {
    index: usize,
    state: Arc<Mutex<WheelSimState>>,
}

impl SimWheel {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: Arc::default(),
        }
    }

    /// Commanded `(speed, angle)` the physics should apply this step.
    pub fn command(&self) -> (f64, f64) {
        let s = self.state.lock();
        (s.commanded_velocity, s.steer_angle)
    }

    /// Advance the encoder by the distance actually rolled.
    pub fn advance(&self, distance: f64) {
        self.state.lock().distance += distance;
    }

    /// Simulate a cut encoder cable.
    pub fn set_feedback_lost(&self, lost: bool) {
        self.state.lock().feedback_lost = lost;
    }

    /// Simulate a motor controller fault. Stopping still works.
    pub fn set_faulted(&self, faulted: bool) {
        self.state.lock().faulted = faulted;
    }

    fn check_command(&self) -> Result<()> {
        if self.state.lock().faulted {
            return Err(Error::Actuator(format!("module {} controller faulted", self.index)));
        }
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.state.lock().feedback_lost {
            return Err(Error::FeedbackLost {
                module: self.index,
                reason: "encoder not responding".into(),
            });
        }
        Ok(())
    }
}

impl WheelActuator for SimWheel {
    fn drive_distance(&self) -> Result<f64> {
        self.check()?;
        Ok(self.state.lock().distance)
    }

    fn drive_velocity(&self) -> Result<f64> {
        self.check()?;
        Ok(self.state.lock().commanded_velocity)
    }

    fn steer_angle(&self) -> Result<f64> {
        self.check()?;
        Ok(self.state.lock().steer_angle)
    }

    fn set_drive_velocity(&mut self, speed: f64) -> Result<()> {
        self.check_command()?;
        self.state.lock().commanded_velocity = speed;
        Ok(())
    }

    fn set_steer_angle(&mut self, angle: f64) -> Result<()> {
        self.check_command()?;
        self.state.lock().steer_angle = angle;
        Ok(())
    }

    fn stop_drive(&mut self) -> Result<()> {
        self.state.lock().commanded_velocity = 0.0;
        Ok(())
    }

    fn zero_drive_encoder(&mut self) -> Result<()> {
        self.state.lock().distance = 0.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_state_between_clones() {
        let wheel = SimWheel::new(1);
        let mut actuator = wheel.clone();
        actuator.set_drive_velocity(2.0).unwrap();
        actuator.set_steer_angle(0.5).unwrap();
        assert_eq!(wheel.command(), (2.0, 0.5));

        wheel.advance(0.04);
        assert_eq!(actuator.drive_distance().unwrap(), 0.04);
        actuator.zero_drive_encoder().unwrap();
        assert_eq!(wheel.state.lock().distance, 0.0);
    }

    #[test]
    fn test_feedback_lost_reports_index() {
        let wheel = SimWheel::new(3);
        wheel.set_feedback_lost(true);
        match wheel.drive_distance() {
            Err(Error::FeedbackLost { module, .. }) => assert_eq!(module, 3),
            other => panic!("expected feedback loss, got {other:?}"),
        }
    }

    #[test]
    fn test_faulted_controller_rejects_setpoints() {
        let wheel = SimWheel::new(0);
        let mut actuator = wheel.clone();
        actuator.set_drive_velocity(1.5).unwrap();
        wheel.set_faulted(true);
        assert!(matches!(actuator.set_drive_velocity(2.0), Err(Error::Actuator(_))));
        assert!(matches!(actuator.set_steer_angle(0.3), Err(Error::Actuator(_))));
        actuator.stop_drive().unwrap();
        assert_eq!(wheel.command(), (0.0, 0.0));
    }
}
