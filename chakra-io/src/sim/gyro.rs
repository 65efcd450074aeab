//! Simulated gyro: true yaw plus accumulated drift.

use std::sync::Arc;

use chakra_drive::{Error, Result};
use chakra_drive::core::math::normalize_angle;
use chakra_drive::hal::Gyro;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct GyroSimState {
    /// Integrated true yaw (rad, unwrapped)
    yaw: f64,
    drift: f64,
    /// Subtracted from yaw to produce the reported heading
    zero: f64,
    disconnected: bool,
}

#[derive(Clone, Default)]
pub struct SimGyro {
    state: Arc<Mutex<GyroSimState>>,
}

impl SimGyro {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate the true yaw and add drift.
    pub fn advance(&self, delta_yaw: f64, drift: f64) {
        let mut s = self.state.lock();
        s.yaw += delta_yaw;
        s.drift += drift;
    }

    /// Simulate the gyro dropping off the bus.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.state.lock().disconnected = disconnected;
    }
}

impl Gyro for SimGyro {
    fn heading(&self) -> Result<f64> {
        let s = self.state.lock();
        if s.disconnected {
            return Err(Error::Gyro("no response".into()));
        }
        Ok(normalize_angle(s.yaw + s.drift - s.zero))
    }

    fn reset_heading(&mut self, heading: f64) -> Result<()> {
        let mut s = self.state.lock();
        if s.disconnected {
            return Err(Error::Gyro("reset not acknowledged".into()));
        }
        s.zero = s.yaw + s.drift - heading;
        Ok(())
    }
}
