//! PID controller with optional continuous (wrap-around) input.
//!
//! Runs at a fixed period. With continuous input enabled over `[min, max)`
//! the error is the shortest signed distance around that circle, so a
//! heading controller never takes the long way round.

use serde::{Deserialize, Serialize};

/// Largest magnitude the integral term may contribute to the output.
const INTEGRATOR_LIMIT: f64 = 1.0;

/// Gains and tolerance for a [`PidController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    /// Error magnitude considered on target
    pub tolerance: f64,
}

#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    period_s: f64,
    continuous: Option<(f64, f64)>,

    error: f64,
    prev_error: f64,
    velocity_error: f64,
    total_error: f64,
    setpoint: f64,
    has_measurement: bool,
}

impl PidController {
    pub fn new(gains: PidGains, period_s: f64) -> Self {
        Self {
            gains,
            period_s,
            continuous: None,
            error: 0.0,
            prev_error: 0.0,
            velocity_error: 0.0,
            total_error: 0.0,
            setpoint: 0.0,
            has_measurement: false,
        }
    }

    /// Treat inputs as points on a circle spanning `[min, max)`.
    pub fn enable_continuous_input(&mut self, min: f64, max: f64) {
        self.continuous = Some((min, max));
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Error from the last `calculate` call.
    pub fn position_error(&self) -> f64 {
        self.error
    }

    /// Next output for `measurement` tracking `setpoint`.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64) -> f64 {
        self.setpoint = setpoint;
        self.prev_error = self.error;
        self.error = self.wrap_error(setpoint - measurement);

        self.velocity_error = if self.has_measurement && self.period_s > 0.0 {
            (self.error - self.prev_error) / self.period_s
        } else {
            0.0
        };
        self.has_measurement = true;

        if self.gains.ki != 0.0 {
            let bound = INTEGRATOR_LIMIT / self.gains.ki.abs();
            self.total_error = (self.total_error + self.error * self.period_s).clamp(-bound, bound);
        }

        self.gains.kp * self.error
            + self.gains.ki * self.total_error
            + self.gains.kd * self.velocity_error
    }

    /// True once a measurement has been taken and the error is inside the
    /// tolerance.
    pub fn at_setpoint(&self) -> bool {
        self.has_measurement && self.error.abs() < self.gains.tolerance
    }

    pub fn reset(&mut self) {
        self.error = 0.0;
        self.prev_error = 0.0;
        self.velocity_error = 0.0;
        self.total_error = 0.0;
        self.has_measurement = false;
    }

    fn wrap_error(&self, error: f64) -> f64 {
        match self.continuous {
            Some((min, max)) => {
                let span = max - min;
                let half = span / 2.0;
                let mut e = (error + half).rem_euclid(span) - half;
                // Keep the half-open interval (-half, half]
                if e <= -half {
                    e += span;
                }
                e
            }
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn gains(kp: f64) -> PidGains {
        PidGains {
            kp,
            ki: 0.0,
            kd: 0.0,
            tolerance: 0.05,
        }
    }

    #[test]
    fn test_proportional_only() {
        let mut pid = PidController::new(gains(2.0), 0.02);
        assert_relative_eq!(pid.calculate(1.0, 3.0), 4.0);
    }

    #[test]
    fn test_continuous_wraparound() {
        let mut pid = PidController::new(gains(1.0), 0.02);
        pid.enable_continuous_input(-PI, PI);
        let heading = 179f64.to_radians();
        let bearing = (-179f64).to_radians();
        pid.calculate(heading, bearing);
        assert_relative_eq!(pid.position_error(), 2f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_at_setpoint_requires_measurement() {
        let mut pid = PidController::new(gains(1.0), 0.02);
        assert!(!pid.at_setpoint());
        pid.calculate(0.99, 1.0);
        assert!(pid.at_setpoint());
        pid.reset();
        assert!(!pid.at_setpoint());
    }

    #[test]
    fn test_integral_accumulates_and_clamps() {
        let mut pid = PidController::new(
            PidGains {
                kp: 0.0,
                ki: 1.0,
                kd: 0.0,
                tolerance: 0.01,
            },
            0.02,
        );
        let first = pid.calculate(0.0, 1.0);
        assert_relative_eq!(first, 0.02, epsilon = 1e-12);
        for _ in 0..1000 {
            pid.calculate(0.0, 1.0);
        }
        assert_relative_eq!(pid.calculate(0.0, 1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_ignores_first_sample() {
        let mut pid = PidController::new(
            PidGains {
                kp: 0.0,
                ki: 0.0,
                kd: 1.0,
                tolerance: 0.01,
            },
            0.02,
        );
        assert_relative_eq!(pid.calculate(0.0, 1.0), 0.0);
        // Error shrinks by 0.1 in one period
        assert_relative_eq!(pid.calculate(0.1, 1.0), -5.0, epsilon = 1e-9);
    }
}
