//! Feedback and input-shaping primitives used by the driving commands.

pub mod pid;
pub mod slew;

pub use pid::{PidController, PidGains};
pub use slew::SlewRateLimiter;

/// Zero out stick noise inside `deadband`.
#[inline]
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() > deadband { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadband() {
        assert_eq!(apply_deadband(0.05, 0.075), 0.0);
        assert_eq!(apply_deadband(-0.075, 0.075), 0.0);
        assert_eq!(apply_deadband(0.3, 0.075), 0.3);
        assert_eq!(apply_deadband(-0.3, 0.075), -0.3);
    }
}
