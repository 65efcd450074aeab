//! Rate limiter for stick and controller outputs.

/// Limits how fast a signal may change, in units per second.
#[derive(Debug, Clone)]
pub struct SlewRateLimiter {
    rate: f64,
    period_s: f64,
    value: f64,
}

impl SlewRateLimiter {
    pub fn new(rate: f64, period_s: f64) -> Self {
        Self {
            rate: rate.abs(),
            period_s,
            value: 0.0,
        }
    }

    /// Advance one period toward `input`.
    pub fn calculate(&mut self, input: f64) -> f64 {
        let max_step = self.rate * self.period_s;
        self.value += (input - self.value).clamp(-max_step, max_step);
        self.value
    }

    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_limits_step() {
        let mut limiter = SlewRateLimiter::new(1.0, 0.02);
        assert_relative_eq!(limiter.calculate(1.0), 0.02);
        assert_relative_eq!(limiter.calculate(1.0), 0.04);
        assert_relative_eq!(limiter.calculate(-1.0), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_reaches_target() {
        let mut limiter = SlewRateLimiter::new(1.0, 0.02);
        for _ in 0..60 {
            limiter.calculate(0.5);
        }
        assert_relative_eq!(limiter.value(), 0.5);
    }

    #[test]
    fn test_reset() {
        let mut limiter = SlewRateLimiter::new(1.0, 0.02);
        limiter.reset(0.7);
        assert_relative_eq!(limiter.calculate(0.7), 0.7);
    }
}
