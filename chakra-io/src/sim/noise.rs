//! Reproducible sensor noise for the simulator.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Zero-mean Gaussian source shared by the simulated encoders, gyro and camera.
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// A zero seed picks a fresh random stream per run.
    pub fn new(seed: u64) -> Self {
        let rng = match seed {
            0 => SmallRng::from_entropy(),
            s => SmallRng::seed_from_u64(s),
        };
        Self { rng }
    }

    /// One draw scaled by `std_dev`; exactly zero when `std_dev` is not positive.
    pub fn gaussian(&mut self, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return 0.0;
        }
        std_dev * self.rng.sample::<f64, _>(StandardNormal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut first = NoiseGenerator::new(7);
        let mut second = NoiseGenerator::new(7);
        let a: Vec<f64> = (0..50).map(|_| first.gaussian(0.1)).collect();
        let b: Vec<f64> = (0..50).map(|_| second.gaussian(0.1)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_off() {
        let mut noise = NoiseGenerator::new(7);
        assert!((0..20).all(|_| noise.gaussian(0.0) == 0.0));
    }
}
