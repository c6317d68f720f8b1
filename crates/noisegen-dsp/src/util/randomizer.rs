// SPDX-License-Identifier: LGPL-3.0-or-later

//! Linear Congruential Generator for pseudorandom number generation.
//!
//! This is a simple but fast PRNG based on the recurrence relation:
//! `X[n+1] = (a * X[n] + c) mod m`
//!
//! Uses constants from Numerical Recipes (a=1664525, c=1013904223, m=2^32).
//! The randomizer never reads a clock: seeding is the caller's business so
//! that sequences are reproducible.

use std::f32::consts::PI;

/// Random number distribution type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomDistribution {
    /// Linear (uniform) distribution in [0, 1).
    Linear,
    /// One-sided exponential distribution with unit scale, in [0, inf).
    Exponential,
    /// Triangular distribution in [0, 1] peaking at 0.5.
    Triangle,
    /// Gaussian (normal) distribution with mean 0 and std dev 1.
    Gaussian,
}

/// Linear Congruential Generator for pseudorandom numbers.
#[derive(Debug, Clone)]
pub struct Randomizer {
    state: u32,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer {
    /// Create a new randomizer with a zero seed.
    pub fn new() -> Self {
        Self { state: 0 }
    }

    /// Create a randomizer from a seed.
    pub fn with_seed(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Restart the sequence from `seed`.
    pub fn init_with_seed(&mut self, seed: u32) {
        self.state = seed;
    }

    /// Current internal state (the last raw draw).
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Generate the next random number in the sequence (raw u32).
    fn next(&mut self) -> u32 {
        // LCG parameters from Numerical Recipes
        const A: u32 = 1664525;
        const C: u32 = 1013904223;
        self.state = self.state.wrapping_mul(A).wrapping_add(C);
        self.state
    }

    /// Generate a random value according to the specified distribution.
    pub fn random(&mut self, dist: RandomDistribution) -> f32 {
        match dist {
            RandomDistribution::Linear => self.random_linear(),
            RandomDistribution::Exponential => self.random_exponential(),
            RandomDistribution::Triangle => self.random_triangle(),
            RandomDistribution::Gaussian => self.random_gaussian(),
        }
    }

    /// Generate uniform random value in [0, 1).
    fn random_linear(&mut self) -> f32 {
        let val = self.next();
        // f64 keeps values just below 2^32 from rounding up to 1.0
        let x = (val as f64 / (u32::MAX as f64 + 1.0)) as f32;
        x.min(1.0 - f32::EPSILON * 0.5)
    }

    fn random_exponential(&mut self) -> f32 {
        // 1 - u lies in (0, 1], so the log is finite
        let u = 1.0 - self.random_linear();
        -u.ln()
    }

    fn random_triangle(&mut self) -> f32 {
        let u1 = self.random_linear();
        let u2 = self.random_linear();
        (u1 + u2) * 0.5
    }

    /// Box-Muller transform.
    fn random_gaussian(&mut self) -> f32 {
        let u1 = 1.0 - self.random_linear();
        let u2 = self.random_linear();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        r * theta.cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moments(rng: &mut Randomizer, dist: RandomDistribution, n: usize) -> (f64, f64) {
        let mut sum = 0.0_f64;
        let mut sum2 = 0.0_f64;
        for _ in 0..n {
            let v = rng.random(dist) as f64;
            sum += v;
            sum2 += v * v;
        }
        let mean = sum / n as f64;
        (mean, sum2 / n as f64 - mean * mean)
    }

    #[test]
    fn test_randomizer_init() {
        let mut rng = Randomizer::new();
        rng.init_with_seed(12345);
        let val1 = rng.random(RandomDistribution::Linear);

        rng.init_with_seed(12345);
        let val2 = rng.random(RandomDistribution::Linear);

        assert_eq!(val1, val2, "Same seed should produce same sequence");
    }

    #[test]
    fn test_linear_distribution() {
        let mut rng = Randomizer::with_seed(42);
        for _ in 0..10_000 {
            let val = rng.random(RandomDistribution::Linear);
            assert!(
                (0.0..1.0).contains(&val),
                "Linear value {val} should be in [0, 1)"
            );
        }
    }

    #[test]
    fn test_exponential_distribution() {
        let mut rng = Randomizer::with_seed(42);
        let (mean, var) = moments(&mut rng, RandomDistribution::Exponential, 200_000);
        assert!((mean - 1.0).abs() < 0.02, "Exponential mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "Exponential variance {var}");
    }

    #[test]
    fn test_triangle_distribution() {
        let mut rng = Randomizer::with_seed(7);
        for _ in 0..1000 {
            let val = rng.random(RandomDistribution::Triangle);
            assert!((0.0..=1.0).contains(&val), "Triangle value {val}");
        }
        let (mean, var) = moments(&mut rng, RandomDistribution::Triangle, 200_000);
        assert!((mean - 0.5).abs() < 0.01, "Triangle mean {mean}");
        // Variance of the mean of two U(0,1) draws is 1/24
        assert!((var - 1.0 / 24.0).abs() < 0.003, "Triangle variance {var}");
    }

    #[test]
    fn test_gaussian_distribution() {
        let mut rng = Randomizer::with_seed(42);
        let (mean, var) = moments(&mut rng, RandomDistribution::Gaussian, 200_000);
        assert!(mean.abs() < 0.02, "Gaussian mean {mean}");
        assert!((var - 1.0).abs() < 0.03, "Gaussian variance {var}");
    }

    #[test]
    fn test_all_values_finite() {
        for dist in [
            RandomDistribution::Linear,
            RandomDistribution::Exponential,
            RandomDistribution::Triangle,
            RandomDistribution::Gaussian,
        ] {
            let mut rng = Randomizer::with_seed(0);
            for _ in 0..10_000 {
                let v = rng.random(dist);
                assert!(v.is_finite(), "{dist:?} produced {v}");
            }
        }
    }
}
