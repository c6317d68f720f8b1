// SPDX-License-Identifier: LGPL-3.0-or-later

//! Linear Congruential Generator with multiple distributions.
//!
//! Every distribution is zero-mean, but variances are not normalized.
//! Amplitude is applied as a plain multiply downstream, so switching
//! distributions changes the output power:
//!
//! | Distribution | Support    | Shape                              | Variance |
//! |--------------|------------|------------------------------------|----------|
//! | Uniform      | [-1, 1)    | flat                               | 1/3      |
//! | Exponential  | (-inf, inf)| double-sided (Laplace), unit scale | 2        |
//! | Triangular   | [-1, 1]    | triangle peaking at 0              | 1/6      |
//! | Gaussian     | (-inf, inf)| standard normal                    | 1        |

use crate::util::randomizer::{RandomDistribution, Randomizer};

/// Distribution type for LCG noise generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LcgDistribution {
    /// Uniform distribution over [-1, 1).
    Uniform,
    /// Double-sided exponential distribution.
    Exponential,
    /// Triangular distribution over [-1, 1].
    Triangular,
    /// Gaussian distribution with mean 0 and standard deviation 1.
    #[default]
    Gaussian,
}

impl LcgDistribution {
    pub fn name(self) -> &'static str {
        match self {
            LcgDistribution::Uniform => "uniform",
            LcgDistribution::Exponential => "exponential",
            LcgDistribution::Triangular => "triangular",
            LcgDistribution::Gaussian => "gaussian",
        }
    }
}

/// Linear Congruential Generator for noise generation.
///
/// # Examples
/// ```
/// use noisegen_dsp::noise::lcg::{Lcg, LcgDistribution};
///
/// let mut lcg = Lcg::new();
/// lcg.init_with_seed(42);
/// lcg.set_distribution(LcgDistribution::Uniform);
///
/// let sample = lcg.process_single();
/// assert!((-1.0..1.0).contains(&sample));
/// ```
#[derive(Debug, Clone)]
pub struct Lcg {
    distribution: LcgDistribution,
    randomizer: Randomizer,
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

impl Lcg {
    /// Create a new LCG generator with default settings.
    pub fn new() -> Self {
        Self {
            distribution: LcgDistribution::default(),
            randomizer: Randomizer::new(),
        }
    }

    /// Initialize with a specific seed.
    pub fn init_with_seed(&mut self, seed: u32) {
        self.randomizer.init_with_seed(seed);
    }

    /// Set the distribution for the noise.
    pub fn set_distribution(&mut self, dist: LcgDistribution) {
        self.distribution = dist;
    }

    /// Get the current distribution.
    pub fn distribution(&self) -> LcgDistribution {
        self.distribution
    }

    /// Generate a single sample from the LCG generator.
    pub fn process_single(&mut self) -> f32 {
        match self.distribution {
            LcgDistribution::Exponential => {
                let sign = if self.randomizer.random(RandomDistribution::Linear) >= 0.5 {
                    1.0
                } else {
                    -1.0
                };
                sign * self.randomizer.random(RandomDistribution::Exponential)
            }
            LcgDistribution::Triangular => {
                // Map from [0, 1] to [-1, 1]
                2.0 * self.randomizer.random(RandomDistribution::Triangle) - 1.0
            }
            LcgDistribution::Gaussian => self.randomizer.random(RandomDistribution::Gaussian),
            LcgDistribution::Uniform => {
                // Map from [0, 1) to [-1, 1)
                2.0 * self.randomizer.random(RandomDistribution::Linear) - 1.0
            }
        }
    }

    /// Output sequence to a destination buffer, overwriting its content.
    pub fn process_overwrite(&mut self, dst: &mut [f32]) {
        for d in dst.iter_mut() {
            *d = self.process_single();
        }
    }
}
