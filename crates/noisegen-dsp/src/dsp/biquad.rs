// SPDX-License-Identifier: LGPL-3.0-or-later

//! Single biquad section (transposed direct form II).
//!
//! **Important**: `a1` and `a2` are stored **pre-negated** compared to the
//! standard audio cookbook. The recurrence uses addition:
//! ```text
//!   s2   = b0 * x + d[0]
//!   p1   = b1 * x + a1 * s2
//!   p2   = b2 * x + a2 * s2
//!   d[0] = d[1] + p1
//!   d[1] = p2
//!   y    = s2
//! ```
//! so the transfer function reads
//! `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 - a1 z^-1 - a2 z^-2)`.
//!
//! First-order sections are biquads with `b2 = a2 = 0`.

use num_complex::Complex64;

/// Biquad coefficients, `a1`/`a2` pre-negated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Pass-through section.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Complex response at normalized angular frequency `w` (radians/sample).
    pub fn response(&self, w: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = z1 * z1;
        let num = Complex64::from(self.b0 as f64) + z1 * self.b1 as f64 + z2 * self.b2 as f64;
        let den = Complex64::from(1.0) - z1 * self.a1 as f64 - z2 * self.a2 as f64;
        num / den
    }

    /// Scale the numerator so the section gain is multiplied by `k`.
    pub fn scale_gain(&mut self, k: f32) {
        self.b0 *= k;
        self.b1 *= k;
        self.b2 *= k;
    }
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Biquad section with its delay memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    pub coeffs: BiquadCoeffs,
    d: [f32; 2],
}

impl Biquad {
    /// Create a section with the given coefficients and cleared state.
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, d: [0.0; 2] }
    }

    /// Clear the delay memory.
    pub fn reset(&mut self) {
        self.d = [0.0; 2];
    }

    /// Process one sample.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let s2 = c.b0 * x + self.d[0];
        let p1 = c.b1 * x + c.a1 * s2;
        let p2 = c.b2 * x + c.a2 * s2;
        self.d[0] = self.d[1] + p1;
        self.d[1] = p2;
        s2
    }

    /// Process `src` into `dst`.
    pub fn process(&mut self, dst: &mut [f32], src: &[f32]) {
        for (out, &inp) in dst.iter_mut().zip(src.iter()) {
            *out = self.tick(inp);
        }
    }

    /// Process a buffer in place.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        for s in buf.iter_mut() {
            *s = self.tick(*s);
        }
    }
}
