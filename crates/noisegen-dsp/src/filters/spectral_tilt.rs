// SPDX-License-Identifier: LGPL-3.0-or-later

//! Spectral tilt filter producing a `f^slope` magnitude response.
//!
//! The slope is approximated by a cascade of first-order pole/zero sections.
//! Poles are spaced logarithmically between a lower and an upper frequency,
//! `p_k = fl * D^k` with `D = (fu / fl)^(1/N)`, and every pole is paired with
//! a zero at `z_k = p_k * D^(-slope)`. Averaged over log-frequency, the
//! cascade then rises or falls by `slope` nepers per neper.
//!
//! Each section is mapped to the z-plane by the bilinear transform with
//! pre-warped frequencies. The response is normalized so the filter never
//! boosts: unity at DC for negative slopes, unity at Nyquist for positive
//! slopes (the bilinear transform already gives every section unit Nyquist
//! gain there).

use std::f64::consts::PI;

use crate::dsp::biquad::{Biquad, BiquadCoeffs};
use crate::units::{slope_to_npn, SlopeUnit};

/// Maximum number of first-order sections.
pub const MAX_ORDER: usize = 64;

/// Default number of sections.
pub const DEFAULT_ORDER: usize = 32;

/// Default lower edge of the sloped band, in Hz.
pub const DEFAULT_LOWER_FREQUENCY: f32 = 10.0;

/// Default upper edge of the sloped band, in Hz.
pub const DEFAULT_UPPER_FREQUENCY: f32 = 20_000.0;

/// Slopes smaller than this (in nepers per neper) are treated as flat.
const FLAT_SLOPE: f32 = 1e-6;

/// Below this sample rate the filter stays flat.
const MIN_SAMPLE_RATE: f32 = 16.0;

/// Highest usable fraction of the sample rate for a pole or zero.
const MAX_NORM_FREQUENCY: f64 = 0.4999;

/// Spectral tilt filter.
///
/// # Examples
///
/// ```
/// use noisegen_dsp::filters::spectral_tilt::SpectralTilt;
/// use noisegen_dsp::units::SlopeUnit;
///
/// let mut tilt = SpectralTilt::new();
/// tilt.set_sample_rate(48000.0);
/// tilt.set_slope(-3.0103, SlopeUnit::DbPerOctave); // pink
/// tilt.update();
///
/// let mut buf = vec![1.0f32; 256];
/// tilt.process_inplace(&mut buf);
/// ```
#[derive(Debug, Clone)]
pub struct SpectralTilt {
    sample_rate: f32,
    order: usize,
    slope: f32,
    unit: SlopeUnit,
    lower_frequency: f32,
    upper_frequency: f32,
    dirty: bool,
    n_active: usize,
    sections: [Biquad; MAX_ORDER],
}

impl Default for SpectralTilt {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralTilt {
    /// Create a new spectral tilt filter with default settings.
    ///
    /// Defaults: 48 kHz sample rate, 32 sections, flat response.
    pub fn new() -> Self {
        Self {
            sample_rate: 48000.0,
            order: DEFAULT_ORDER,
            slope: 0.0,
            unit: SlopeUnit::NeperPerNeper,
            lower_frequency: DEFAULT_LOWER_FREQUENCY,
            upper_frequency: DEFAULT_UPPER_FREQUENCY,
            dirty: true,
            n_active: 0,
            sections: [Biquad::default(); MAX_ORDER],
        }
    }

    /// Set the sample rate in Hz.
    pub fn set_sample_rate(&mut self, sr: f32) -> &mut Self {
        if self.sample_rate != sr {
            self.sample_rate = sr;
            self.dirty = true;
        }
        self
    }

    /// Set the number of sections (clamped to `1..=MAX_ORDER`).
    pub fn set_order(&mut self, order: usize) -> &mut Self {
        let order = order.clamp(1, MAX_ORDER);
        if self.order != order {
            self.order = order;
            self.dirty = true;
        }
        self
    }

    /// Set the slope and the unit it is expressed in.
    ///
    /// Negative values darken (boost lows relative to highs), positive
    /// values brighten.
    pub fn set_slope(&mut self, slope: f32, unit: SlopeUnit) -> &mut Self {
        if self.slope != slope || self.unit != unit {
            self.slope = slope;
            self.unit = unit;
            self.dirty = true;
        }
        self
    }

    /// Set the band over which the slope is applied.
    pub fn set_frequency_range(&mut self, lower: f32, upper: f32) -> &mut Self {
        if self.lower_frequency != lower || self.upper_frequency != upper {
            self.lower_frequency = lower;
            self.upper_frequency = upper;
            self.dirty = true;
        }
        self
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Configured number of sections.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Slope value as set, in its own unit.
    pub fn slope(&self) -> f32 {
        self.slope
    }

    /// Unit of [`slope`](Self::slope).
    pub fn slope_unit(&self) -> SlopeUnit {
        self.unit
    }

    /// Slope in nepers per neper.
    pub fn slope_npn(&self) -> f32 {
        slope_to_npn(self.slope, self.unit)
    }

    /// Whether coefficients are pending recalculation.
    pub fn needs_update(&self) -> bool {
        self.dirty
    }

    /// Number of sections currently in the signal path (0 when flat).
    pub fn active_sections(&self) -> usize {
        self.n_active
    }

    /// Recalculate filter coefficients if parameters have changed.
    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let alpha = self.slope_npn() as f64;
        if !alpha.is_finite() || alpha.abs() < FLAT_SLOPE as f64 || self.sample_rate < MIN_SAMPLE_RATE {
            self.n_active = 0;
            return;
        }

        let fs = self.sample_rate as f64;
        let f_max = fs * MAX_NORM_FREQUENCY;
        let f_lo = (self.lower_frequency as f64).clamp(1.0, f_max * 0.5);
        let f_hi = (self.upper_frequency as f64).clamp(f_lo * 2.0, f_max);

        let n = self.order;
        let step = (f_hi / f_lo).powf(1.0 / n as f64);
        let zero_ratio = step.powf(-alpha);

        let prewarp = |f: f64| (PI * f.min(f_max) / fs).tan();

        for (k, section) in self.sections[..n].iter_mut().enumerate() {
            let fp = f_lo * step.powi(k as i32);
            let fz = fp * zero_ratio;
            let p = prewarp(fp);
            let z = prewarp(fz);

            let norm = 1.0 / (1.0 + p);
            // Unity at DC for negative slopes; Nyquist gain is already 1.
            let gain = if alpha < 0.0 { p / z } else { 1.0 };

            section.coeffs = BiquadCoeffs {
                b0: ((1.0 + z) * norm * gain) as f32,
                b1: ((z - 1.0) * norm * gain) as f32,
                b2: 0.0,
                a1: ((1.0 - p) * norm) as f32,
                a2: 0.0,
            };
        }

        self.n_active = n;
    }

    /// Reset filter state (clear all delay memory).
    pub fn clear(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Process audio from `src` into `dst`.
    ///
    /// Automatically calls [`update`](SpectralTilt::update) if parameters
    /// are dirty.
    pub fn process(&mut self, dst: &mut [f32], src: &[f32]) {
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
        self.process_inplace(&mut dst[..n]);
    }

    /// Process audio in-place.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        self.update();
        for section in &mut self.sections[..self.n_active] {
            section.process_inplace(buf);
        }
    }

    /// Complex response at `freq` Hz from the current coefficients.
    pub fn freq_response(&self, freq: f32) -> num_complex::Complex64 {
        let w = 2.0 * PI * freq as f64 / self.sample_rate as f64;
        self.sections[..self.n_active]
            .iter()
            .fold(num_complex::Complex64::new(1.0, 0.0), |acc, s| {
                acc * s.coeffs.response(w)
            })
    }

    /// Magnitude response at each of `freqs`, multiplied into `dst`.
    pub fn freq_chart(&self, freqs: &[f32], dst: &mut [f32]) {
        for (d, &f) in dst.iter_mut().zip(freqs.iter()) {
            *d *= self.freq_response(f).norm() as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn make(slope_npn: f32) -> SpectralTilt {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_slope(slope_npn, SlopeUnit::NeperPerNeper);
        tilt.update();
        tilt
    }

    fn mag_db(tilt: &SpectralTilt, freq: f32) -> f64 {
        20.0 * tilt.freq_response(freq).norm().log10()
    }

    #[test]
    fn zero_slope_is_bypassed() {
        let mut tilt = make(0.0);
        assert_eq!(tilt.active_sections(), 0);
        let mut buf = [0.5, -0.25, 1.0];
        tilt.process_inplace(&mut buf);
        assert_eq!(buf, [0.5, -0.25, 1.0]);
    }

    #[test]
    fn pink_slope_per_octave() {
        let tilt = make(-0.5);
        for (f_low, f_high) in [(100.0, 200.0), (500.0, 1000.0), (2000.0, 4000.0)] {
            let diff = mag_db(&tilt, f_high) - mag_db(&tilt, f_low);
            assert!(
                (diff + 3.01).abs() < 0.35,
                "pink: {f_low}->{f_high} Hz slope {diff:.2} dB, expected -3.01"
            );
        }
    }

    #[test]
    fn named_slopes_over_a_decade() {
        for (npn, expected_db) in [(-1.0, -20.0), (0.5, 10.0), (1.0, 20.0), (-2.0, -40.0)] {
            let tilt = make(npn);
            let diff = mag_db(&tilt, 1000.0) - mag_db(&tilt, 100.0);
            assert!(
                (diff - expected_db).abs() < 1.5,
                "{npn} NPN: decade slope {diff:.2} dB, expected {expected_db}"
            );
        }
    }

    #[test]
    fn units_are_equivalent() {
        let mut a = SpectralTilt::new();
        a.set_sample_rate(SR).set_slope(-0.5, SlopeUnit::NeperPerNeper);
        a.update();
        let mut b = SpectralTilt::new();
        b.set_sample_rate(SR).set_slope(-10.0, SlopeUnit::DbPerDecade);
        b.update();
        let mut c = SpectralTilt::new();
        c.set_sample_rate(SR)
            .set_slope(-0.5 * crate::units::DB_PER_OCTAVE_PER_NPN, SlopeUnit::DbPerOctave);
        c.update();

        for f in [50.0, 1000.0, 15000.0] {
            let (ma, mb, mc) = (mag_db(&a, f), mag_db(&b, f), mag_db(&c, f));
            assert!((ma - mb).abs() < 1e-3 && (ma - mc).abs() < 1e-3, "{f} Hz: {ma} {mb} {mc}");
        }
    }

    #[test]
    fn never_boosts() {
        for npn in [-2.0, -1.0, -0.5, 0.5, 1.0, 2.0] {
            let tilt = make(npn);
            for f in [1.0, 10.0, 100.0, 1000.0, 10000.0, 20000.0, 23999.0] {
                let db = mag_db(&tilt, f);
                assert!(db < 0.05, "{npn} NPN boosts {db:.3} dB at {f} Hz");
            }
        }
    }

    #[test]
    fn normalization_points() {
        let neg = make(-1.0);
        assert!(mag_db(&neg, 0.0).abs() < 0.1, "negative slope should be unity at DC");
        let pos = make(1.0);
        assert!(mag_db(&pos, SR * 0.5).abs() < 0.1, "positive slope should be unity at Nyquist");
    }

    #[test]
    fn sine_measurement_matches_response() {
        let mut tilt = make(-0.5);
        let freq = 1000.0_f32;
        let n = SR as usize;
        let src: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SR).sin())
            .collect();
        let mut dst = vec![0.0f32; n];
        tilt.process(&mut dst, &src);

        let start = n / 2;
        let rms = |b: &[f32]| (b.iter().map(|x| x * x).sum::<f32>() / b.len() as f32).sqrt();
        let measured = 20.0 * (rms(&dst[start..]) / rms(&src[start..])).log10() as f64;
        let predicted = mag_db(&tilt, freq);
        assert!(
            (measured - predicted).abs() < 0.2,
            "measured {measured:.2} dB vs predicted {predicted:.2} dB"
        );
    }

    #[test]
    fn low_sample_rate_is_stable() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(8000.0).set_slope(-1.0, SlopeUnit::NeperPerNeper);
        let mut buf = vec![0.0f32; 4096];
        buf[0] = 1.0;
        tilt.process_inplace(&mut buf);
        assert!(buf.iter().all(|s| s.is_finite()));
        assert!(buf[4000..].iter().all(|s| s.abs() < 1.0));
    }

    #[test]
    fn dirty_tracking() {
        let mut tilt = make(-0.5);
        assert!(!tilt.needs_update());
        tilt.set_slope(-0.5, SlopeUnit::NeperPerNeper);
        assert!(!tilt.needs_update(), "same slope must not dirty the filter");
        tilt.set_order(16);
        assert!(tilt.needs_update());
        tilt.update();
        assert_eq!(tilt.active_sections(), 16);
    }
}
