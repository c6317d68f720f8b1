// SPDX-License-Identifier: LGPL-3.0-or-later

//! Nth-order Butterworth filter using cascaded second-order sections.
//!
//! Butterworth filters are maximally flat in the passband. The rolloff
//! slope is 20*N dB/decade where N is the filter order. Lowpass and
//! highpass variants are provided with orders from 1 to 64, which is
//! enough for the steep band-splitting the inaudible-noise path needs.
//!
//! For even orders, N/2 biquad sections are used. For odd orders, one
//! first-order section plus (N-1)/2 biquad sections are used. The k-th
//! conjugate pole pair of the analog prototype sits at angle
//! `theta = pi * (2k + 1) / (2N)` from the imaginary axis, giving the
//! section denominator `s^2 + 2 sin(theta) s + 1`. Sections are mapped to
//! the z-plane with the bilinear transform and a pre-warped cutoff.
//! Coefficients are computed in `f64` and stored as `f32`.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::dsp::biquad::{Biquad, BiquadCoeffs};

/// Maximum supported filter order.
pub const MAX_ORDER: usize = 64;

/// Maximum number of cascaded sections (ceil(MAX_ORDER / 2)).
const MAX_SECTIONS: usize = MAX_ORDER / 2;

/// Highest cutoff, as a fraction of the sample rate.
const MAX_NORM_CUTOFF: f64 = 0.4999;

/// Butterworth filter type (lowpass or highpass).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButterworthType {
    /// Lowpass: passes frequencies below the cutoff.
    Lowpass,
    /// Highpass: passes frequencies above the cutoff.
    #[default]
    Highpass,
}

impl ButterworthType {
    pub fn name(self) -> &'static str {
        match self {
            ButterworthType::Lowpass => "lowpass",
            ButterworthType::Highpass => "highpass",
        }
    }
}

/// Nth-order Butterworth filter using cascaded second-order sections.
///
/// # Examples
///
/// ```
/// use noisegen_dsp::filters::butterworth::{ButterworthFilter, ButterworthType};
///
/// let mut filt = ButterworthFilter::new();
/// filt.set_sample_rate(48000.0)
///     .set_order(4)
///     .set_filter_type(ButterworthType::Lowpass)
///     .set_cutoff(1000.0);
/// filt.update();
///
/// let input = vec![1.0f32; 4096];
/// let mut output = vec![0.0f32; 4096];
/// filt.process(&mut output, &input);
/// ```
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    filter_type: ButterworthType,
    sample_rate: f32,
    cutoff: f32,
    order: usize,
    dirty: bool,
    sections: [Biquad; MAX_SECTIONS],
    n_sections: usize,
}

impl Default for ButterworthFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ButterworthFilter {
    /// Create a new Butterworth filter with default settings.
    ///
    /// Defaults: Highpass, 48 kHz sample rate, 1000 Hz cutoff, order 2.
    pub fn new() -> Self {
        Self {
            filter_type: ButterworthType::default(),
            sample_rate: 48000.0,
            cutoff: 1000.0,
            order: 2,
            dirty: true,
            sections: [Biquad::default(); MAX_SECTIONS],
            n_sections: 1,
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

    /// Set the filter order (clamped to `1..=MAX_ORDER`).
    pub fn set_order(&mut self, order: usize) -> &mut Self {
        let order = order.clamp(1, MAX_ORDER);
        if self.order != order {
            self.order = order;
            self.dirty = true;
        }
        self
    }

    /// Set the cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, freq: f32) -> &mut Self {
        if self.cutoff != freq {
            self.cutoff = freq;
            self.dirty = true;
        }
        self
    }

    /// Set the filter type (lowpass or highpass).
    pub fn set_filter_type(&mut self, ft: ButterworthType) -> &mut Self {
        if self.filter_type != ft {
            self.filter_type = ft;
            self.dirty = true;
        }
        self
    }

    pub fn filter_type(&self) -> ButterworthType {
        self.filter_type
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of cascaded sections for the current order.
    pub fn sections(&self) -> usize {
        self.n_sections
    }

    /// Recalculate filter coefficients if parameters have changed.
    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }

        let n = self.order;
        self.n_sections = n.div_ceil(2);

        let fs = self.sample_rate.max(1.0) as f64;
        let fc = (self.cutoff as f64).clamp(1e-3, fs * MAX_NORM_CUTOFF);
        // Pre-warp the cutoff frequency for bilinear transform
        let wc = (PI * fc / fs).tan();

        let mut idx = 0;
        if n % 2 == 1 {
            self.sections[idx].coeffs = self.first_order_section(wc);
            idx += 1;
        }

        for k in 0..n / 2 {
            let theta = PI * (2 * k + 1) as f64 / (2 * n) as f64;
            self.sections[idx].coeffs = self.second_order_section(wc, theta);
            idx += 1;
        }

        self.dirty = false;
    }

    /// Reset filter state (clear all delay memory).
    pub fn clear(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Process audio from `src` into `dst`.
    pub fn process(&mut self, dst: &mut [f32], src: &[f32]) {
        let n = dst.len().min(src.len());
        if n == 0 {
            return;
        }
        dst[..n].copy_from_slice(&src[..n]);
        self.process_inplace(&mut dst[..n]);
    }

    /// Process audio in-place.
    ///
    /// Automatically calls [`update`](ButterworthFilter::update) if parameters
    /// are dirty.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        self.update();
        for section in &mut self.sections[..self.n_sections] {
            section.process_inplace(buf);
        }
    }

    /// Complex response at `freq` Hz from the current coefficients.
    pub fn freq_response(&self, freq: f32) -> Complex64 {
        let w = 2.0 * PI * freq as f64 / self.sample_rate as f64;
        self.sections[..self.n_sections]
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.coeffs.response(w))
    }

    /// Magnitude response at each of `freqs`, multiplied into `dst`.
    pub fn freq_chart(&self, freqs: &[f32], dst: &mut [f32]) {
        for (d, &f) in dst.iter_mut().zip(freqs.iter()) {
            *d *= self.freq_response(f).norm() as f32;
        }
    }

    /// First-order section `wc / (s + wc)` or `s / (s + wc)`.
    fn first_order_section(&self, wc: f64) -> BiquadCoeffs {
        let k = 1.0 / (1.0 + wc);
        // a1_std = (wc - 1) / (1 + wc), stored negated
        let a1 = ((1.0 - wc) * k) as f32;
        let (b0, b1) = match self.filter_type {
            ButterworthType::Lowpass => (wc * k, wc * k),
            ButterworthType::Highpass => (k, -k),
        };
        BiquadCoeffs {
            b0: b0 as f32,
            b1: b1 as f32,
            b2: 0.0,
            a1,
            a2: 0.0,
        }
    }

    /// Second-order section for the conjugate pole pair at `theta`.
    fn second_order_section(&self, wc: f64, theta: f64) -> BiquadCoeffs {
        let wc2 = wc * wc;
        let two_sin_theta = 2.0 * theta.sin();
        let inv_d = 1.0 / (1.0 + two_sin_theta * wc + wc2);

        let a1_std = 2.0 * (wc2 - 1.0) * inv_d;
        let a2_std = (1.0 - two_sin_theta * wc + wc2) * inv_d;

        let (b0, b1, b2) = match self.filter_type {
            ButterworthType::Lowpass => (wc2 * inv_d, 2.0 * wc2 * inv_d, wc2 * inv_d),
            ButterworthType::Highpass => (inv_d, -2.0 * inv_d, inv_d),
        };

        BiquadCoeffs {
            b0: b0 as f32,
            b1: b1 as f32,
            b2: b2 as f32,
            a1: -a1_std as f32,
            a2: -a2_std as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn make(ft: ButterworthType, order: usize, cutoff: f32) -> ButterworthFilter {
        let mut filt = ButterworthFilter::new();
        filt.set_sample_rate(SR)
            .set_order(order)
            .set_filter_type(ft)
            .set_cutoff(cutoff);
        filt.update();
        filt
    }

    fn mag_db(filt: &ButterworthFilter, freq: f32) -> f64 {
        20.0 * filt.freq_response(freq).norm().log10()
    }

    #[test]
    fn minus_3db_at_cutoff() {
        for ft in [ButterworthType::Lowpass, ButterworthType::Highpass] {
            for order in [1, 2, 3, 8, 17, 32, 64] {
                let filt = make(ft, order, 1000.0);
                let db = mag_db(&filt, 1000.0);
                assert!(
                    (db + 3.01).abs() < 0.5,
                    "{ft:?} order {order} at cutoff: expected ~-3dB, got {db:.2}dB"
                );
            }
        }
    }

    #[test]
    fn rolloff_slope() {
        // One decade into the stopband: -20*N dB
        for order in 1..=4 {
            let filt = make(ButterworthType::Lowpass, order, 500.0);
            let db = mag_db(&filt, 5000.0);
            let expected = -20.0 * order as f64;
            assert!(
                (db - expected).abs() < 2.0,
                "LP order {order}: {db:.1} dB at one decade, expected {expected}"
            );

            let filt = make(ButterworthType::Highpass, order, 5000.0);
            let db = mag_db(&filt, 500.0);
            assert!(
                (db - expected).abs() < 2.0,
                "HP order {order}: {db:.1} dB at one decade, expected {expected}"
            );
        }
    }

    #[test]
    fn order_64_highpass_near_nyquist() {
        let filt = make(ButterworthType::Highpass, 64, 20_000.0);
        assert_eq!(filt.sections(), 32);
        assert!(mag_db(&filt, 10_000.0) < -200.0, "10 kHz must be deeply rejected");
        assert!(mag_db(&filt, 18_000.0) < -60.0, "18 kHz must be rejected");
        assert!(mag_db(&filt, 23_000.0).abs() < 0.5, "23 kHz is in the passband");
    }

    #[test]
    fn order_64_processing_is_stable() {
        let mut filt = make(ButterworthType::Highpass, 64, 20_000.0);
        let mut buf = vec![0.0f32; 48000];
        buf[0] = 1.0;
        filt.process_inplace(&mut buf);
        assert!(buf.iter().all(|s| s.is_finite()));
        let tail = buf[24000..].iter().fold(0.0f32, |a, s| a.max(s.abs()));
        assert!(tail < 1e-4, "impulse response tail {tail} should decay");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filt = make(ButterworthType::Highpass, 4, 1000.0);
        let input = vec![1.0f32; 8192];
        let mut output = vec![0.0f32; 8192];
        filt.process(&mut output, &input);
        assert!(output[8000..].iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filt = make(ButterworthType::Lowpass, 5, 1000.0);
        let mut buf = vec![1.0f32; 8192];
        filt.process_inplace(&mut buf);
        assert!(buf[8000..].iter().all(|s| (s - 1.0).abs() < 1e-3));
    }

    #[test]
    fn process_inplace_matches_process() {
        let src: Vec<f32> = (0..1024).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();
        let mut a = make(ButterworthType::Highpass, 7, 3000.0);
        let mut b = a.clone();
        let mut out = vec![0.0f32; src.len()];
        a.process(&mut out, &src);
        let mut inplace = src.clone();
        b.process_inplace(&mut inplace);
        assert_eq!(out, inplace);
    }

    #[test]
    fn chart_multiplies_into_destination() {
        let filt = make(ButterworthType::Lowpass, 2, 1000.0);
        let freqs = [10.0, 1000.0];
        let mut dst = [2.0, 2.0];
        filt.freq_chart(&freqs, &mut dst);
        assert!((dst[0] - 2.0).abs() < 1e-3);
        assert!((dst[1] - 2.0 * std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-2);
    }

    #[test]
    fn order_clamping() {
        let mut filt = ButterworthFilter::new();
        filt.set_order(0);
        assert_eq!(filt.order(), 1);
        filt.set_order(500);
        assert_eq!(filt.order(), MAX_ORDER);
    }

    #[test]
    fn cutoff_above_nyquist_is_finite() {
        let mut filt = make(ButterworthType::Highpass, 64, 30_000.0);
        let mut buf = vec![0.5f32; 256];
        filt.process_inplace(&mut buf);
        assert!(buf.iter().all(|s| s.is_finite()));
    }
}
