// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unified noise generator with color filtering.
//!
//! Combines the LCG, MLS and velvet noise generators with a
//! [`SpectralTilt`] coloring filter to produce white, pink, red, blue,
//! violet or arbitrarily sloped noise. Amplitude and offset are applied
//! after coloring, identically for every algorithm.

use crate::dsp::ops;
use crate::filters::spectral_tilt::{SpectralTilt, DEFAULT_ORDER};
use crate::noise::lcg::{Lcg, LcgDistribution};
use crate::noise::mls::Mls;
use crate::noise::velvet::{Velvet, VelvetType};
use crate::units::{seconds_to_samples, slope_to_npn, SlopeUnit};

/// Type of noise generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseGeneratorType {
    /// Maximum Length Sequence generator.
    Mls,
    /// Linear Congruential Generator.
    #[default]
    Lcg,
    /// Velvet noise generator.
    Velvet,
}

impl NoiseGeneratorType {
    pub fn name(self) -> &'static str {
        match self {
            NoiseGeneratorType::Mls => "MLS",
            NoiseGeneratorType::Lcg => "LCG",
            NoiseGeneratorType::Velvet => "Velvet",
        }
    }
}

/// Color of noise (spectral characteristic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseColor {
    /// White noise (flat spectrum, 0 dB/octave).
    #[default]
    White,
    /// Pink noise (-3 dB/octave, 1/f).
    Pink,
    /// Red/Brown noise (-6 dB/octave, 1/f²).
    Red,
    /// Blue noise (+3 dB/octave).
    Blue,
    /// Violet noise (+6 dB/octave).
    Violet,
    /// Arbitrary slope (user-defined).
    Arbitrary,
}

impl NoiseColor {
    pub fn name(self) -> &'static str {
        match self {
            NoiseColor::White => "White",
            NoiseColor::Pink => "Pink",
            NoiseColor::Red => "Red",
            NoiseColor::Blue => "Blue",
            NoiseColor::Violet => "Violet",
            NoiseColor::Arbitrary => "Arbitrary",
        }
    }

    /// Magnitude slope of a named color in nepers per neper.
    ///
    /// Returns `None` for [`NoiseColor::Arbitrary`].
    pub fn slope_npn(self) -> Option<f32> {
        match self {
            NoiseColor::White => Some(0.0),
            NoiseColor::Pink => Some(-0.5),
            NoiseColor::Red => Some(-1.0),
            NoiseColor::Blue => Some(0.5),
            NoiseColor::Violet => Some(1.0),
            NoiseColor::Arbitrary => None,
        }
    }
}

const UPD_MLS: u8 = 1 << 0;
const UPD_LCG: u8 = 1 << 1;
const UPD_VELVET: u8 = 1 << 2;
const UPD_COLOR: u8 = 1 << 3;
const UPD_ALL: u8 = UPD_MLS | UPD_LCG | UPD_VELVET | UPD_COLOR;

/// Unified noise generator with color filtering.
///
/// Setters only record the new value; the generators and the coloring
/// filter are reconfigured by [`update`](Self::update), which every
/// `process_*` call runs first.
///
/// # Examples
/// ```
/// use noisegen_dsp::noise::generator::{NoiseColor, NoiseGenerator, NoiseGeneratorType};
///
/// let mut noise_gen = NoiseGenerator::new();
/// noise_gen.init_with_seeds(64, 0xACE1, 1, 2, 64, 0xBEEF);
/// noise_gen.set_sample_rate(48000.0);
/// noise_gen.set_generator(NoiseGeneratorType::Lcg);
/// noise_gen.set_noise_color(NoiseColor::Pink);
/// noise_gen.set_amplitude(0.5);
///
/// let mut output = vec![0.0; 1000];
/// noise_gen.process_overwrite(&mut output);
/// assert!(output.iter().all(|s| s.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    mls: Mls,
    lcg: Lcg,
    velvet: Velvet,
    color_filter: SpectralTilt,

    generator_type: NoiseGeneratorType,
    color: NoiseColor,
    sample_rate: f32,
    amplitude: f32,
    offset: f32,

    mls_n_bits: usize,
    mls_seed: u64,
    lcg_distribution: LcgDistribution,
    velvet_type: VelvetType,
    velvet_window_width_s: f32,
    velvet_arn_delta: f32,
    velvet_crush: bool,
    velvet_crush_prob: f32,

    color_order: usize,
    color_slope: f32,
    color_slope_unit: SlopeUnit,

    update_flags: u8,
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseGenerator {
    /// Create a new noise generator with default settings.
    pub fn new() -> Self {
        Self {
            mls: Mls::new(),
            lcg: Lcg::new(),
            velvet: Velvet::new(),
            color_filter: SpectralTilt::new(),
            generator_type: NoiseGeneratorType::default(),
            color: NoiseColor::default(),
            sample_rate: 48000.0,
            amplitude: 1.0,
            offset: 0.0,
            mls_n_bits: Mls::maximum_number_of_bits(),
            mls_seed: 0,
            lcg_distribution: LcgDistribution::default(),
            velvet_type: VelvetType::default(),
            velvet_window_width_s: 0.1,
            velvet_arn_delta: 0.5,
            velvet_crush: false,
            velvet_crush_prob: 0.5,
            color_order: DEFAULT_ORDER,
            color_slope: 0.0,
            color_slope_unit: SlopeUnit::NeperPerNeper,
            update_flags: UPD_ALL,
        }
    }

    /// Initialize with specific seeds for all generators.
    pub fn init_with_seeds(
        &mut self,
        mls_n_bits: usize,
        mls_seed: u64,
        lcg_seed: u32,
        velvet_rand_seed: u32,
        velvet_mls_n_bits: usize,
        velvet_mls_seed: u64,
    ) {
        self.mls_n_bits = mls_n_bits;
        self.mls_seed = mls_seed;

        self.lcg.init_with_seed(lcg_seed);
        self.velvet
            .init_with_seeds(velvet_rand_seed, velvet_mls_n_bits, velvet_mls_seed);
        self.color_filter.clear();

        self.update_flags = UPD_ALL;
    }

    /// Set the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if self.sample_rate == sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        self.update_flags |= UPD_COLOR | UPD_VELVET;
    }

    /// Set the generator type.
    pub fn set_generator(&mut self, gen_type: NoiseGeneratorType) {
        self.generator_type = gen_type;
    }

    /// Set the noise color.
    pub fn set_noise_color(&mut self, color: NoiseColor) {
        if self.color == color {
            return;
        }
        self.color = color;
        self.update_flags |= UPD_COLOR;
    }

    /// Set the amplitude (linear post-multiply).
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Set the offset (added after amplitude).
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Set LCG distribution.
    pub fn set_lcg_distribution(&mut self, dist: LcgDistribution) {
        if self.lcg_distribution == dist {
            return;
        }
        self.lcg_distribution = dist;
        self.update_flags |= UPD_LCG;
    }

    /// Set velvet noise type.
    pub fn set_velvet_type(&mut self, velvet_type: VelvetType) {
        if self.velvet_type == velvet_type {
            return;
        }
        self.velvet_type = velvet_type;
        self.update_flags |= UPD_VELVET;
    }

    /// Set velvet window width in seconds.
    pub fn set_velvet_window_width(&mut self, width_s: f32) {
        if self.velvet_window_width_s == width_s {
            return;
        }
        self.velvet_window_width_s = width_s;
        self.update_flags |= UPD_VELVET;
    }

    /// Set velvet ARN delta parameter.
    pub fn set_velvet_arn_delta(&mut self, delta: f32) {
        if self.velvet_arn_delta == delta {
            return;
        }
        self.velvet_arn_delta = delta;
        self.update_flags |= UPD_VELVET;
    }

    /// Set velvet crush mode.
    pub fn set_velvet_crush(&mut self, crush: bool) {
        if self.velvet_crush == crush {
            return;
        }
        self.velvet_crush = crush;
        self.update_flags |= UPD_VELVET;
    }

    /// Set velvet crushing probability in [0, 1].
    pub fn set_velvet_crushing_probability(&mut self, prob: f32) {
        if self.velvet_crush_prob == prob {
            return;
        }
        self.velvet_crush_prob = prob;
        self.update_flags |= UPD_VELVET;
    }

    /// Set coloring filter order.
    pub fn set_coloring_order(&mut self, order: usize) {
        if self.color_order == order {
            return;
        }
        self.color_order = order;
        self.update_flags |= UPD_COLOR;
    }

    /// Set the slope used by [`NoiseColor::Arbitrary`].
    pub fn set_color_slope(&mut self, slope: f32, unit: SlopeUnit) {
        if self.color_slope == slope && self.color_slope_unit == unit {
            return;
        }
        self.color_slope = slope;
        self.color_slope_unit = unit;
        self.update_flags |= UPD_COLOR;
    }

    pub fn generator(&self) -> NoiseGeneratorType {
        self.generator_type
    }

    pub fn noise_color(&self) -> NoiseColor {
        self.color
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn lcg_distribution(&self) -> LcgDistribution {
        self.lcg_distribution
    }

    pub fn velvet_type(&self) -> VelvetType {
        self.velvet_type
    }

    pub fn velvet_window_width(&self) -> f32 {
        self.velvet_window_width_s
    }

    pub fn velvet_arn_delta(&self) -> f32 {
        self.velvet_arn_delta
    }

    pub fn velvet_crush(&self) -> bool {
        self.velvet_crush
    }

    pub fn velvet_crushing_probability(&self) -> f32 {
        self.velvet_crush_prob
    }

    pub fn color_slope(&self) -> (f32, SlopeUnit) {
        (self.color_slope, self.color_slope_unit)
    }

    /// Effective coloring slope in nepers per neper.
    pub fn color_slope_npn(&self) -> f32 {
        self.color
            .slope_npn()
            .unwrap_or_else(|| slope_to_npn(self.color_slope, self.color_slope_unit))
    }

    /// Whether any setting is waiting for [`update`](Self::update).
    pub fn needs_update(&self) -> bool {
        self.update_flags != 0
    }

    /// The MLS generator.
    pub fn mls(&self) -> &Mls {
        &self.mls
    }

    /// The velvet noise generator.
    pub fn velvet(&self) -> &Velvet {
        &self.velvet
    }

    /// The coloring filter.
    pub fn color_filter(&self) -> &SpectralTilt {
        &self.color_filter
    }

    /// Push pending settings into the generators and recompute the coloring
    /// filter. Does nothing when no setting changed.
    pub fn update(&mut self) {
        if self.update_flags == 0 {
            return;
        }

        if (self.update_flags & UPD_MLS) != 0 {
            self.mls.set_n_bits(self.mls_n_bits);
            self.mls.set_state(self.mls_seed);
        }

        if (self.update_flags & UPD_LCG) != 0 {
            self.lcg.set_distribution(self.lcg_distribution);
        }

        if (self.update_flags & UPD_VELVET) != 0 {
            self.velvet.set_velvet_type(self.velvet_type);
            let window_width_samples =
                seconds_to_samples(self.sample_rate, self.velvet_window_width_s);
            self.velvet.set_window_width(window_width_samples);
            self.velvet.set_delta(self.velvet_arn_delta);
            self.velvet.set_crush(self.velvet_crush);
            self.velvet.set_crush_probability(self.velvet_crush_prob);
        }

        if (self.update_flags & UPD_COLOR) != 0 {
            let slope = self.color_slope_npn();
            self.color_filter
                .set_sample_rate(self.sample_rate)
                .set_order(self.color_order)
                .set_slope(slope, SlopeUnit::NeperPerNeper);
            self.color_filter.update();
        }

        self.update_flags = 0;
    }

    /// Raw noise, colored, then scaled and offset.
    fn do_process(&mut self, dst: &mut [f32]) {
        match self.generator_type {
            NoiseGeneratorType::Mls => self.mls.process_overwrite(dst),
            NoiseGeneratorType::Velvet => self.velvet.process_overwrite(dst),
            NoiseGeneratorType::Lcg => self.lcg.process_overwrite(dst),
        }

        self.color_filter.process_inplace(dst);
        ops::scale_offset(dst, self.amplitude, self.offset);
    }

    /// Output noise to a destination buffer, overwriting its content.
    pub fn process_overwrite(&mut self, dst: &mut [f32]) {
        self.update();
        self.do_process(dst);
    }

    /// Magnitude response of the coloring filter scaled by `|amplitude|`,
    /// written to `dst` for each frequency in `freqs`.
    ///
    /// Reflects the state after the last [`update`](Self::update).
    pub fn freq_chart(&self, freqs: &[f32], dst: &mut [f32]) {
        let n = freqs.len().min(dst.len());
        dst[..n].fill(self.amplitude.abs());
        self.color_filter.freq_chart(&freqs[..n], &mut dst[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> NoiseGenerator {
        let mut generator = NoiseGenerator::new();
        generator.init_with_seeds(Mls::maximum_number_of_bits(), 0xACE1, 7, 11, 32, 0xBEEF);
        generator
    }

    fn rms(buf: &[f32]) -> f32 {
        (buf.iter().map(|x| x * x).sum::<f32>() / buf.len() as f32).sqrt()
    }

    #[test]
    fn test_generator_default() {
        let generator = NoiseGenerator::new();
        assert_eq!(generator.generator(), NoiseGeneratorType::Lcg);
        assert_eq!(generator.noise_color(), NoiseColor::White);
        assert_eq!(generator.amplitude(), 1.0);
        assert_eq!(generator.offset(), 0.0);
        assert!(generator.needs_update());
    }

    #[test]
    fn test_generator_lcg() {
        let mut generator = seeded();
        generator.set_lcg_distribution(LcgDistribution::Uniform);

        let mut output = vec![0.0; 1000];
        generator.process_overwrite(&mut output);

        assert!(output.iter().any(|&x| x != 0.0), "LCG should produce output");
        assert!(output.iter().all(|&x| (-1.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_generator_mls() {
        let mut generator = NoiseGenerator::new();
        generator.init_with_seeds(16, 0xACE1, 7, 11, 32, 0xBEEF);
        generator.set_generator(NoiseGeneratorType::Mls);

        let mut output = vec![0.0; 100];
        generator.process_overwrite(&mut output);

        for &sample in output.iter() {
            assert!(sample == 1.0 || sample == -1.0, "MLS should output ±1, got {sample}");
        }
    }

    #[test]
    fn test_generator_velvet() {
        let mut generator = seeded();
        generator.set_sample_rate(48000.0);
        generator.set_generator(NoiseGeneratorType::Velvet);
        generator.set_velvet_type(VelvetType::Ovn);
        generator.set_velvet_window_width(0.001); // 48 samples

        let mut output = vec![0.0; 4800];
        generator.process_overwrite(&mut output);

        let non_zero = output.iter().filter(|&&x| x != 0.0).count();
        assert!((99..=100).contains(&non_zero), "one impulse per 1 ms window, got {non_zero}");
    }

    #[test]
    fn test_generator_amplitude_offset() {
        let mut generator = seeded();
        generator.set_generator(NoiseGeneratorType::Mls);
        generator.set_amplitude(2.0);
        generator.set_offset(1.0);

        let mut output = vec![0.0; 10];
        generator.process_overwrite(&mut output);

        for &sample in output.iter() {
            assert!(
                (sample - 3.0).abs() < 1e-6 || (sample + 1.0).abs() < 1e-6,
                "Sample {sample} not properly scaled"
            );
        }
    }

    #[test]
    fn test_color_slopes() {
        let mut generator = NoiseGenerator::new();
        for (color, npn) in [
            (NoiseColor::White, 0.0),
            (NoiseColor::Pink, -0.5),
            (NoiseColor::Red, -1.0),
            (NoiseColor::Blue, 0.5),
            (NoiseColor::Violet, 1.0),
        ] {
            generator.set_noise_color(color);
            assert_eq!(generator.color_slope_npn(), npn, "{}", color.name());
        }

        generator.set_noise_color(NoiseColor::Arbitrary);
        generator.set_color_slope(-12.0412, SlopeUnit::DbPerOctave);
        assert!((generator.color_slope_npn() + 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_white_leaves_filter_out_of_path() {
        let mut generator = seeded();
        generator.update();
        assert_eq!(generator.color_filter().active_sections(), 0);

        generator.set_noise_color(NoiseColor::Pink);
        generator.update();
        assert_eq!(generator.color_filter().active_sections(), DEFAULT_ORDER);
    }

    #[test]
    fn test_pink_reduces_high_band_energy() {
        let mut white = seeded();
        let mut pink = seeded();
        pink.set_noise_color(NoiseColor::Pink);

        let mut w = vec![0.0; 48000];
        let mut p = vec![0.0; 48000];
        white.process_overwrite(&mut w);
        pink.process_overwrite(&mut p);

        // Normalized to unity at DC, a falling slope can only remove energy.
        assert!(rms(&p) < rms(&w) * 0.5, "pink {} vs white {}", rms(&p), rms(&w));
        assert!(p.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut generator = seeded();
        generator.set_noise_color(NoiseColor::Red);
        generator.update();
        let before = generator.color_filter().freq_response(1000.0);
        generator.set_noise_color(NoiseColor::Red);
        assert!(!generator.needs_update(), "unchanged value must not mark dirty");
        generator.update();
        let after = generator.color_filter().freq_response(1000.0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_freq_chart_scales_with_amplitude() {
        let mut generator = seeded();
        generator.set_noise_color(NoiseColor::Pink);
        generator.set_amplitude(-2.0);
        generator.update();

        let freqs = [10.0, 100.0, 1000.0, 10000.0];
        let mut chart = [0.0; 4];
        generator.freq_chart(&freqs, &mut chart);

        for pair in chart.windows(2) {
            assert!(pair[1] < pair[0], "pink response must fall: {chart:?}");
        }
        assert!(chart[0] <= 2.0 + 1e-3 && chart[0] > 1.5, "{chart:?}");
    }

    #[test]
    fn test_deterministic_for_equal_seeds() {
        let mut a = seeded();
        let mut b = seeded();
        a.set_noise_color(NoiseColor::Blue);
        b.set_noise_color(NoiseColor::Blue);
        let mut x = vec![0.0; 1024];
        let mut y = vec![0.0; 1024];
        a.process_overwrite(&mut x);
        b.process_overwrite(&mut y);
        assert_eq!(x, y);
    }
}
