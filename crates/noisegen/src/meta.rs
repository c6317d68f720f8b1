// SPDX-License-Identifier: LGPL-3.0-or-later

//! Control metadata: value ranges, selector values and engine constants.
//!
//! Hosts send raw control values. Selectors arrive as integers and map to
//! enums with a documented fallback for unknown values; scalars are clamped
//! to their [`ControlRange`].

use noisegen_dsp::filters::butterworth::ButterworthType;
use noisegen_dsp::noise::generator::NoiseColor;
use noisegen_dsp::noise::lcg::LcgDistribution;
use noisegen_dsp::noise::velvet::VelvetType;
use noisegen_dsp::units::SlopeUnit;

/// Largest sub-block processed in one pass, in samples.
pub const BUFFER_SIZE: usize = 4096;
/// Number of sections in the coloring filter.
pub const COLOR_FILTER_ORDER: usize = 32;
/// Number of points on the frequency axis used for response plots.
pub const MESH_POINTS: usize = 640;
/// Lowest frequency on the plot axis, in Hz.
pub const PLOT_MIN_FREQUENCY: f32 = 10.0;
/// Maximum number of pooled generators.
pub const MAX_GENERATORS: usize = 4;
/// Maximum number of audio channels.
pub const MAX_CHANNELS: usize = 8;
/// Default bypass crossfade time, in seconds.
pub const BYPASS_TIME: f32 = 0.005;

/// Range of a scalar control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
    pub dfl: f32,
    pub step: f32,
}

impl ControlRange {
    pub const fn new(min: f32, max: f32, dfl: f32, step: f32) -> Self {
        Self { min, max, dfl, step }
    }

    /// Clamp `value` into the range. NaN yields the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.dfl
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Clamp `value`, then round it to the nearest step above `min`.
    pub fn snap(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        if self.step <= 0.0 {
            return value;
        }
        let steps = ((value - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }
}

/// Noise amplitude (linear).
pub const AMPLITUDE: ControlRange = ControlRange::new(0.0, 10.0, 1.0, 0.0001);
/// Noise offset (linear).
pub const OFFSET: ControlRange = ControlRange::new(-10.0, 10.0, 0.0, 0.0001);
/// Velvet window duration in seconds.
pub const VELVET_WINDOW: ControlRange = ControlRange::new(0.0001, 0.5, 0.1, 0.0001);
/// Velvet ARN delta.
pub const VELVET_ARN_DELTA: ControlRange = ControlRange::new(0.0, 1.0, 0.5, 0.0001);
/// Velvet crushing probability in percent.
pub const VELVET_CRUSH_PROBABILITY: ControlRange = ControlRange::new(0.0, 100.0, 50.0, 0.01);
/// Color slope in nepers per neper.
pub const COLOR_SLOPE_NPN: ControlRange = ControlRange::new(-2.0, 2.0, -0.5, 0.0001);
/// Color slope in dB per octave.
pub const COLOR_SLOPE_DBO: ControlRange = ControlRange::new(-12.0412, 12.0412, -3.0103, 0.0001);
/// Color slope in dB per decade.
pub const COLOR_SLOPE_DBD: ControlRange = ControlRange::new(-40.0, 40.0, -10.0, 0.0001);
/// Input, output and matrix gains (linear, up to +24 dB).
pub const GAIN: ControlRange = ControlRange::new(0.0, 15.85, 1.0, 0.0001);

/// Noise algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Generator produces silence.
    Off,
    Mls,
    #[default]
    Lcg,
    Velvet,
}

impl From<u32> for Algorithm {
    fn from(value: u32) -> Self {
        match value {
            0 => Algorithm::Off,
            1 => Algorithm::Mls,
            3 => Algorithm::Velvet,
            _ => Algorithm::Lcg,
        }
    }
}

impl From<Algorithm> for u32 {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Off => 0,
            Algorithm::Mls => 1,
            Algorithm::Lcg => 2,
            Algorithm::Velvet => 3,
        }
    }
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Off => "Off",
            Algorithm::Mls => "MLS",
            Algorithm::Lcg => "LCG",
            Algorithm::Velvet => "Velvet",
        }
    }
}

/// Color selector, including the unit for arbitrary slopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSelector {
    #[default]
    White,
    Pink,
    Red,
    Blue,
    Violet,
    ArbitraryNpn,
    ArbitraryDbo,
    ArbitraryDbd,
}

impl From<u32> for ColorSelector {
    fn from(value: u32) -> Self {
        match value {
            1 => ColorSelector::Pink,
            2 => ColorSelector::Red,
            3 => ColorSelector::Blue,
            4 => ColorSelector::Violet,
            5 => ColorSelector::ArbitraryNpn,
            6 => ColorSelector::ArbitraryDbo,
            7 => ColorSelector::ArbitraryDbd,
            _ => ColorSelector::White,
        }
    }
}

impl From<ColorSelector> for u32 {
    fn from(value: ColorSelector) -> Self {
        match value {
            ColorSelector::White => 0,
            ColorSelector::Pink => 1,
            ColorSelector::Red => 2,
            ColorSelector::Blue => 3,
            ColorSelector::Violet => 4,
            ColorSelector::ArbitraryNpn => 5,
            ColorSelector::ArbitraryDbo => 6,
            ColorSelector::ArbitraryDbd => 7,
        }
    }
}

impl ColorSelector {
    /// Noise color this selector picks.
    pub fn color(self) -> NoiseColor {
        match self {
            ColorSelector::White => NoiseColor::White,
            ColorSelector::Pink => NoiseColor::Pink,
            ColorSelector::Red => NoiseColor::Red,
            ColorSelector::Blue => NoiseColor::Blue,
            ColorSelector::Violet => NoiseColor::Violet,
            ColorSelector::ArbitraryNpn
            | ColorSelector::ArbitraryDbo
            | ColorSelector::ArbitraryDbd => NoiseColor::Arbitrary,
        }
    }

    /// Unit of the slope control this selector reads. Named colors report
    /// nepers per neper.
    pub fn slope_unit(self) -> SlopeUnit {
        match self {
            ColorSelector::ArbitraryDbo => SlopeUnit::DbPerOctave,
            ColorSelector::ArbitraryDbd => SlopeUnit::DbPerDecade,
            _ => SlopeUnit::NeperPerNeper,
        }
    }

    /// Range of the slope control this selector reads.
    pub fn slope_range(self) -> ControlRange {
        match self.slope_unit() {
            SlopeUnit::NeperPerNeper => COLOR_SLOPE_NPN,
            SlopeUnit::DbPerOctave => COLOR_SLOPE_DBO,
            SlopeUnit::DbPerDecade => COLOR_SLOPE_DBD,
        }
    }
}

/// How generated noise is combined with a channel's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// Output is the noise alone.
    #[default]
    Overwrite,
    /// Output is input plus noise.
    Add,
    /// Output is input times noise.
    Multiply,
}

impl From<u32> for ChannelMode {
    fn from(value: u32) -> Self {
        match value {
            1 => ChannelMode::Add,
            2 => ChannelMode::Multiply,
            _ => ChannelMode::Overwrite,
        }
    }
}

impl From<ChannelMode> for u32 {
    fn from(value: ChannelMode) -> Self {
        match value {
            ChannelMode::Overwrite => 0,
            ChannelMode::Add => 1,
            ChannelMode::Multiply => 2,
        }
    }
}

impl ChannelMode {
    pub fn name(self) -> &'static str {
        match self {
            ChannelMode::Overwrite => "Overwrite",
            ChannelMode::Add => "Add",
            ChannelMode::Multiply => "Multiply",
        }
    }
}

/// Map an LCG distribution selector; unknown values select Gaussian.
pub fn lcg_distribution(value: u32) -> LcgDistribution {
    match value {
        0 => LcgDistribution::Uniform,
        1 => LcgDistribution::Exponential,
        2 => LcgDistribution::Triangular,
        _ => LcgDistribution::Gaussian,
    }
}

/// Selector value of an LCG distribution.
pub fn lcg_distribution_index(dist: LcgDistribution) -> u32 {
    match dist {
        LcgDistribution::Uniform => 0,
        LcgDistribution::Exponential => 1,
        LcgDistribution::Triangular => 2,
        LcgDistribution::Gaussian => 3,
    }
}

/// Map a velvet type selector; unknown values select OVN.
pub fn velvet_type(value: u32) -> VelvetType {
    match value {
        1 => VelvetType::Ovna,
        2 => VelvetType::Arn,
        3 => VelvetType::Trn,
        _ => VelvetType::Ovn,
    }
}

/// Selector value of a velvet type.
pub fn velvet_type_index(ty: VelvetType) -> u32 {
    match ty {
        VelvetType::Ovn => 0,
        VelvetType::Ovna => 1,
        VelvetType::Arn => 2,
        VelvetType::Trn => 3,
    }
}

/// Filter profile of the inaudibility path.
///
/// The highpass near 20 kHz moves the noise above the audible band. Older
/// generations of the plugin used a 22.05 kHz cutoff, and one used a
/// lowpass; both are kept as named profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InaudibleProfile {
    pub kind: ButterworthType,
    /// Cutoff frequency in Hz.
    pub cutoff: f32,
    /// Butterworth filter order.
    pub order: usize,
    /// Gain applied to the noise before filtering.
    pub attenuation: f32,
}

impl Default for InaudibleProfile {
    fn default() -> Self {
        Self {
            kind: ButterworthType::Highpass,
            cutoff: 20_000.0,
            order: 64,
            attenuation: 0.5,
        }
    }
}

impl InaudibleProfile {
    /// Highpass at 22.05 kHz.
    pub fn legacy() -> Self {
        Self {
            cutoff: 22_050.0,
            ..Self::default()
        }
    }

    /// Lowpass variant at the default cutoff.
    pub fn lowpass() -> Self {
        Self {
            kind: ButterworthType::Lowpass,
            ..Self::default()
        }
    }

    /// Whether the filter fits below Nyquist at `sample_rate`.
    pub fn is_feasible(&self, sample_rate: f32) -> bool {
        0.5 * sample_rate > self.cutoff
    }
}
