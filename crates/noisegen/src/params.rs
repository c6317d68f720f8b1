// SPDX-License-Identifier: LGPL-3.0-or-later

//! Change detection and configuration evolution for generator controls.
//!
//! A control-rate update is split into two pure steps:
//!
//! 1. [`detect`] compares the previous raw snapshot with the new one and
//!    returns the changed parameter groups as [`Changes`].
//! 2. [`GeneratorConfig::evolve`] converts only those groups into a new
//!    configuration, in dependency order: distribution, velvet, color,
//!    color slope, algorithm, amplitude, offset.
//!
//! Applying the result to the DSP objects is left to the generator unit.

use std::ops::{BitOr, BitOrAssign};

use noisegen_dsp::noise::generator::NoiseColor;
use noisegen_dsp::noise::lcg::LcgDistribution;
use noisegen_dsp::noise::velvet::VelvetType;
use noisegen_dsp::units::SlopeUnit;

use crate::meta::{self, Algorithm, ColorSelector};

/// Raw control values of one generator, as sent by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorControls {
    pub algorithm: u32,
    pub distribution: u32,
    pub velvet_type: u32,
    /// Window duration in seconds.
    pub velvet_window: f32,
    pub velvet_arn_delta: f32,
    pub velvet_crush: bool,
    /// Crushing probability in percent.
    pub velvet_crush_probability: f32,
    pub color: u32,
    pub slope_npn: f32,
    pub slope_dbo: f32,
    pub slope_dbd: f32,
    pub amplitude: f32,
    pub offset: f32,
    pub inaudible: bool,
    /// Only read for pooled generators.
    pub solo: bool,
    /// Only read for pooled generators.
    pub mute: bool,
}

impl Default for GeneratorControls {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default().into(),
            distribution: meta::lcg_distribution_index(LcgDistribution::default()),
            velvet_type: meta::velvet_type_index(VelvetType::default()),
            velvet_window: meta::VELVET_WINDOW.dfl,
            velvet_arn_delta: meta::VELVET_ARN_DELTA.dfl,
            velvet_crush: false,
            velvet_crush_probability: meta::VELVET_CRUSH_PROBABILITY.dfl,
            color: ColorSelector::default().into(),
            slope_npn: meta::COLOR_SLOPE_NPN.dfl,
            slope_dbo: meta::COLOR_SLOPE_DBO.dfl,
            slope_dbd: meta::COLOR_SLOPE_DBD.dfl,
            amplitude: meta::AMPLITUDE.dfl,
            offset: meta::OFFSET.dfl,
            inaudible: false,
            solo: false,
            mute: false,
        }
    }
}

/// Set of changed parameter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes(u16);

impl Changes {
    pub const NONE: Changes = Changes(0);
    pub const LCG_DIST: Changes = Changes(1 << 0);
    pub const VELVET_TYPE: Changes = Changes(1 << 1);
    pub const VELVET_WINDOW: Changes = Changes(1 << 2);
    pub const VELVET_ARN_DELTA: Changes = Changes(1 << 3);
    pub const VELVET_CRUSH: Changes = Changes(1 << 4);
    pub const VELVET_CRUSH_PROB: Changes = Changes(1 << 5);
    pub const COLOR: Changes = Changes(1 << 6);
    pub const COLOR_SLOPE: Changes = Changes(1 << 7);
    pub const NOISE_TYPE: Changes = Changes(1 << 8);
    pub const AMPLITUDE: Changes = Changes(1 << 9);
    pub const OFFSET: Changes = Changes(1 << 10);
    pub const ALL: Changes = Changes((1 << 11) - 1);

    /// Groups touching the velvet generator.
    pub const VELVET: Changes = Changes(
        Self::VELVET_TYPE.0
            | Self::VELVET_WINDOW.0
            | Self::VELVET_ARN_DELTA.0
            | Self::VELVET_CRUSH.0
            | Self::VELVET_CRUSH_PROB.0,
    );

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any group of `other` is present.
    pub fn intersects(self, other: Changes) -> bool {
        self.0 & other.0 != 0
    }

    pub fn contains(self, other: Changes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for Changes {
    type Output = Changes;

    fn bitor(self, rhs: Changes) -> Changes {
        Changes(self.0 | rhs.0)
    }
}

impl BitOrAssign for Changes {
    fn bitor_assign(&mut self, rhs: Changes) {
        self.0 |= rhs.0;
    }
}

fn differs(a: f32, b: f32) -> bool {
    a.to_bits() != b.to_bits()
}

/// Groups whose raw values differ between `prev` and `next`.
///
/// Solo, mute and inaudible are not parameter groups: activity is resolved
/// separately, and an inaudible toggle is reported by the unit as a color
/// change once it knows whether inaudible operation is feasible.
pub fn detect(prev: &GeneratorControls, next: &GeneratorControls) -> Changes {
    let mut changes = Changes::NONE;
    let mut mark = |cond: bool, group: Changes| {
        if cond {
            changes |= group;
        }
    };

    mark(prev.distribution != next.distribution, Changes::LCG_DIST);
    mark(prev.velvet_type != next.velvet_type, Changes::VELVET_TYPE);
    mark(differs(prev.velvet_window, next.velvet_window), Changes::VELVET_WINDOW);
    mark(differs(prev.velvet_arn_delta, next.velvet_arn_delta), Changes::VELVET_ARN_DELTA);
    mark(prev.velvet_crush != next.velvet_crush, Changes::VELVET_CRUSH);
    mark(
        differs(prev.velvet_crush_probability, next.velvet_crush_probability),
        Changes::VELVET_CRUSH_PROB,
    );
    mark(prev.color != next.color, Changes::COLOR);
    mark(
        differs(prev.slope_npn, next.slope_npn)
            || differs(prev.slope_dbo, next.slope_dbo)
            || differs(prev.slope_dbd, next.slope_dbd),
        Changes::COLOR_SLOPE,
    );
    mark(prev.algorithm != next.algorithm, Changes::NOISE_TYPE);
    mark(differs(prev.amplitude, next.amplitude), Changes::AMPLITUDE);
    mark(differs(prev.offset, next.offset), Changes::OFFSET);

    changes
}

/// Converted generator configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub algorithm: Algorithm,
    pub distribution: LcgDistribution,
    pub velvet_type: VelvetType,
    /// Window duration in seconds.
    pub velvet_window: f32,
    pub velvet_arn_delta: f32,
    pub velvet_crush: bool,
    /// Crushing probability in [0, 1].
    pub velvet_crush_probability: f32,
    /// Selector as set by the host.
    pub selector: ColorSelector,
    /// Color in effect; white while inaudible.
    pub color: NoiseColor,
    pub slope: f32,
    pub slope_unit: SlopeUnit,
    pub amplitude: f32,
    pub offset: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            algorithm: Algorithm::default(),
            distribution: LcgDistribution::default(),
            velvet_type: VelvetType::default(),
            velvet_window: meta::VELVET_WINDOW.dfl,
            velvet_arn_delta: meta::VELVET_ARN_DELTA.dfl,
            velvet_crush: false,
            velvet_crush_probability: meta::VELVET_CRUSH_PROBABILITY.dfl / 100.0,
            selector: ColorSelector::default(),
            color: NoiseColor::White,
            slope: meta::COLOR_SLOPE_NPN.dfl,
            slope_unit: SlopeUnit::NeperPerNeper,
            amplitude: meta::AMPLITUDE.dfl,
            offset: meta::OFFSET.dfl,
        }
    }
}

impl GeneratorConfig {
    /// Build the configuration that follows `self` after applying the
    /// `changes` groups of `raw`. Groups not in `changes` keep their value.
    pub fn evolve(&self, raw: &GeneratorControls, changes: Changes, inaudible: bool) -> Self {
        let mut next = *self;

        if changes.intersects(Changes::LCG_DIST) {
            next.distribution = meta::lcg_distribution(raw.distribution);
        }

        if changes.intersects(Changes::VELVET_TYPE) {
            next.velvet_type = meta::velvet_type(raw.velvet_type);
        }
        if changes.intersects(Changes::VELVET_WINDOW) {
            next.velvet_window = meta::VELVET_WINDOW.clamp(raw.velvet_window);
        }
        if changes.intersects(Changes::VELVET_ARN_DELTA) {
            next.velvet_arn_delta = meta::VELVET_ARN_DELTA.clamp(raw.velvet_arn_delta);
        }
        if changes.intersects(Changes::VELVET_CRUSH) {
            next.velvet_crush = raw.velvet_crush;
        }
        if changes.intersects(Changes::VELVET_CRUSH_PROB) {
            next.velvet_crush_probability =
                meta::VELVET_CRUSH_PROBABILITY.clamp(raw.velvet_crush_probability) / 100.0;
        }

        if changes.intersects(Changes::COLOR) {
            next.selector = ColorSelector::from(raw.color);
            next.color = if inaudible {
                NoiseColor::White
            } else {
                next.selector.color()
            };
        }

        // The slope control read depends on the selector just updated.
        if changes.intersects(Changes::COLOR | Changes::COLOR_SLOPE) {
            next.slope_unit = next.selector.slope_unit();
            let slope = match next.slope_unit {
                SlopeUnit::NeperPerNeper => raw.slope_npn,
                SlopeUnit::DbPerOctave => raw.slope_dbo,
                SlopeUnit::DbPerDecade => raw.slope_dbd,
            };
            next.slope = next.selector.slope_range().clamp(slope);
        }

        if changes.intersects(Changes::NOISE_TYPE) {
            next.algorithm = Algorithm::from(raw.algorithm);
        }

        if changes.intersects(Changes::AMPLITUDE) {
            next.amplitude = meta::AMPLITUDE.clamp(raw.amplitude);
        }

        if changes.intersects(Changes::OFFSET) {
            next.offset = meta::OFFSET.clamp(raw.offset);
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_unchanged_is_empty() {
        let raw = GeneratorControls::default();
        assert!(detect(&raw, &raw).is_empty());
    }

    #[test]
    fn test_detect_groups() {
        let prev = GeneratorControls::default();
        let cases: [(GeneratorControls, Changes); 8] = [
            (GeneratorControls { distribution: 0, ..prev }, Changes::LCG_DIST),
            (GeneratorControls { velvet_window: 0.2, ..prev }, Changes::VELVET_WINDOW),
            (GeneratorControls { velvet_crush: true, ..prev }, Changes::VELVET_CRUSH),
            (GeneratorControls { color: 1, ..prev }, Changes::COLOR),
            (GeneratorControls { slope_dbd: 3.0, ..prev }, Changes::COLOR_SLOPE),
            (GeneratorControls { algorithm: 1, ..prev }, Changes::NOISE_TYPE),
            (GeneratorControls { amplitude: 0.5, ..prev }, Changes::AMPLITUDE),
            (GeneratorControls { offset: 0.5, ..prev }, Changes::OFFSET),
        ];
        for (next, expected) in cases {
            assert_eq!(detect(&prev, &next), expected, "{next:?}");
        }
    }

    #[test]
    fn test_detect_ignores_activity_switches() {
        let prev = GeneratorControls::default();
        let next = GeneratorControls {
            solo: true,
            mute: true,
            inaudible: true,
            ..prev
        };
        assert!(detect(&prev, &next).is_empty());
    }

    #[test]
    fn test_detect_nan_is_stable() {
        let raw = GeneratorControls {
            amplitude: f32::NAN,
            ..Default::default()
        };
        assert!(detect(&raw, &raw).is_empty(), "NaN must not look like a change forever");
    }

    #[test]
    fn test_evolve_applies_only_changed_groups() {
        let base = GeneratorConfig::default();
        let raw = GeneratorControls {
            amplitude: 2.0,
            offset: 1.0,
            ..Default::default()
        };
        let next = base.evolve(&raw, Changes::AMPLITUDE, false);
        assert_eq!(next.amplitude, 2.0);
        assert_eq!(next.offset, 0.0, "offset was not in the change set");
    }

    #[test]
    fn test_evolve_converts_units() {
        let raw = GeneratorControls {
            velvet_crush_probability: 25.0,
            velvet_window: 10.0,
            algorithm: 99,
            distribution: 99,
            ..Default::default()
        };
        let next = GeneratorConfig::default().evolve(&raw, Changes::ALL, false);
        assert_eq!(next.velvet_crush_probability, 0.25);
        assert_eq!(next.velvet_window, meta::VELVET_WINDOW.max);
        assert_eq!(next.algorithm, Algorithm::Lcg);
        assert_eq!(next.distribution, LcgDistribution::Gaussian);
    }

    #[test]
    fn test_evolve_slope_follows_selector_unit() {
        let raw = GeneratorControls {
            color: ColorSelector::ArbitraryDbd.into(),
            slope_npn: 1.0,
            slope_dbo: 6.0,
            slope_dbd: -20.0,
            ..Default::default()
        };
        let next = GeneratorConfig::default().evolve(&raw, Changes::COLOR, false);
        assert_eq!(next.color, NoiseColor::Arbitrary);
        assert_eq!(next.slope_unit, SlopeUnit::DbPerDecade);
        assert_eq!(next.slope, -20.0);

        let raw = GeneratorControls {
            color: ColorSelector::ArbitraryDbo.into(),
            ..raw
        };
        let next = next.evolve(&raw, Changes::COLOR, false);
        assert_eq!(next.slope_unit, SlopeUnit::DbPerOctave);
        assert_eq!(next.slope, 6.0);
    }

    #[test]
    fn test_evolve_clamps_slope_to_unit_range() {
        let raw = GeneratorControls {
            color: ColorSelector::ArbitraryNpn.into(),
            slope_npn: 50.0,
            ..Default::default()
        };
        let next = GeneratorConfig::default().evolve(&raw, Changes::ALL, false);
        assert_eq!(next.slope, meta::COLOR_SLOPE_NPN.max);
    }

    #[test]
    fn test_inaudible_forces_white_and_restores() {
        let raw = GeneratorControls {
            color: ColorSelector::ArbitraryDbo.into(),
            slope_dbo: 9.0,
            ..Default::default()
        };
        let audible = GeneratorConfig::default().evolve(&raw, Changes::ALL, false);
        assert_eq!(audible.color, NoiseColor::Arbitrary);

        let inaudible = audible.evolve(&raw, Changes::COLOR | Changes::COLOR_SLOPE, true);
        assert_eq!(inaudible.color, NoiseColor::White);
        assert_eq!(inaudible.selector, ColorSelector::ArbitraryDbo, "selector is kept");

        let restored = inaudible.evolve(&raw, Changes::COLOR | Changes::COLOR_SLOPE, false);
        assert_eq!(restored, audible);
    }

    #[test]
    fn test_evolve_is_pure() {
        let base = GeneratorConfig::default();
        let raw = GeneratorControls {
            color: 2,
            amplitude: 3.0,
            ..Default::default()
        };
        let a = base.evolve(&raw, Changes::ALL, false);
        let b = base.evolve(&raw, Changes::ALL, false);
        assert_eq!(a, b);
        assert_eq!(base, GeneratorConfig::default());
    }

    #[test]
    fn test_changes_set_ops() {
        let mut c = Changes::NONE;
        c |= Changes::COLOR;
        assert!(c.contains(Changes::COLOR));
        assert!(!c.contains(Changes::COLOR | Changes::COLOR_SLOPE));
        assert!(c.intersects(Changes::COLOR | Changes::COLOR_SLOPE));
        assert!(Changes::ALL.contains(Changes::VELVET));
        assert!(!Changes::VELVET.intersects(Changes::COLOR));
    }
}
