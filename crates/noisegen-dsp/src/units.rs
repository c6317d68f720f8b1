// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions.
//!
//! Time and gain conversions, plus the three interchangeable units used to
//! express a spectral slope.

/// Decibels per octave for a slope of one neper per neper (`20 * log10(2)`).
pub const DB_PER_OCTAVE_PER_NPN: f32 = 6.020_6;

/// Decibels per decade for a slope of one neper per neper.
pub const DB_PER_DECADE_PER_NPN: f32 = 20.0;

/// Unit of a spectral slope value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeUnit {
    /// Nepers per neper: the exponent of `f^slope` in the magnitude response.
    #[default]
    NeperPerNeper,
    /// Decibels per octave.
    DbPerOctave,
    /// Decibels per decade.
    DbPerDecade,
}

impl SlopeUnit {
    /// Short name used in state dumps and logs.
    pub fn name(self) -> &'static str {
        match self {
            SlopeUnit::NeperPerNeper => "NPN",
            SlopeUnit::DbPerOctave => "dB/oct",
            SlopeUnit::DbPerDecade => "dB/dec",
        }
    }
}

/// Convert seconds to sample count.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `time` - Time in seconds
#[inline]
pub fn seconds_to_samples(sr: f32, time: f32) -> f32 {
    time * sr
}

/// Convert decibels to a linear gain factor.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear gain factor to decibels.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}

/// Convert a slope expressed in `unit` to nepers per neper.
#[inline]
pub fn slope_to_npn(slope: f32, unit: SlopeUnit) -> f32 {
    match unit {
        SlopeUnit::NeperPerNeper => slope,
        SlopeUnit::DbPerOctave => slope / DB_PER_OCTAVE_PER_NPN,
        SlopeUnit::DbPerDecade => slope / DB_PER_DECADE_PER_NPN,
    }
}

/// Convert a slope in nepers per neper to `unit`.
#[inline]
pub fn npn_to_slope(npn: f32, unit: SlopeUnit) -> f32 {
    match unit {
        SlopeUnit::NeperPerNeper => npn,
        SlopeUnit::DbPerOctave => npn * DB_PER_OCTAVE_PER_NPN,
        SlopeUnit::DbPerDecade => npn * DB_PER_DECADE_PER_NPN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_samples() {
        assert_eq!(seconds_to_samples(48000.0, 0.01), 480.0);
    }

    #[test]
    fn test_db_gain_roundtrip() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-6.0206) - 0.5).abs() < 1e-4);
        assert!((gain_to_db(10.0) - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_pink_slope_in_all_units() {
        // Pink noise: -0.5 NPN = -3.01 dB/oct = -10 dB/dec
        let oct = npn_to_slope(-0.5, SlopeUnit::DbPerOctave);
        let dec = npn_to_slope(-0.5, SlopeUnit::DbPerDecade);
        assert!((oct + 3.0103).abs() < 1e-3, "dB/oct {oct}");
        assert!((dec + 10.0).abs() < 1e-6, "dB/dec {dec}");
        assert!((slope_to_npn(oct, SlopeUnit::DbPerOctave) + 0.5).abs() < 1e-6);
        assert!((slope_to_npn(dec, SlopeUnit::DbPerDecade) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_octave_constant_matches_log() {
        let exact = 20.0 * 2.0_f32.log10();
        assert!((exact - DB_PER_OCTAVE_PER_NPN).abs() < 1e-4);
    }
}
