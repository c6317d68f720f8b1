// SPDX-License-Identifier: LGPL-3.0-or-later

//! Bypass control with smooth crossfading.
//!
//! Switching between the dry (bypassed) and wet (processed) signal ramps
//! the wet gain linearly over a configurable time to avoid clicks.

/// Bypass state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Bypass is fully on (dry signal only).
    On,
    /// Bypass is transitioning between on and off.
    Active,
    /// Bypass is fully off (wet signal only).
    Off,
}

/// Default transition time in seconds.
pub const DEFAULT_TIME: f32 = 0.005;

/// Bypass control with smooth crossfading.
///
/// # Examples
/// ```
/// use noisegen_dsp::ctl::bypass::Bypass;
///
/// let mut bypass = Bypass::new();
/// bypass.init(48000.0, 0.005);
///
/// let dry = vec![1.0, 2.0, 3.0, 4.0];
/// let wet = vec![0.5, 1.0, 1.5, 2.0];
/// let mut output = vec![0.0; 4];
///
/// bypass.process(&mut output, Some(&dry), &wet);
/// assert_eq!(output, wet);
/// ```
#[derive(Debug, Clone)]
pub struct Bypass {
    state: State,
    /// Gain change per sample, signed towards the target.
    delta: f32,
    /// Per-sample step magnitude.
    step: f32,
    /// Current wet gain in [0, 1].
    gain: f32,
}

impl Default for Bypass {
    fn default() -> Self {
        Self::new()
    }
}

impl Bypass {
    /// Create a bypass controller passing the wet signal.
    pub fn new() -> Self {
        Self {
            state: State::Off,
            delta: 0.0,
            step: 1.0,
            gain: 1.0,
        }
    }

    /// Initialize with sample rate and transition time.
    ///
    /// A pending ramp is completed at once: the controller settles on the
    /// target it was heading to, so an engaged bypass stays engaged.
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `time` - Transition time in seconds
    pub fn init(&mut self, sample_rate: f32, time: f32) {
        let length = (sample_rate * time).max(1.0);
        self.step = if length.is_finite() { 1.0 / length } else { 1.0 };
        if self.bypassing() {
            self.state = State::On;
            self.gain = 0.0;
        } else {
            self.state = State::Off;
            self.gain = 1.0;
        }
        self.delta = 0.0;
    }

    /// Engage (`true`) or release (`false`) the bypass.
    ///
    /// Returns `true` when the target changed.
    pub fn set_bypass(&mut self, bypass: bool) -> bool {
        let delta = if bypass { -self.step } else { self.step };
        let target_reached = match self.state {
            State::On => bypass,
            State::Off => !bypass,
            State::Active => self.delta == delta,
        };
        if target_reached {
            return false;
        }
        self.delta = delta;
        self.state = State::Active;
        true
    }

    /// Whether the bypass is engaged or heading there.
    pub fn bypassing(&self) -> bool {
        match self.state {
            State::On => true,
            State::Off => false,
            State::Active => self.delta < 0.0,
        }
    }

    /// Whether the output is fully dry.
    pub fn is_on(&self) -> bool {
        self.state == State::On
    }

    /// Whether the output is fully wet.
    pub fn is_off(&self) -> bool {
        self.state == State::Off
    }

    /// Current wet gain.
    pub fn wet_gain(&self) -> f32 {
        self.gain
    }

    /// Process signal with bypass control.
    ///
    /// # Arguments
    /// * `dst` - Output buffer
    /// * `dry` - Dry signal buffer (`None` for silence)
    /// * `wet` - Wet signal buffer
    pub fn process(&mut self, dst: &mut [f32], dry: Option<&[f32]>, wet: &[f32]) {
        let count = match dry {
            Some(dry) => dst.len().min(wet.len()).min(dry.len()),
            None => dst.len().min(wet.len()),
        };
        let dst = &mut dst[..count];
        let wet = &wet[..count];

        match self.state {
            State::Off => dst.copy_from_slice(wet),
            State::On => match dry {
                Some(dry) => dst.copy_from_slice(&dry[..count]),
                None => dst.fill(0.0),
            },
            State::Active => {
                for (i, d) in dst.iter_mut().enumerate() {
                    let x = dry.map_or(0.0, |dry| dry[i]);
                    *d = x + (wet[i] - x) * self.gain;
                    self.advance();
                }
            }
        }
    }

    fn advance(&mut self) {
        if self.state != State::Active {
            return;
        }
        self.gain += self.delta;
        if self.gain >= 1.0 {
            self.gain = 1.0;
            self.state = State::Off;
        } else if self.gain <= 0.0 {
            self.gain = 0.0;
            self.state = State::On;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_wet() {
        let mut b = Bypass::new();
        let dry = [1.0; 8];
        let wet = [2.0; 8];
        let mut out = [0.0; 8];
        b.process(&mut out, Some(&dry), &wet);
        assert_eq!(out, wet);
        assert!(b.is_off());
    }

    #[test]
    fn test_crossfade_to_dry_and_back() {
        let mut b = Bypass::new();
        b.init(1000.0, 0.004); // 4 samples
        assert!(b.set_bypass(true));
        assert!(!b.set_bypass(true), "repeated request is not a change");

        let dry = [0.0; 8];
        let wet = [1.0; 8];
        let mut out = [0.0; 8];
        b.process(&mut out, Some(&dry), &wet);
        assert_eq!(&out[..5], &[1.0, 0.75, 0.5, 0.25, 0.0]);
        assert!(out[5..].iter().all(|&s| s == 0.0));
        assert!(b.is_on());

        assert!(b.set_bypass(false));
        b.process(&mut out, Some(&dry), &wet);
        assert_eq!(&out[..5], &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(b.is_off());
    }

    #[test]
    fn test_crossfade_is_monotonic_for_long_ramps() {
        let mut b = Bypass::new();
        b.init(48000.0, DEFAULT_TIME);
        b.set_bypass(true);
        let dry = vec![0.0; 480];
        let wet = vec![1.0; 480];
        let mut out = vec![0.0; 480];
        b.process(&mut out, Some(&dry), &wet);
        for pair in out.windows(2) {
            assert!(pair[1] <= pair[0], "ramp must not increase");
        }
        assert_eq!(*out.last().unwrap_or(&1.0), 0.0);
    }

    #[test]
    fn test_no_dry_fades_to_silence() {
        let mut b = Bypass::new();
        b.init(1000.0, 0.002);
        b.set_bypass(true);
        let wet = [1.0; 4];
        let mut out = [9.0; 4];
        b.process(&mut out, None, &wet);
        assert_eq!(out, [1.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_reversal_mid_ramp() {
        let mut b = Bypass::new();
        b.init(1000.0, 0.004);
        b.set_bypass(true);
        let mut out = [0.0; 2];
        b.process(&mut out, Some(&[0.0; 2]), &[1.0; 2]);
        assert!(b.bypassing());
        assert!(b.set_bypass(false));
        assert!(!b.bypassing());
        assert!((b.wet_gain() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reinit_keeps_target() {
        let mut b = Bypass::new();
        b.init(1000.0, 0.004);
        b.set_bypass(true);
        b.init(2000.0, 0.004);
        assert!(b.is_on(), "engaged bypass survives a rate change");
        let mut out = [0.0; 4];
        b.process(&mut out, Some(&[0.25; 4]), &[1.0; 4]);
        assert_eq!(out, [0.25; 4]);

        // A ramp back to wet completes on re-init as well.
        b.set_bypass(false);
        b.init(1000.0, 0.004);
        assert!(b.is_off());
        assert_eq!(b.wet_gain(), 1.0);
    }
}
