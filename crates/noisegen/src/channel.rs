// SPDX-License-Identifier: LGPL-3.0-or-later

//! Audio channel: noise source, combination with the input, gains and
//! bypass.

use noisegen_dsp::ctl::bypass::Bypass;
use noisegen_dsp::dsp::ops;

use crate::dump::{self, Dump, StateDumper};
use crate::error::{alloc_buffer, Result};
use crate::meta::{self, ChannelMode, BUFFER_SIZE, MAX_GENERATORS};
use crate::unit::GeneratorUnit;

/// Raw per-channel controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelControls {
    pub mode: u32,
    pub solo: bool,
    pub mute: bool,
    /// Linear output gain of this channel.
    pub gain_out: f32,
    /// Weight of each pool generator; unused with an embedded generator.
    pub gains: [f32; MAX_GENERATORS],
}

impl Default for ChannelControls {
    fn default() -> Self {
        Self {
            mode: ChannelMode::default().into(),
            solo: false,
            mute: false,
            gain_out: meta::GAIN.dfl,
            gains: [0.0; MAX_GENERATORS],
        }
    }
}

/// Where a channel takes its noise from.
#[derive(Debug, Clone)]
pub enum ChannelSource {
    /// The channel owns its generator.
    Embedded(Box<GeneratorUnit>),
    /// Weighted sum over the plugin's generator pool.
    Pool { gains: [f32; MAX_GENERATORS] },
}

/// One mono input/output lane.
#[derive(Debug)]
pub struct Channel {
    source: ChannelSource,
    mode: ChannelMode,
    gain_out: f32,
    active: bool,
    staged: ChannelControls,
    dirty: bool,
    bypass: Bypass,
    /// Wet signal of the current chunk.
    buffer: Vec<f32>,
    level_in: f32,
    level_out: f32,
}

impl Channel {
    pub fn new(source: ChannelSource) -> Result<Self> {
        Ok(Self {
            source,
            mode: ChannelMode::default(),
            gain_out: meta::GAIN.dfl,
            active: true,
            staged: ChannelControls::default(),
            dirty: true,
            bypass: Bypass::new(),
            buffer: alloc_buffer("channel buffer", BUFFER_SIZE)?,
            level_in: 0.0,
            level_out: 0.0,
        })
    }

    /// Propagate a sample rate change to the bypass and the embedded unit.
    /// Staged controls are committed along the way.
    pub fn set_sample_rate(&mut self, sample_rate: f32, bypass_time: f32) {
        self.bypass.init(sample_rate, bypass_time);
        if let ChannelSource::Embedded(unit) = &mut self.source {
            unit.set_sample_rate(sample_rate);
        }
        self.apply_staged();
    }

    /// Record new channel controls; they take effect on [`commit`](Self::commit).
    pub fn stage(&mut self, controls: &ChannelControls) {
        if *controls != self.staged {
            self.staged = *controls;
            self.dirty = true;
        }
    }

    /// Install staged controls, the embedded generator's first.
    pub fn commit(&mut self) -> bool {
        let changed = match &mut self.source {
            ChannelSource::Embedded(unit) => unit.commit(),
            ChannelSource::Pool { .. } => false,
        };
        self.apply_staged() || changed
    }

    fn apply_staged(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.mode = ChannelMode::from(self.staged.mode);
        self.gain_out = meta::GAIN.clamp(self.staged.gain_out);
        if let ChannelSource::Pool { gains } = &mut self.source {
            for (g, &raw) in gains.iter_mut().zip(self.staged.gains.iter()) {
                *g = meta::GAIN.clamp(raw);
            }
        }
        self.dirty = false;
        true
    }

    /// Whether staged controls are waiting for a commit.
    pub fn has_pending(&self) -> bool {
        self.dirty || self.unit().is_some_and(GeneratorUnit::has_pending)
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns `true` when the bypass target changed.
    pub fn set_bypass(&mut self, bypass: bool) -> bool {
        self.bypass.set_bypass(bypass)
    }

    /// Process one chunk of at most [`BUFFER_SIZE`] samples.
    ///
    /// `pool` holds the chunk's output of every pool generator; it is
    /// ignored by channels with an embedded generator.
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        pool: &[Vec<f32>],
        gain_in: f32,
        gain_out: f32,
    ) {
        let n = input.len().min(output.len()).min(self.buffer.len());
        let input = &input[..n];
        let output = &mut output[..n];
        let wet = &mut self.buffer[..n];

        self.level_in = ops::abs_max(input) * gain_in;

        if self.active {
            match &mut self.source {
                ChannelSource::Embedded(unit) => unit.process(wet),
                ChannelSource::Pool { gains } => {
                    wet.fill(0.0);
                    for (&gain, noise) in gains.iter().zip(pool.iter()) {
                        if gain != 0.0 {
                            ops::add_scaled(wet, &noise[..n], gain);
                        }
                    }
                }
            }

            match self.mode {
                ChannelMode::Overwrite => {}
                ChannelMode::Add => ops::add_scaled(wet, input, gain_in),
                ChannelMode::Multiply => {
                    ops::mul(wet, input);
                    ops::scale(wet, gain_in);
                }
            }
            ops::scale(wet, self.gain_out * gain_out);
        } else {
            wet.fill(0.0);
        }

        self.bypass.process(output, Some(input), wet);
        self.level_out = ops::abs_max(output);
    }

    pub fn source(&self) -> &ChannelSource {
        &self.source
    }

    pub fn unit(&self) -> Option<&GeneratorUnit> {
        match &self.source {
            ChannelSource::Embedded(unit) => Some(unit),
            ChannelSource::Pool { .. } => None,
        }
    }

    pub fn unit_mut(&mut self) -> Option<&mut GeneratorUnit> {
        match &mut self.source {
            ChannelSource::Embedded(unit) => Some(unit),
            ChannelSource::Pool { .. } => None,
        }
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn gain_out(&self) -> f32 {
        self.gain_out
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn bypass(&self) -> &Bypass {
        &self.bypass
    }

    /// Input and output peaks of the last processed chunk.
    pub fn levels(&self) -> (f32, f32) {
        (self.level_in, self.level_out)
    }
}

impl Dump for ChannelControls {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_u32("mode", self.mode);
        v.write_bool("solo", self.solo);
        v.write_bool("mute", self.mute);
        v.write_f32("gain_out", self.gain_out);
        v.begin_array("gains", self.gains.len());
        for (i, g) in self.gains.iter().enumerate() {
            v.write_f32(&i.to_string(), *g);
        }
        v.end_array();
    }
}

impl Dump for Channel {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_str("mode", self.mode.name());
        v.write_f32("gain_out", self.gain_out);
        v.write_bool("active", self.active);
        v.write_bool("dirty", self.dirty);
        v.write_f32("level_in", self.level_in);
        v.write_f32("level_out", self.level_out);
        v.write_usize("buffer", self.buffer.len());
        dump::write_object(v, "staged", &self.staged);
        dump::write_object(v, "bypass", &self.bypass);
        match &self.source {
            ChannelSource::Embedded(unit) => dump::write_object(v, "unit", unit.as_ref()),
            ChannelSource::Pool { gains } => {
                v.begin_array("gains", gains.len());
                for (i, g) in gains.iter().enumerate() {
                    v.write_f32(&i.to_string(), *g);
                }
                v.end_array();
            }
        }
    }
}
