// SPDX-License-Identifier: LGPL-3.0-or-later

//! The noise generator engine.
//!
//! [`NoiseGeneratorPlugin`] ties generator units and channels together
//! behind the host-facing entry points: [`update_sample_rate`], [`update_settings`],
//! [`process`], the response query and the state dump. Its layout is fixed
//! at construction by a [`PluginConfig`].
//!
//! [`update_sample_rate`]: NoiseGeneratorPlugin::update_sample_rate
//! [`update_settings`]: NoiseGeneratorPlugin::update_settings
//! [`process`]: NoiseGeneratorPlugin::process

use crate::activity;
use crate::channel::{Channel, ChannelControls, ChannelSource};
use crate::dump::{self, Dump, StateDumper};
use crate::error::{alloc_buffer, Error, Result};
use crate::meta::{
    self, InaudibleProfile, BUFFER_SIZE, BYPASS_TIME, MAX_CHANNELS, MAX_GENERATORS, MESH_POINTS,
    PLOT_MIN_FREQUENCY,
};
use crate::params::GeneratorControls;
use crate::seed::SeedSource;
use crate::unit::GeneratorUnit;

/// How generators are attached to channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Every channel embeds one generator.
    #[default]
    PerChannel,
    /// A shared pool of generators mixed into every channel by weight.
    Matrix { generators: usize },
}

/// Which controls embedded generators read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigBinding {
    /// Generator `i` reads control set `i`.
    #[default]
    Own,
    /// All generators read control set 0.
    Shared,
}

/// When staged controls reach the DSP state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    /// At the end of `update_settings`.
    Immediate,
    /// At the start of the next `process`.
    #[default]
    Staged,
}

/// Construction-time layout of the plugin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PluginConfig {
    pub channels: usize,
    pub topology: Topology,
    /// Ignored by [`Topology::Matrix`].
    pub binding: ConfigBinding,
    pub strategy: UpdateStrategy,
    pub inaudible: InaudibleProfile,
    /// Bypass crossfade time in seconds.
    pub bypass_time: f32,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            topology: Topology::default(),
            binding: ConfigBinding::default(),
            strategy: UpdateStrategy::default(),
            inaudible: InaudibleProfile::default(),
            bypass_time: BYPASS_TIME,
        }
    }
}

impl PluginConfig {
    /// `channels` lanes, each with its own generator.
    pub fn per_channel(channels: usize) -> Self {
        Self {
            channels,
            ..Self::default()
        }
    }

    /// `channels` lanes mixing a pool of `generators`.
    pub fn matrix(channels: usize, generators: usize) -> Self {
        Self {
            channels,
            topology: Topology::Matrix { generators },
            ..Self::default()
        }
    }

    /// Number of generator control sets the plugin reads.
    pub fn control_sets(&self) -> usize {
        match (self.topology, self.binding) {
            (Topology::Matrix { generators }, _) => generators,
            (Topology::PerChannel, ConfigBinding::Own) => self.channels,
            (Topology::PerChannel, ConfigBinding::Shared) => 1,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(Error::InvalidTopology(format!(
                "{} channels, expected 1..={MAX_CHANNELS}",
                self.channels
            )));
        }
        if let Topology::Matrix { generators } = self.topology {
            if generators == 0 || generators > MAX_GENERATORS {
                return Err(Error::InvalidTopology(format!(
                    "{generators} generators, expected 1..={MAX_GENERATORS}"
                )));
            }
        }
        Ok(())
    }
}

/// Complete set of raw controls for one update.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginControls {
    pub generators: Vec<GeneratorControls>,
    pub channels: Vec<ChannelControls>,
    pub bypass: bool,
    pub gain_in: f32,
    pub gain_out: f32,
}

impl PluginControls {
    /// Default controls shaped for `config`. Matrix channels start on the
    /// diagonal: channel `i` hears generator `i % generators` at unity.
    pub fn for_config(config: &PluginConfig) -> Self {
        let generators = config.control_sets();
        let channels = (0..config.channels)
            .map(|i| {
                let mut controls = ChannelControls::default();
                if let Topology::Matrix { generators } = config.topology {
                    controls.gains[i % generators] = meta::GAIN.dfl;
                }
                controls
            })
            .collect();

        Self {
            generators: vec![GeneratorControls::default(); generators],
            channels,
            bypass: false,
            gain_in: meta::GAIN.dfl,
            gain_out: meta::GAIN.dfl,
        }
    }
}

/// Noise generator engine.
#[derive(Debug)]
pub struct NoiseGeneratorPlugin {
    config: PluginConfig,
    pool: Vec<GeneratorUnit>,
    /// Chunk output of each pool generator.
    pool_buffers: Vec<Vec<f32>>,
    channels: Vec<Channel>,

    sample_rate: f32,
    freqs: Vec<f32>,

    gain_in: f32,
    gain_out: f32,
    bypass: bool,
    staged_gain_in: f32,
    staged_gain_out: f32,
    staged_bypass: bool,
}

impl NoiseGeneratorPlugin {
    /// Build the plugin, drawing every generator's seeds from `seeds`.
    ///
    /// Call [`update_sample_rate`](Self::update_sample_rate) before
    /// processing.
    pub fn new(config: PluginConfig, seeds: &mut dyn SeedSource) -> Result<Self> {
        config.validate()?;
        Self::build(config, seeds).inspect_err(|err| log::error!("noise generator init: {err}"))
    }

    fn build(config: PluginConfig, seeds: &mut dyn SeedSource) -> Result<Self> {
        let mut pool = Vec::new();
        let mut pool_buffers = Vec::new();
        if let Topology::Matrix { generators } = config.topology {
            for _ in 0..generators {
                pool.push(GeneratorUnit::new(config.inaudible, seeds));
                pool_buffers.push(alloc_buffer("generator buffer", BUFFER_SIZE)?);
            }
        }

        let mut channels = Vec::with_capacity(config.channels);
        for _ in 0..config.channels {
            let source = match config.topology {
                Topology::PerChannel => {
                    ChannelSource::Embedded(Box::new(GeneratorUnit::new(config.inaudible, seeds)))
                }
                Topology::Matrix { .. } => ChannelSource::Pool {
                    gains: [0.0; MAX_GENERATORS],
                },
            };
            channels.push(Channel::new(source)?);
        }

        let mut plugin = Self {
            config,
            pool,
            pool_buffers,
            channels,
            sample_rate: 0.0,
            freqs: alloc_buffer("frequency axis", MESH_POINTS)?,
            gain_in: meta::GAIN.dfl,
            gain_out: meta::GAIN.dfl,
            bypass: false,
            staged_gain_in: meta::GAIN.dfl,
            staged_gain_out: meta::GAIN.dfl,
            staged_bypass: false,
        };

        // Install the default matrix routing.
        plugin.update_settings(&PluginControls::for_config(&config));
        plugin.commit();

        log::debug!(
            "noise generator: {} channels, {:?}, {} generator units",
            config.channels,
            config.topology,
            plugin.generator_count()
        );
        Ok(plugin)
    }

    /// Recompute every sample-rate dependent value: inaudible feasibility,
    /// filter coefficients, bypass ramps and the plot frequency axis.
    ///
    /// Pending staged controls are committed, whatever the strategy.
    pub fn update_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;

        for unit in &mut self.pool {
            unit.set_sample_rate(sample_rate);
        }
        for channel in &mut self.channels {
            channel.set_sample_rate(sample_rate, self.config.bypass_time);
        }

        let f_min = PLOT_MIN_FREQUENCY;
        let f_max = (0.5 * sample_rate).max(f_min);
        let last = (self.freqs.len().max(2) - 1) as f32;
        let ratio = f_max / f_min;
        for (i, f) in self.freqs.iter_mut().enumerate() {
            *f = f_min * ratio.powf(i as f32 / last);
        }

        if !self.config.inaudible.is_feasible(sample_rate) {
            log::warn!(
                "sample rate {sample_rate} Hz too low for inaudible noise above {} Hz",
                self.config.inaudible.cutoff
            );
        }
        self.commit();
        log::debug!("sample rate set to {sample_rate} Hz");
    }

    /// Read a control snapshot: resolve solo/mute and stage every change.
    /// With [`UpdateStrategy::Immediate`] the changes are committed at once.
    pub fn update_settings(&mut self, controls: &PluginControls) {
        let has_solo = activity::has_solo(controls.channels.iter().map(|c| c.solo));

        let binding = self.config.binding;
        for (i, channel) in self.channels.iter_mut().enumerate() {
            let Some(ctl) = controls.channels.get(i) else {
                continue;
            };
            channel.set_active(activity::is_active(has_solo, ctl.solo, ctl.mute));
            channel.stage(ctl);

            if let Some(unit) = channel.unit_mut() {
                let index = match binding {
                    ConfigBinding::Own => i,
                    ConfigBinding::Shared => 0,
                };
                if let Some(raw) = controls.generators.get(index) {
                    unit.stage(raw);
                }
            }
        }

        let has_solo = activity::has_solo(controls.generators.iter().map(|g| g.solo));
        for (unit, raw) in self.pool.iter_mut().zip(controls.generators.iter()) {
            unit.set_active(activity::is_active(has_solo, raw.solo, raw.mute));
            unit.stage(raw);
        }

        self.staged_gain_in = meta::GAIN.clamp(controls.gain_in);
        self.staged_gain_out = meta::GAIN.clamp(controls.gain_out);
        self.staged_bypass = controls.bypass;

        if self.config.strategy == UpdateStrategy::Immediate {
            self.commit();
        }
    }

    /// Push all staged controls into the DSP state. Returns `true` when
    /// anything changed.
    pub fn commit(&mut self) -> bool {
        let mut changed = false;
        for unit in &mut self.pool {
            changed |= unit.commit();
        }
        for channel in &mut self.channels {
            changed |= channel.commit();
        }

        if self.staged_bypass != self.bypass {
            self.bypass = self.staged_bypass;
            for channel in &mut self.channels {
                channel.set_bypass(self.bypass);
            }
            changed = true;
        }
        if self.staged_gain_in != self.gain_in || self.staged_gain_out != self.gain_out {
            self.gain_in = self.staged_gain_in;
            self.gain_out = self.staged_gain_out;
            changed = true;
        }

        if changed {
            log::trace!("noise generator settings committed");
        }
        changed
    }

    /// Process `samples` frames.
    ///
    /// `inputs[i]` and `outputs[i]` belong to channel `i`. A channel whose
    /// buffer is missing or shorter than `samples` is skipped.
    pub fn process(
        &mut self,
        inputs: &[Option<&[f32]>],
        outputs: &mut [Option<&mut [f32]>],
        samples: usize,
    ) {
        if self.config.strategy == UpdateStrategy::Staged {
            self.commit();
        }

        let mut offset = 0;
        while offset < samples {
            let n = (samples - offset).min(BUFFER_SIZE);

            for (unit, buf) in self.pool.iter_mut().zip(self.pool_buffers.iter_mut()) {
                unit.process(&mut buf[..n]);
            }

            for (i, channel) in self.channels.iter_mut().enumerate() {
                let Some(Some(input)) = inputs.get(i) else {
                    continue;
                };
                let Some(Some(output)) = outputs.get_mut(i) else {
                    continue;
                };
                if input.len() < samples || output.len() < samples {
                    continue;
                }
                channel.process(
                    &input[offset..offset + n],
                    &mut output[offset..offset + n],
                    &self.pool_buffers,
                    self.gain_in,
                    self.gain_out,
                );
            }

            offset += n;
        }
    }

    /// Plot frequency axis for the current sample rate.
    pub fn freqs(&self) -> &[f32] {
        &self.freqs
    }

    /// Magnitude response of generator `index` over [`freqs`](Self::freqs),
    /// written to `dst`. Returns `false` for an unknown generator.
    pub fn generator_response(&self, index: usize, dst: &mut [f32]) -> bool {
        match self.unit(index) {
            Some(unit) => {
                unit.freq_chart(&self.freqs, dst);
                true
            }
            None => false,
        }
    }

    /// Number of generator units: pool size, or one per channel.
    pub fn generator_count(&self) -> usize {
        match self.config.topology {
            Topology::Matrix { .. } => self.pool.len(),
            Topology::PerChannel => self.channels.len(),
        }
    }

    /// Generator unit `index`, from the pool or embedded in channel `index`.
    pub fn unit(&self, index: usize) -> Option<&GeneratorUnit> {
        match self.config.topology {
            Topology::Matrix { .. } => self.pool.get(index),
            Topology::PerChannel => self.channels.get(index).and_then(Channel::unit),
        }
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl Dump for InaudibleProfile {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_str("kind", self.kind.name());
        v.write_f32("cutoff", self.cutoff);
        v.write_usize("order", self.order);
        v.write_f32("attenuation", self.attenuation);
    }
}

impl Dump for NoiseGeneratorPlugin {
    fn dump(&self, v: &mut dyn StateDumper) {
        let topology = match self.config.topology {
            Topology::PerChannel => "per_channel",
            Topology::Matrix { .. } => "matrix",
        };
        let binding = match self.config.binding {
            ConfigBinding::Own => "own",
            ConfigBinding::Shared => "shared",
        };
        let strategy = match self.config.strategy {
            UpdateStrategy::Immediate => "immediate",
            UpdateStrategy::Staged => "staged",
        };
        v.write_str("topology", topology);
        v.write_str("binding", binding);
        v.write_str("strategy", strategy);
        v.write_f32("sample_rate", self.sample_rate);
        v.write_f32("bypass_time", self.config.bypass_time);
        v.write_bool("bypass", self.bypass);
        v.write_f32("gain_in", self.gain_in);
        v.write_f32("gain_out", self.gain_out);
        v.write_usize("freqs", self.freqs.len());
        dump::write_object(v, "inaudible", &self.config.inaudible);
        dump::write_array(v, "units", &self.pool);
        dump::write_array(v, "channels", &self.channels);
    }
}
