// SPDX-License-Identifier: LGPL-3.0-or-later

//! GStreamer element wrapping [`noisegen::plugin::NoiseGeneratorPlugin`].
//!
//! An in-place `AudioFilter` on interleaved f32 audio. Every negotiated
//! channel is a mixer lane over a pool of [`MAX_GENERATORS`] generators;
//! by default channel `i` hears generator `i % MAX_GENERATORS`.
//!
//! Properties:
//!
//! | Name                 | Meaning                                        |
//! |----------------------|------------------------------------------------|
//! | `g<N>-<control>`     | Generator `N` control (`algorithm`, `color`…)  |
//! | `c<N>-<control>`     | Channel `N` control (`mode`, `gain-g<M>`…)     |
//! | `bypass`             | Crossfade to the dry input                     |
//! | `gain-in`/`gain-out` | Global linear gains                            |

use gstreamer::glib;
use gstreamer::prelude::*;
use gstreamer::subclass::prelude::*;
use gstreamer_audio::subclass::prelude::*;

use noisegen::channel::ChannelControls;
use noisegen::meta::{self, BUFFER_SIZE, MAX_CHANNELS, MAX_GENERATORS};
use noisegen::params::GeneratorControls;
use noisegen::plugin::{NoiseGeneratorPlugin, PluginConfig, PluginControls};
use noisegen::seed::ClockSeed;

use crate::base;
use once_cell::sync::Lazy;
use std::sync::Mutex;

static CAT: Lazy<gstreamer::DebugCategory> = Lazy::new(|| {
    gstreamer::DebugCategory::new(
        "lsp-rs-noisegen",
        gstreamer::DebugColorFlags::empty(),
        Some("LSP RS noise generator"),
    )
});

const PROP_BYPASS: &str = "bypass";
const PROP_GAIN_IN: &str = "gain-in";
const PROP_GAIN_OUT: &str = "gain-out";

// -- Property naming --

/// Generator controls exposed as `g<N>-<suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenControl {
    Algorithm,
    Distribution,
    VelvetType,
    VelvetWindow,
    VelvetArnDelta,
    VelvetCrush,
    VelvetCrushProbability,
    Color,
    SlopeNpn,
    SlopeDbo,
    SlopeDbd,
    Amplitude,
    Offset,
    Inaudible,
    Solo,
    Mute,
}

const GEN_CONTROLS: [GenControl; 16] = [
    GenControl::Algorithm,
    GenControl::Distribution,
    GenControl::VelvetType,
    GenControl::VelvetWindow,
    GenControl::VelvetArnDelta,
    GenControl::VelvetCrush,
    GenControl::VelvetCrushProbability,
    GenControl::Color,
    GenControl::SlopeNpn,
    GenControl::SlopeDbo,
    GenControl::SlopeDbd,
    GenControl::Amplitude,
    GenControl::Offset,
    GenControl::Inaudible,
    GenControl::Solo,
    GenControl::Mute,
];

impl GenControl {
    fn suffix(self) -> &'static str {
        match self {
            GenControl::Algorithm => "algorithm",
            GenControl::Distribution => "distribution",
            GenControl::VelvetType => "velvet-type",
            GenControl::VelvetWindow => "velvet-window",
            GenControl::VelvetArnDelta => "velvet-arn-delta",
            GenControl::VelvetCrush => "velvet-crush",
            GenControl::VelvetCrushProbability => "velvet-crush-probability",
            GenControl::Color => "color",
            GenControl::SlopeNpn => "slope-npn",
            GenControl::SlopeDbo => "slope-dbo",
            GenControl::SlopeDbd => "slope-dbd",
            GenControl::Amplitude => "amplitude",
            GenControl::Offset => "offset",
            GenControl::Inaudible => "inaudible",
            GenControl::Solo => "solo",
            GenControl::Mute => "mute",
        }
    }

    fn pspec(self, index: usize) -> glib::ParamSpec {
        let name = format!("g{index}-{}", self.suffix());
        let dfl = GeneratorControls::default();
        let nick = format!("Generator {index} {}", self.suffix());
        match self {
            GenControl::Algorithm => base::selector_spec(
                &name,
                &nick,
                "Noise algorithm: 0=Off, 1=MLS, 2=LCG, 3=Velvet",
                3,
                dfl.algorithm,
            ),
            GenControl::Distribution => base::selector_spec(
                &name,
                &nick,
                "LCG distribution: 0=Uniform, 1=Exponential, 2=Triangular, 3=Gaussian",
                3,
                dfl.distribution,
            ),
            GenControl::VelvetType => base::selector_spec(
                &name,
                &nick,
                "Velvet type: 0=OVN, 1=OVNA, 2=ARN, 3=TRN",
                3,
                dfl.velvet_type,
            ),
            GenControl::VelvetWindow => {
                base::float_spec(&name, &nick, "Velvet window (s)", meta::VELVET_WINDOW)
            }
            GenControl::VelvetArnDelta => {
                base::float_spec(&name, &nick, "Velvet ARN spacing jitter", meta::VELVET_ARN_DELTA)
            }
            GenControl::VelvetCrush => {
                base::switch_spec(&name, &nick, "Crush velvet impulses", dfl.velvet_crush)
            }
            GenControl::VelvetCrushProbability => base::float_spec(
                &name,
                &nick,
                "Velvet crushing probability (%)",
                meta::VELVET_CRUSH_PROBABILITY,
            ),
            GenControl::Color => base::selector_spec(
                &name,
                &nick,
                "Color: 0=White, 1=Pink, 2=Red, 3=Blue, 4=Violet, 5=Np/Np, 6=dB/oct, 7=dB/dec",
                7,
                dfl.color,
            ),
            GenControl::SlopeNpn => {
                base::float_spec(&name, &nick, "Color slope (Np/Np)", meta::COLOR_SLOPE_NPN)
            }
            GenControl::SlopeDbo => {
                base::float_spec(&name, &nick, "Color slope (dB/oct)", meta::COLOR_SLOPE_DBO)
            }
            GenControl::SlopeDbd => {
                base::float_spec(&name, &nick, "Color slope (dB/dec)", meta::COLOR_SLOPE_DBD)
            }
            GenControl::Amplitude => {
                base::float_spec(&name, &nick, "Noise amplitude (linear)", meta::AMPLITUDE)
            }
            GenControl::Offset => base::float_spec(&name, &nick, "Noise DC offset", meta::OFFSET),
            GenControl::Inaudible => base::switch_spec(
                &name,
                &nick,
                "Move the noise above the audible band",
                dfl.inaudible,
            ),
            GenControl::Solo => base::switch_spec(&name, &nick, "Solo this generator", dfl.solo),
            GenControl::Mute => base::switch_spec(&name, &nick, "Mute this generator", dfl.mute),
        }
    }

    fn get(self, c: &GeneratorControls) -> glib::Value {
        match self {
            GenControl::Algorithm => c.algorithm.to_value(),
            GenControl::Distribution => c.distribution.to_value(),
            GenControl::VelvetType => c.velvet_type.to_value(),
            GenControl::VelvetWindow => c.velvet_window.to_value(),
            GenControl::VelvetArnDelta => c.velvet_arn_delta.to_value(),
            GenControl::VelvetCrush => c.velvet_crush.to_value(),
            GenControl::VelvetCrushProbability => c.velvet_crush_probability.to_value(),
            GenControl::Color => c.color.to_value(),
            GenControl::SlopeNpn => c.slope_npn.to_value(),
            GenControl::SlopeDbo => c.slope_dbo.to_value(),
            GenControl::SlopeDbd => c.slope_dbd.to_value(),
            GenControl::Amplitude => c.amplitude.to_value(),
            GenControl::Offset => c.offset.to_value(),
            GenControl::Inaudible => c.inaudible.to_value(),
            GenControl::Solo => c.solo.to_value(),
            GenControl::Mute => c.mute.to_value(),
        }
    }

    fn set(self, c: &mut GeneratorControls, value: &glib::Value) {
        match self {
            GenControl::Algorithm => c.algorithm = value.get().expect("type checked"),
            GenControl::Distribution => c.distribution = value.get().expect("type checked"),
            GenControl::VelvetType => c.velvet_type = value.get().expect("type checked"),
            GenControl::VelvetWindow => c.velvet_window = value.get().expect("type checked"),
            GenControl::VelvetArnDelta => c.velvet_arn_delta = value.get().expect("type checked"),
            GenControl::VelvetCrush => c.velvet_crush = value.get().expect("type checked"),
            GenControl::VelvetCrushProbability => {
                c.velvet_crush_probability = value.get().expect("type checked")
            }
            GenControl::Color => c.color = value.get().expect("type checked"),
            GenControl::SlopeNpn => c.slope_npn = value.get().expect("type checked"),
            GenControl::SlopeDbo => c.slope_dbo = value.get().expect("type checked"),
            GenControl::SlopeDbd => c.slope_dbd = value.get().expect("type checked"),
            GenControl::Amplitude => c.amplitude = value.get().expect("type checked"),
            GenControl::Offset => c.offset = value.get().expect("type checked"),
            GenControl::Inaudible => c.inaudible = value.get().expect("type checked"),
            GenControl::Solo => c.solo = value.get().expect("type checked"),
            GenControl::Mute => c.mute = value.get().expect("type checked"),
        }
    }
}

/// Channel controls exposed as `c<N>-<suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChanControl {
    Mode,
    Solo,
    Mute,
    GainOut,
    /// Weight of pool generator `M`.
    Gain(usize),
}

impl ChanControl {
    fn all() -> impl Iterator<Item = ChanControl> {
        [
            ChanControl::Mode,
            ChanControl::Solo,
            ChanControl::Mute,
            ChanControl::GainOut,
        ]
        .into_iter()
        .chain((0..MAX_GENERATORS).map(ChanControl::Gain))
    }

    fn suffix(self) -> String {
        match self {
            ChanControl::Mode => "mode".into(),
            ChanControl::Solo => "solo".into(),
            ChanControl::Mute => "mute".into(),
            ChanControl::GainOut => "gain-out".into(),
            ChanControl::Gain(g) => format!("gain-g{g}"),
        }
    }

    fn pspec(self, index: usize, dfl: &ChannelControls) -> glib::ParamSpec {
        let name = format!("c{index}-{}", self.suffix());
        let nick = format!("Channel {index} {}", self.suffix());
        match self {
            ChanControl::Mode => base::selector_spec(
                &name,
                &nick,
                "Combination with input: 0=Overwrite, 1=Add, 2=Multiply",
                2,
                dfl.mode,
            ),
            ChanControl::Solo => base::switch_spec(&name, &nick, "Solo this channel", dfl.solo),
            ChanControl::Mute => base::switch_spec(&name, &nick, "Mute this channel", dfl.mute),
            ChanControl::GainOut => {
                base::float_spec(&name, &nick, "Channel output gain (linear)", meta::GAIN)
            }
            ChanControl::Gain(g) => {
                let range = meta::ControlRange {
                    dfl: dfl.gains[g],
                    ..meta::GAIN
                };
                base::float_spec(&name, &nick, "Weight of the pool generator", range)
            }
        }
    }

    fn get(self, c: &ChannelControls) -> glib::Value {
        match self {
            ChanControl::Mode => c.mode.to_value(),
            ChanControl::Solo => c.solo.to_value(),
            ChanControl::Mute => c.mute.to_value(),
            ChanControl::GainOut => c.gain_out.to_value(),
            ChanControl::Gain(g) => c.gains[g].to_value(),
        }
    }

    fn set(self, c: &mut ChannelControls, value: &glib::Value) {
        match self {
            ChanControl::Mode => c.mode = value.get().expect("type checked"),
            ChanControl::Solo => c.solo = value.get().expect("type checked"),
            ChanControl::Mute => c.mute = value.get().expect("type checked"),
            ChanControl::GainOut => c.gain_out = value.get().expect("type checked"),
            ChanControl::Gain(g) => c.gains[g] = value.get().expect("type checked"),
        }
    }
}

/// Parsed property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prop {
    Generator(usize, GenControl),
    Channel(usize, ChanControl),
    Bypass,
    GainIn,
    GainOut,
}

/// Split `"g12-rest"` into `(12, "rest")` for the given prefix letter.
fn split_indexed(name: &str, prefix: char) -> Option<(usize, &str)> {
    let rest = name.strip_prefix(prefix)?;
    let (index, suffix) = rest.split_once('-')?;
    Some((index.parse().ok()?, suffix))
}

fn parse_prop(name: &str) -> Option<Prop> {
    match name {
        PROP_BYPASS => return Some(Prop::Bypass),
        PROP_GAIN_IN => return Some(Prop::GainIn),
        PROP_GAIN_OUT => return Some(Prop::GainOut),
        _ => {}
    }
    if let Some((index, suffix)) = split_indexed(name, 'g') {
        if index < MAX_GENERATORS {
            return GEN_CONTROLS
                .iter()
                .find(|c| c.suffix() == suffix)
                .map(|&c| Prop::Generator(index, c));
        }
    }
    if let Some((index, suffix)) = split_indexed(name, 'c') {
        if index < MAX_CHANNELS {
            return ChanControl::all()
                .find(|c| c.suffix() == suffix)
                .map(|c| Prop::Channel(index, c));
        }
    }
    None
}

/// Controls for every addressable channel and generator.
fn default_controls() -> PluginControls {
    PluginControls::for_config(&PluginConfig::matrix(MAX_CHANNELS, MAX_GENERATORS))
}

/// The first `channels` channel control sets of `controls`.
fn controls_for(controls: &PluginControls, channels: usize) -> PluginControls {
    PluginControls {
        channels: controls.channels[..channels.min(controls.channels.len())].to_vec(),
        ..controls.clone()
    }
}

// -- State --

/// Processing state, created once caps are known.
struct State {
    plugin: NoiseGeneratorPlugin,
    channels: usize,
    /// Deinterleaved input, one lane per channel.
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
}

impl State {
    fn new(channels: usize, rate: u32, controls: &PluginControls) -> noisegen::Result<Self> {
        let config = PluginConfig::matrix(channels, MAX_GENERATORS);
        let mut plugin = NoiseGeneratorPlugin::new(config, &mut ClockSeed::new())?;
        plugin.update_sample_rate(rate as f32);
        plugin.update_settings(&controls_for(controls, channels));

        Ok(Self {
            plugin,
            channels,
            inputs: vec![vec![0.0; BUFFER_SIZE]; channels],
            outputs: vec![vec![0.0; BUFFER_SIZE]; channels],
        })
    }

    fn update(&mut self, controls: &PluginControls) {
        self.plugin
            .update_settings(&controls_for(controls, self.channels));
    }

    /// Run the engine over an interleaved buffer in place.
    fn process_interleaved(&mut self, samples: &mut [f32]) {
        let channels = self.channels;
        let Self {
            plugin,
            inputs,
            outputs,
            ..
        } = self;

        for block in samples.chunks_mut(BUFFER_SIZE * channels) {
            let frames = block.len() / channels;

            for (frame, chunk) in block.chunks_exact(channels).enumerate() {
                for (lane, &s) in inputs.iter_mut().zip(chunk.iter()) {
                    lane[frame] = s;
                }
            }

            let ins: [Option<&[f32]>; MAX_CHANNELS] =
                std::array::from_fn(|c| inputs.get(c).map(|lane| &lane[..frames]));
            let mut lanes = outputs.iter_mut();
            let mut outs: [Option<&mut [f32]>; MAX_CHANNELS] =
                std::array::from_fn(|_| lanes.next().map(|lane| &mut lane[..frames]));
            plugin.process(&ins[..channels], &mut outs[..channels], frames);

            for (frame, chunk) in block.chunks_exact_mut(channels).enumerate() {
                for (s, lane) in chunk.iter_mut().zip(outputs.iter()) {
                    *s = lane[frame];
                }
            }
        }
    }
}

// -- Element definition --

/// GStreamer noise generator element backed by `noisegen`.
pub struct LspRsNoiseGen {
    inner: Mutex<LspRsNoiseGenInner>,
}

impl Default for LspRsNoiseGen {
    fn default() -> Self {
        Self {
            inner: Mutex::new(LspRsNoiseGenInner {
                controls: default_controls(),
                state: None,
            }),
        }
    }
}

struct LspRsNoiseGenInner {
    controls: PluginControls,
    state: Option<State>,
}

#[glib::object_subclass]
impl ObjectSubclass for LspRsNoiseGen {
    const NAME: &'static str = "LspRsNoiseGen";
    type Type = super::LspRsNoiseGen;
    type ParentType = gstreamer_audio::AudioFilter;
}

impl ObjectImpl for LspRsNoiseGen {
    fn properties() -> &'static [glib::ParamSpec] {
        static PROPERTIES: Lazy<Vec<glib::ParamSpec>> = Lazy::new(|| {
            let defaults = default_controls();
            let mut props = vec![
                base::switch_spec(PROP_BYPASS, "Bypass", "Crossfade to the dry input", false),
                base::float_spec(PROP_GAIN_IN, "Input Gain", "Input gain (linear)", meta::GAIN),
                base::float_spec(PROP_GAIN_OUT, "Output Gain", "Output gain (linear)", meta::GAIN),
            ];
            for g in 0..MAX_GENERATORS {
                props.extend(GEN_CONTROLS.iter().map(|c| c.pspec(g)));
            }
            for (i, dfl) in defaults.channels.iter().enumerate() {
                props.extend(ChanControl::all().map(|c| c.pspec(i, dfl)));
            }
            props
        });
        PROPERTIES.as_ref()
    }

    fn set_property(&self, _id: usize, value: &glib::Value, pspec: &glib::ParamSpec) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let inner = &mut *inner;
        match parse_prop(pspec.name()) {
            Some(Prop::Generator(g, control)) => control.set(&mut inner.controls.generators[g], value),
            Some(Prop::Channel(c, control)) => control.set(&mut inner.controls.channels[c], value),
            Some(Prop::Bypass) => inner.controls.bypass = value.get().expect("type checked"),
            Some(Prop::GainIn) => inner.controls.gain_in = value.get().expect("type checked"),
            Some(Prop::GainOut) => inner.controls.gain_out = value.get().expect("type checked"),
            None => return,
        }
        gstreamer::trace!(CAT, imp = self, "property {} changed", pspec.name());
        if let Some(ref mut state) = inner.state {
            state.update(&inner.controls);
        }
    }

    fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
        let inner = self.inner.lock().expect("mutex poisoned");
        match parse_prop(pspec.name()) {
            Some(Prop::Generator(g, control)) => control.get(&inner.controls.generators[g]),
            Some(Prop::Channel(c, control)) => control.get(&inner.controls.channels[c]),
            Some(Prop::Bypass) => inner.controls.bypass.to_value(),
            Some(Prop::GainIn) => inner.controls.gain_in.to_value(),
            Some(Prop::GainOut) => inner.controls.gain_out.to_value(),
            None => unimplemented!(),
        }
    }
}

impl GstObjectImpl for LspRsNoiseGen {}

impl ElementImpl for LspRsNoiseGen {
    fn metadata() -> Option<&'static gstreamer::subclass::ElementMetadata> {
        static ELEMENT_METADATA: Lazy<gstreamer::subclass::ElementMetadata> = Lazy::new(|| {
            gstreamer::subclass::ElementMetadata::new(
                "LSP RS Noise Generator",
                "Filter/Effect/Audio",
                "Colored LCG, MLS and velvet noise mixed into each channel",
                "LSP DSP <noreply@lsp-dsp.dev>",
            )
        });
        Some(&*ELEMENT_METADATA)
    }

    fn pad_templates() -> &'static [gstreamer::PadTemplate] {
        static PAD_TEMPLATES: Lazy<Vec<gstreamer::PadTemplate>> =
            Lazy::new(base::f32_pad_templates);
        PAD_TEMPLATES.as_ref()
    }
}

impl BaseTransformImpl for LspRsNoiseGen {
    const MODE: gstreamer_base::subclass::BaseTransformMode =
        gstreamer_base::subclass::BaseTransformMode::AlwaysInPlace;
    const PASSTHROUGH_ON_SAME_CAPS: bool = false;
    const TRANSFORM_IP_ON_PASSTHROUGH: bool = false;

    fn transform_ip(
        &self,
        buf: &mut gstreamer::BufferRef,
    ) -> Result<gstreamer::FlowSuccess, gstreamer::FlowError> {
        let mut inner = self.inner.lock().map_err(|_| {
            gstreamer::element_error!(self.obj(), gstreamer::CoreError::Failed, ["Mutex poisoned"]);
            gstreamer::FlowError::Error
        })?;

        let state = match inner.state {
            Some(ref mut s) => s,
            None => return Ok(gstreamer::FlowSuccess::Ok),
        };

        let mut map = buf.map_writable().map_err(|_| {
            gstreamer::element_error!(
                self.obj(),
                gstreamer::CoreError::Failed,
                ["Failed to map buffer writable"]
            );
            gstreamer::FlowError::Error
        })?;

        // Safety: caps negotiation guarantees f32 interleaved audio.
        let samples: &mut [f32] = unsafe {
            let ptr = map.as_mut_ptr() as *mut f32;
            let len = map.len() / std::mem::size_of::<f32>();
            std::slice::from_raw_parts_mut(ptr, len)
        };

        state.process_interleaved(samples);

        drop(map);
        Ok(gstreamer::FlowSuccess::Ok)
    }

    fn stop(&self) -> Result<(), gstreamer::ErrorMessage> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| gstreamer::error_msg!(gstreamer::CoreError::Failed, ["Mutex poisoned"]))?;
        inner.state = None;
        Ok(())
    }
}

impl AudioFilterImpl for LspRsNoiseGen {
    fn allowed_caps() -> &'static gstreamer::Caps {
        &base::F32_INTERLEAVED_CAPS
    }

    fn setup(&self, info: &gstreamer_audio::AudioInfo) -> Result<(), gstreamer::LoggableError> {
        self.parent_setup(info)?;

        let mut inner = self.inner.lock().map_err(|_| {
            gstreamer::loggable_error!(
                gstreamer::CAT_RUST,
                "Mutex poisoned in AudioFilterImpl::setup"
            )
        })?;

        let channels = info.channels() as usize;
        let state = State::new(channels, info.rate(), &inner.controls)
            .map_err(|err| gstreamer::loggable_error!(gstreamer::CAT_RUST, "Failed to set up: {}", err))?;
        gstreamer::debug!(
            CAT,
            imp = self,
            "configured {} channels at {} Hz",
            channels,
            info.rate()
        );
        inner.state = Some(state);
        Ok(())
    }
}
