// SPDX-License-Identifier: LGPL-3.0-or-later

//! # noisegen
//!
//! Multi-channel noise generator engine built on [`noisegen_dsp`].
//!
//! - **Generator units**: LCG, MLS or velvet noise, spectrally colored,
//!   scaled and offset, with an optional inaudibility path that moves the
//!   noise above the audible band
//! - **Channels**: overwrite, add or multiply against the input, either
//!   from an embedded generator or a weighted pool, with gains, bypass
//!   and level meters
//! - **Controls**: ranges and selectors in [`meta`], change detection and
//!   staged commits in [`params`], solo/mute resolution in [`activity`]
//! - **Introspection**: frequency response for plotting and a key-value
//!   state dump
//!
//! ```
//! use noisegen::plugin::{NoiseGeneratorPlugin, PluginConfig, PluginControls};
//! use noisegen::seed::FixedSeed;
//!
//! let config = PluginConfig::per_channel(1);
//! let mut plugin = NoiseGeneratorPlugin::new(config, &mut FixedSeed::new(7)).unwrap();
//! plugin.update_sample_rate(48000.0);
//!
//! let mut controls = PluginControls::for_config(&config);
//! controls.generators[0].amplitude = 0.5;
//! plugin.update_settings(&controls);
//!
//! let input = vec![0.0; 256];
//! let mut output = vec![0.0; 256];
//! plugin.process(&[Some(&input)], &mut [Some(&mut output)], 256);
//! assert!(output.iter().all(|s| s.is_finite()));
//! ```

pub mod activity;
pub mod channel;
pub mod dump;
pub mod error;
pub mod meta;
pub mod params;
pub mod plugin;
pub mod seed;
pub mod unit;

pub use error::{Error, Result};
