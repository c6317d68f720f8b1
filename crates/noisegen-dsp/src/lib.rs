// SPDX-License-Identifier: LGPL-3.0-or-later

//! # noisegen-dsp
//!
//! DSP building blocks for the noise generator engine.
//!
//! - **Buffer ops**: scaling, mixing and peak search with runtime SIMD
//!   dispatch via `multiversion`
//! - **Biquads**: single sections in the pre-negated `a1`/`a2` convention
//! - **Noise**: LCG with four distributions, MLS, velvet noise, and the
//!   colored [`noise::generator::NoiseGenerator`]
//! - **Filters**: spectral-slope coloring cascade, high-order Butterworth
//! - **Control**: bypass crossfade
//!
//! Nothing in this crate allocates on the processing path. Scratch space
//! is either fixed-size on the stack or owned by the caller.

pub mod ctl;
pub mod dsp;
pub mod filters;
pub mod noise;
pub mod units;
pub mod util;
