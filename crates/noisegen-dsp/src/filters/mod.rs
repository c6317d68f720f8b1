// SPDX-License-Identifier: LGPL-3.0-or-later

//! Filters used by the noise generator.
//!
//! - [`spectral_tilt`]: pole/zero cascade approximating a constant spectral slope
//! - [`butterworth`]: high-order lowpass/highpass for the inaudible band

pub mod butterworth;
pub mod spectral_tilt;
