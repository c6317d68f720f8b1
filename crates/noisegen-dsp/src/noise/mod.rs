// SPDX-License-Identifier: LGPL-3.0-or-later

//! Noise generators.
//!
//! - [`lcg`]: congruential source with uniform/exponential/triangular/Gaussian output
//! - [`mls`]: maximum length sequences
//! - [`velvet`]: sparse impulse trains (OVN, OVNA, ARN, TRN) with optional crushing
//! - [`generator`]: algorithm selector with coloring, amplitude and offset

pub mod generator;
pub mod lcg;
pub mod mls;
pub mod velvet;
