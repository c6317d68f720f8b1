// SPDX-License-Identifier: LGPL-3.0-or-later

//! Seed providers for generator units.
//!
//! Every unit draws its seeds once, at construction. [`ClockSeed`] derives
//! them from the wall clock so that concurrently created instances are
//! decorrelated; [`FixedSeed`] yields a reproducible sequence for tests and
//! offline rendering.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of 64-bit seeds.
pub trait SeedSource {
    fn next_seed(&mut self) -> u64;
}

/// One step of the SplitMix64 sequence.
pub fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fold a 64-bit seed into the 32 bits the LCG takes.
pub fn fold_u32(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Seeds derived from the current time.
///
/// Each draw mixes `seconds ^ nanoseconds` with a draw counter, so several
/// seeds taken within one clock tick still differ.
#[derive(Debug, Default)]
pub struct ClockSeed {
    counter: u64,
}

impl ClockSeed {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeedSource for ClockSeed {
    fn next_seed(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut state = now.as_secs() ^ u64::from(now.subsec_nanos());
        state ^= self.counter.wrapping_mul(0xD1B5_4A32_D192_ED03);
        self.counter = self.counter.wrapping_add(1);
        splitmix64(&mut state)
    }
}

/// Deterministic seed sequence.
#[derive(Debug, Clone)]
pub struct FixedSeed {
    state: u64,
}

impl FixedSeed {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl SeedSource for FixedSeed {
    fn next_seed(&mut self) -> u64 {
        splitmix64(&mut self.state)
    }
}
