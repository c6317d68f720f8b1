// SPDX-License-Identifier: LGPL-3.0-or-later

//! Maximum Length Sequence (MLS) generator.
//!
//! MLS is a type of pseudorandom binary sequence with desirable properties:
//! - Smallest crest factor
//! - Period length of 2^N - 1
//! - Ideally decorrelated from itself
//! - Flat spectrum
//!
//! Implemented using a Linear Feedback Shift Register (LFSR) with tap
//! positions from primitive binary polynomials.
//!
//! # References
//! - <https://dspguru.com/dsp/tutorials/a-little-mls-tutorial/>
//! - Primitive Binary Polynomials by Wayne Stahnke, Mathematics of Computation, 1973

/// Tap masks for primitive binary polynomials (1 to 64 bits).
/// From "Primitive Binary Polynomials" by Wayne Stahnke,
/// Mathematics of Computation, Volume 27, Number 124, October 1973.
const TAPS_MASK_TABLE: [u64; 64] = [
    1,
    3,
    3,
    3,
    5,
    3,
    3,
    99,
    17,
    9,
    5,
    153,
    27,
    6147,
    3,
    45,
    9,
    129,
    99,
    9,
    5,
    3,
    33,
    27,
    9,
    387,
    387,
    9,
    5,
    98307,
    9,
    402653187,
    8193,
    49155,
    5,
    2049,
    5125,
    99,
    17,
    2621445,
    9,
    12582915,
    99,
    201326595,
    27,
    3145731,
    33,
    402653187,
    513,
    201326595,
    98307,
    9,
    98307,
    206158430211,
    16777217,
    6291459,
    129,
    524289,
    6291459,
    3,
    98307,
    216172782113783811,
    3,
    27,
];

/// Maximum Length Sequence generator producing ±1.
///
/// # Examples
/// ```
/// use noisegen_dsp::noise::mls::Mls;
///
/// let mut mls = Mls::new();
/// mls.set_n_bits(16);
/// mls.set_state(0xACE1);
///
/// let mut output = vec![0.0; 100];
/// mls.process_overwrite(&mut output);
/// assert!(output.iter().all(|&s| s == 1.0 || s == -1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Mls {
    n_bits: usize,
    feedback_bit: usize,
    feedback_mask: u64,
    active_mask: u64,
    taps_mask: u64,
    state: u64,
    seed: u64,
    needs_sync: bool,
}

impl Default for Mls {
    fn default() -> Self {
        Self::new()
    }
}

impl Mls {
    /// Create a new MLS generator using the widest register.
    pub fn new() -> Self {
        Self {
            n_bits: Self::maximum_number_of_bits(),
            feedback_bit: 0,
            feedback_mask: 0,
            active_mask: 0,
            taps_mask: 0,
            state: 0,
            seed: 0,
            needs_sync: true,
        }
    }

    /// Maximum supported register width.
    pub const fn maximum_number_of_bits() -> usize {
        TAPS_MASK_TABLE.len()
    }

    /// Set the register width, clamped to `1..=maximum_number_of_bits()`.
    ///
    /// Restarts the sequence from the current seed.
    pub fn set_n_bits(&mut self, n_bits: usize) {
        let n_bits = n_bits.clamp(1, Self::maximum_number_of_bits());
        if n_bits == self.n_bits {
            return;
        }
        self.n_bits = n_bits;
        self.needs_sync = true;
    }

    /// Set the seed and restart the sequence.
    ///
    /// A seed that is zero within the active bits is replaced by all ones.
    pub fn set_state(&mut self, seed: u64) {
        self.seed = seed;
        self.needs_sync = true;
    }

    /// Get the current register width.
    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    /// Get the current register contents.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Get the sequence period (2^N - 1).
    pub fn period(&self) -> u64 {
        if self.n_bits == Self::maximum_number_of_bits() {
            u64::MAX
        } else {
            (1 << self.n_bits) - 1
        }
    }

    fn update_settings(&mut self) {
        if !self.needs_sync {
            return;
        }

        self.feedback_bit = self.n_bits - 1;
        self.feedback_mask = 1 << self.feedback_bit;
        self.active_mask = self.period();
        self.taps_mask = TAPS_MASK_TABLE[self.n_bits - 1];

        self.state = self.seed & self.active_mask;
        if self.state == 0 {
            self.state = self.active_mask;
        }

        self.needs_sync = false;
    }

    /// Parity of all bits in the value.
    fn xor_gate(value: u64) -> u64 {
        (value.count_ones() & 1) as u64
    }

    /// Advance the LFSR by one step and return the output bit.
    fn progress(&mut self) -> u64 {
        self.update_settings();

        let output = self.state & 1;
        let feedback_value = Self::xor_gate(self.state & self.taps_mask);

        self.state >>= 1;
        self.state = (self.state & !self.feedback_mask) | (feedback_value << self.feedback_bit);

        output
    }

    /// Generate a single sample: `+1.0` for a set output bit, `-1.0` otherwise.
    pub fn process_single(&mut self) -> f32 {
        if self.progress() != 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Output sequence to a destination buffer, overwriting its content.
    pub fn process_overwrite(&mut self, dst: &mut [f32]) {
        for d in dst.iter_mut() {
            *d = self.process_single();
        }
    }
}
