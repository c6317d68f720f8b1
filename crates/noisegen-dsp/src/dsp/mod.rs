// SPDX-License-Identifier: LGPL-3.0-or-later

//! Low-level primitives shared by the processing units.

pub mod biquad;
pub mod ops;
