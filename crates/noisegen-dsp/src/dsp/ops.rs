// SPDX-License-Identifier: LGPL-3.0-or-later

//! Buffer operations on `f32` sample blocks.
//!
//! All binary operations process `min(dst.len(), src.len())` samples.

use multiversion::multiversion;

/// Multiply each element by a scalar: `dst[i] *= k`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn scale(dst: &mut [f32], k: f32) {
    for d in dst.iter_mut() {
        *d *= k;
    }
}

/// Scale and shift each element: `dst[i] = dst[i] * k + c`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn scale_offset(dst: &mut [f32], k: f32, c: f32) {
    for d in dst.iter_mut() {
        *d = *d * k + c;
    }
}

/// Accumulate with gain: `dst[i] += src[i] * k`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn add_scaled(dst: &mut [f32], src: &[f32], k: f32) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d += *s * k;
    }
}

/// Element-wise product: `dst[i] *= src[i]`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn mul(dst: &mut [f32], src: &[f32]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d *= *s;
    }
}

/// Peak absolute value of a buffer, `0.0` when empty.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn abs_max(src: &[f32]) -> f32 {
    src.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()))
}
