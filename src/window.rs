//! Periodic analysis windows for overlapping frames.
//!
//! All windows here are *periodic* (`2πn / N`, not `2πn / (N - 1)`), which is
//! what makes them sum to a constant when shifted by a hop that divides `N`.

use alloc::vec::Vec;
use core::f32::consts::PI;

#[inline]
fn cos(x: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        x.cos()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::cosf(x)
    }
}

/// Generate a periodic Hann window of length `len`.
pub fn hann(len: usize) -> Vec<f32> {
    let mut out = alloc::vec![0.0f32; len];
    fill_hann(&mut out);
    out
}

/// Fill `out` with a periodic Hann window.
pub fn fill_hann(out: &mut [f32]) {
    let n = out.len() as f32;
    for (i, w) in out.iter_mut().enumerate() {
        *w = 0.5 - 0.5 * cos(2.0 * PI * i as f32 / n);
    }
}

/// Generate a periodic Hamming window of length `len`.
pub fn hamming(len: usize) -> Vec<f32> {
    let mut out = alloc::vec![0.0f32; len];
    fill_hamming(&mut out);
    out
}

/// Fill `out` with a periodic Hamming window. Constant overlap-add at hops of
/// `N / 2` and finer, with a gain of `1.08 * N / (2 * hop)`.
pub fn fill_hamming(out: &mut [f32]) {
    let n = out.len() as f32;
    for (i, w) in out.iter_mut().enumerate() {
        *w = 0.54 - 0.46 * cos(2.0 * PI * i as f32 / n);
    }
}

/// Generate a periodic Blackman window of length `len`.
pub fn blackman(len: usize) -> Vec<f32> {
    let mut out = alloc::vec![0.0f32; len];
    fill_blackman(&mut out);
    out
}

/// Fill `out` with a periodic Blackman window. Constant overlap-add needs at
/// least three frames per sample, so with power-of-two hops use
/// `hop <= N / 4`.
pub fn fill_blackman(out: &mut [f32]) {
    let n = out.len() as f32;
    for (i, w) in out.iter_mut().enumerate() {
        let x = i as f32 / n;
        // Rounding can leave the endpoint a hair below zero.
        *w = (0.42 - 0.5 * cos(2.0 * PI * x) + 0.08 * cos(4.0 * PI * x)).max(0.0);
    }
}

/// Gain that turns the overlap-added Hann sum `N / (2 * hop)` into unity.
///
/// `1.0` at 50% overlap, `0.5` at 75%, `0.25` at 87.5%.
#[inline]
pub fn hop_compensation(fft_size: usize, hop_size: usize) -> f32 {
    (2 * hop_size) as f32 / fft_size as f32
}

/// The default frame window: periodic Hann scaled by [`hop_compensation`].
pub fn fill_compensated_hann(window: &mut [f32], hop_size: usize) {
    fill_hann(window);
    let gain = hop_compensation(window.len(), hop_size);
    for w in window.iter_mut() {
        *w *= gain;
    }
}

/// Range `(min, max)` of `Σ_k window[n + k * hop]` over one hop.
///
/// An identity callback reproduces the input scaled by this sum, so a window
/// is usable for perfect reconstruction when `min` and `max` are both `1.0`
/// (to within rounding).
pub fn overlap_add_gain(window: &[f32], hop_size: usize) -> (f32, f32) {
    if window.is_empty() || hop_size == 0 {
        return (0.0, 0.0);
    }
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for n in 0..hop_size.min(window.len()) {
        let sum: f32 = window[n..].iter().step_by(hop_size).sum();
        lo = lo.min(sum);
        hi = hi.max(sum);
    }
    (lo, hi)
}
