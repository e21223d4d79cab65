//! Window functions for spectral analysis and resynthesis.
//!
//! Provides the Hann and power-raised-cosine windows used by the spectral
//! processor, plus the inverse amplitude-modulation curve that flattens the
//! squared Hann window after 50% overlap-add.

use std::f64::consts::PI;

/// Exponent of the power-raised-cosine window.
const POWER_COSINE_EXPONENT: f64 = 1.25;

/// Window function shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowShape {
    /// `0.5 - 0.5 cos(2 pi i / (N - 1))`. Needs amplitude correction after overlap-add.
    Hann,
    /// `(1 - t^2)^1.25` with `t` spanning [-1, 1]. Flat enough that no
    /// correction is applied.
    PowerCosine,
}

/// Generates a window of the given shape and size.
pub fn generate_window(shape: WindowShape, size: usize) -> Vec<f32> {
    match shape {
        WindowShape::Hann => hann_window(size),
        WindowShape::PowerCosine => power_cosine_window(size),
    }
}

/// Returns `Some(trivial_window)` for degenerate sizes (0 or 1), or `None`
/// to indicate the caller should compute the full window.
#[inline]
fn trivial_window(size: usize) -> Option<Vec<f32>> {
    match size {
        0 => Some(vec![]),
        1 => Some(vec![1.0]),
        _ => None,
    }
}

#[inline]
fn hann_window(size: usize) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * i as f64) / (n - 1.0);
            (0.5 - 0.5 * x.cos()) as f32
        })
        .collect()
}

#[inline]
fn power_cosine_window(size: usize) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let t = -1.0 + 2.0 * i as f64 / (n - 1.0);
            (1.0 - t * t).max(0.0).powf(POWER_COSINE_EXPONENT) as f32
        })
        .collect()
}

/// Builds the inverse amplitude-correction curve for `half_size` output
/// samples, or `None` when the shape needs no correction.
///
/// For Hann: `H[j] = k - (1 - k) cos(2 pi j / half)` with `k = (1 + sqrt(0.5)) / 2`.
/// With `scaled` set the curve is `2 H[j] / k`, the gain used by the
/// stereo and onset-adaptive pipelines.
pub fn amplitude_correction(shape: WindowShape, half_size: usize, scaled: bool) -> Option<Vec<f32>> {
    match shape {
        WindowShape::PowerCosine => None,
        WindowShape::Hann => Some(hann_correction(half_size, scaled)),
    }
}

fn hann_correction(half_size: usize, scaled: bool) -> Vec<f32> {
    let k = (1.0 + 0.5f64.sqrt()) * 0.5;
    let half = half_size.max(1) as f64;
    (0..half_size)
        .map(|j| {
            let h = k - (1.0 - k) * (2.0 * PI * j as f64 / half).cos();
            let h = if scaled { 2.0 * h / k } else { h };
            h as f32
        })
        .collect()
}

/// Applies a window function to a slice in-place.
#[inline]
pub fn apply_window(data: &mut [f32], window: &[f32]) {
    for (sample, &w) in data.iter_mut().zip(window.iter()) {
        *sample *= w;
    }
}
