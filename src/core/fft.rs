//! FFT-related constants shared across the crate.

use rustfft::num_complex::Complex;

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Full turn in radians.
pub const TWO_PI: f32 = 2.0 * std::f32::consts::PI;

/// Number of non-redundant bins of a real-input transform of `size` points.
#[inline]
pub const fn num_bins(size: usize) -> usize {
    size / 2 + 1
}
