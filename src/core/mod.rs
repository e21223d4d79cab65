//! Core types, window functions and FFT helpers.

pub mod fft;
pub mod types;
pub mod window;

pub use types::*;
pub use window::{amplitude_correction, apply_window, generate_window, WindowShape};
