#![forbid(unsafe_code)]
//! Extreme audio time stretching.
//!
//! `paulstretch` stretches a waveform by factors from about 1 up to several
//! hundred. Each analysis window is reduced to its magnitude spectrum, given
//! fresh random phases, resynthesised and overlap-added. The spectral
//! envelope survives while phase coherence does not, which gives the
//! characteristic smeared, ambient texture.
//!
//! Two schedulers are available: [`StretchMode::Classic`] advances the read
//! position by a fixed fractional hop, and [`StretchMode::OnsetAdaptive`]
//! crossfades between cached spectra and jumps ahead on detected transients.
//!
//! # Quick Start
//!
//! ```
//! use paulstretch::{StretchParams, Waveform};
//!
//! // Half a second of 440 Hz sine at 22.05 kHz
//! let samples: Vec<f32> = (0..11025)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22050.0).sin())
//!     .collect();
//! let input = Waveform::from_mono(samples, 22050).unwrap();
//!
//! let params = StretchParams::new(4.0).with_window_seconds(0.1).with_seed(7);
//! let output = paulstretch::stretch(&input, &params).unwrap();
//! assert!(output.len() > 3 * input.len());
//! ```
//!
//! # Streaming output
//!
//! Output blocks can go straight to disk through any [`SampleSink`], so
//! memory use does not grow with the stretch factor:
//!
//! ```no_run
//! use paulstretch::{io::wav, StretchMode, StretchParams, Stretcher};
//!
//! let input = wav::read_wav_file("in.wav").unwrap();
//! let params = StretchParams::new(50.0).with_mode(StretchMode::OnsetAdaptive);
//! let mut writer = wav::WavWriter::create("out.wav", input.layout(), input.sample_rate()).unwrap();
//! Stretcher::new(params).unwrap().run(&input, &mut writer).unwrap();
//! ```

pub mod analysis;
pub mod core;
pub mod error;
pub mod io;
pub mod stretch;

use std::path::Path;

pub use crate::core::types::{Channels, Sample, Waveform};
pub use crate::core::window::WindowShape;
pub use error::StretchError;
pub use stretch::{
    Diagnostics, Observation, OriginalPhase, PhaseSource, RandomPhase, SampleSink, StretchMode,
    StretchParams, StretchReport, Stretcher,
};

/// Stretches a waveform in memory.
///
/// # Errors
///
/// Returns [`StretchError::InvalidParameter`] if `params` fail validation or
/// the input holds non-finite samples.
///
/// # Example
///
/// ```
/// use paulstretch::{StretchMode, StretchParams, Waveform};
///
/// let input = Waveform::from_mono(vec![0.1; 4000], 8000).unwrap();
/// let params = StretchParams::new(2.0)
///     .with_window_seconds(0.02)
///     .with_mode(StretchMode::OnsetAdaptive)
///     .with_seed(1);
/// let output = paulstretch::stretch(&input, &params).unwrap();
/// assert_eq!(output.sample_rate(), 8000);
/// ```
pub fn stretch(input: &Waveform, params: &StretchParams) -> Result<Waveform, StretchError> {
    Stretcher::new(params.clone())?.stretch(input)
}

/// Reads `input`, stretches it and streams 16-bit PCM to `output`.
///
/// The output file is only created once the input has been decoded and
/// checked, so a load failure or non-finite input leaves no file behind.
pub fn stretch_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &StretchParams,
) -> Result<StretchReport, StretchError> {
    let mut stretcher = Stretcher::new(params.clone())?;
    let waveform = io::wav::read_wav_file(input)?;
    stretch::check_finite(&waveform)?;
    let mut writer = io::wav::WavWriter::create(output, waveform.layout(), waveform.sample_rate())?;
    stretcher.run(&waveform, &mut writer)
}
