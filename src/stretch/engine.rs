//! The stretch driver: tail fade, main loop and output sinks.

use crate::analysis::onset::OnsetDetector;
use crate::core::fft::num_bins;
use crate::core::types::{Channels, Sample, Waveform};
use crate::core::window::amplitude_correction;
use crate::error::StretchError;
use crate::stretch::diagnostics::{Diagnostics, NoDiagnostics, Observation};
use crate::stretch::frame::{extract_frames, floor_index};
use crate::stretch::overlap_add::OverlapAdd;
use crate::stretch::params::{StretchMode, StretchParams};
use crate::stretch::scheduler::{ClassicScheduler, HopScheduler, OnsetScheduler};
use crate::stretch::spectral::{PhaseSource, RandomPhase, SpectralProcessor};

/// Length of the end-of-stream fade in seconds.
const TAIL_FADE_SECONDS: f64 = 0.05;
/// Minimum fade length in samples.
const MIN_TAIL_FADE: usize = 16;

/// Destination for output blocks of `window / 2` samples per channel.
pub trait SampleSink {
    /// Receives one block; every channel slice has the same length and all
    /// samples are already clamped to `[-1, 1]`.
    fn write_block(&mut self, block: &[Vec<Sample>]) -> Result<(), StretchError>;

    /// Called once after the last block.
    fn finish(&mut self) -> Result<(), StretchError> {
        Ok(())
    }
}

/// Collects output blocks in memory.
#[derive(Debug, Clone)]
pub struct WaveformCollector {
    channels: Vec<Vec<Sample>>,
    sample_rate: u32,
}

impl WaveformCollector {
    pub fn new(channels: Channels, sample_rate: u32) -> Self {
        Self {
            channels: vec![Vec::new(); channels.count()],
            sample_rate,
        }
    }

    /// Samples collected so far, per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_waveform(self) -> Result<Waveform, StretchError> {
        Waveform::new(self.channels, self.sample_rate)
    }
}

impl SampleSink for WaveformCollector {
    fn write_block(&mut self, block: &[Vec<Sample>]) -> Result<(), StretchError> {
        for (dst, src) in self.channels.iter_mut().zip(block.iter()) {
            dst.extend_from_slice(src);
        }
        Ok(())
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StretchReport {
    /// Window size in samples.
    pub window_size: usize,
    /// Output blocks emitted.
    pub iterations: usize,
    /// Source frames read and analysed.
    pub frames_fetched: usize,
    /// Fetched frames classified as onsets.
    pub onsets: usize,
    /// Output samples per channel.
    pub output_len: usize,
}

/// Applies a linear 1 -> 0 ramp to the last `max(0.05 s, 16)` samples of
/// every channel. Shorter waveforms are faded over their full length.
pub fn fade_tail(waveform: &mut Waveform) {
    let len = waveform.len();
    let fade_len = ((waveform.sample_rate() as f64 * TAIL_FADE_SECONDS) as usize)
        .max(MIN_TAIL_FADE)
        .min(len);
    if fade_len == 0 {
        return;
    }
    let start = len - fade_len;
    let denom = (fade_len - 1).max(1) as f32;
    for channel in waveform.channels_mut() {
        for (i, s) in channel[start..].iter_mut().enumerate() {
            let gain = if fade_len == 1 {
                1.0
            } else {
                1.0 - i as f32 / denom
            };
            *s *= gain;
        }
    }
}

/// Rejects waveforms holding NaN or infinite samples.
///
/// # Errors
/// Returns [`StretchError::InvalidParameter`] naming the first bad sample.
pub fn check_finite(waveform: &Waveform) -> Result<(), StretchError> {
    for (ch, channel) in waveform.channels().iter().enumerate() {
        if let Some(i) = channel.iter().position(|s| !s.is_finite()) {
            return Err(StretchError::InvalidParameter(format!(
                "input contains NaN or infinite samples (channel {}, sample {})",
                ch, i
            )));
        }
    }
    Ok(())
}

/// Per-run buffers owned by the driver loop. Sized once, reused every
/// iteration.
struct LoopState {
    frames: Vec<Vec<Sample>>,
    current: Vec<Vec<f32>>,
    previous: Vec<Vec<f32>>,
    phases: Vec<Vec<f32>>,
    blended: Vec<Vec<f32>>,
    synthesis: Vec<Vec<Sample>>,
    block: Vec<Vec<Sample>>,
}

impl LoopState {
    fn new(num_channels: usize, window_size: usize) -> Self {
        let bins = num_bins(window_size);
        Self {
            frames: vec![vec![0.0; window_size]; num_channels],
            current: vec![vec![0.0; bins]; num_channels],
            previous: vec![vec![0.0; bins]; num_channels],
            phases: vec![vec![0.0; bins]; num_channels],
            blended: vec![vec![0.0; bins]; num_channels],
            synthesis: vec![vec![0.0; window_size]; num_channels],
            block: vec![vec![0.0; window_size / 2]; num_channels],
        }
    }
}

/// Runs the stretch engine over fully loaded waveforms.
pub struct Stretcher {
    params: StretchParams,
    phase: Box<dyn PhaseSource>,
}

impl Stretcher {
    /// Validates `params` and seeds the phase generator from `params.seed`,
    /// or from OS entropy when no seed is set.
    pub fn new(params: StretchParams) -> Result<Self, StretchError> {
        params.validate()?;
        let phase: Box<dyn PhaseSource> = match params.seed {
            Some(seed) => Box::new(RandomPhase::seeded(seed)),
            None => Box::new(RandomPhase::new()),
        };
        Ok(Self { params, phase })
    }

    /// Replaces the phase generator.
    pub fn with_phase_source(mut self, phase: impl PhaseSource + 'static) -> Self {
        self.phase = Box::new(phase);
        self
    }

    pub fn params(&self) -> &StretchParams {
        &self.params
    }

    /// Stretches `input` into a new in-memory waveform.
    pub fn stretch(&mut self, input: &Waveform) -> Result<Waveform, StretchError> {
        let mut collector = WaveformCollector::new(input.layout(), input.sample_rate());
        self.run(input, &mut collector)?;
        collector.into_waveform()
    }

    /// Streams the stretched output of `input` into `sink`.
    pub fn run<S: SampleSink + ?Sized>(
        &mut self,
        input: &Waveform,
        sink: &mut S,
    ) -> Result<StretchReport, StretchError> {
        self.run_with_diagnostics(input, sink, &mut NoDiagnostics)
    }

    /// Like [`Stretcher::run`], recording onset observations in `diagnostics`.
    pub fn run_with_diagnostics<S: SampleSink + ?Sized>(
        &mut self,
        input: &Waveform,
        sink: &mut S,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<StretchReport, StretchError> {
        check_finite(input)?;

        let window_size = self.params.window_size(input.sample_rate());
        let half = window_size / 2;
        let num_channels = input.num_channels();
        let shape = self.params.effective_window_shape();

        log::info!(
            "stretching {} samples x {} ch at {} Hz: {} (window {} samples)",
            input.len(),
            num_channels,
            input.sample_rate(),
            self.params,
            window_size
        );

        let mut report = StretchReport {
            window_size,
            ..StretchReport::default()
        };

        let mut source = input.clone();
        fade_tail(&mut source);

        let mut scheduler: Box<dyn HopScheduler> = match self.params.mode {
            StretchMode::Classic => Box::new(ClassicScheduler::new(
                source.len(),
                window_size,
                self.params.stretch,
            )),
            StretchMode::OnsetAdaptive => Box::new(OnsetScheduler::new(
                source.len(),
                window_size,
                self.params.stretch,
            )),
        };

        let mut spectral = SpectralProcessor::new(window_size, shape);
        let correction = amplitude_correction(shape, half, self.params.scaled_correction());
        let mut ola = OverlapAdd::new(num_channels, window_size, correction);
        let mut detector = OnsetDetector::new(self.params.onset_sensitivity);
        let mut state = LoopState::new(num_channels, window_size);
        let mut last_decile = 0u32;

        while !scheduler.is_done() {
            if scheduler.should_fetch() {
                std::mem::swap(&mut state.current, &mut state.previous);
                let start = floor_index(scheduler.position());
                extract_frames(&source, start, &mut state.frames);
                for ch in 0..num_channels {
                    spectral.analyze(
                        &state.frames[ch],
                        &mut state.current[ch],
                        &mut state.phases[ch],
                    );
                }

                let onset = if scheduler.uses_onsets() {
                    let strength = detector.observe(&state.current);
                    let onset = detector.is_onset(strength);
                    diagnostics.record(Observation::OnsetStrength {
                        frame: report.frames_fetched,
                        strength,
                        onset,
                    });
                    onset
                } else {
                    false
                };
                if onset {
                    report.onsets += 1;
                }
                scheduler.on_fetch(onset);
                report.frames_fetched += 1;
            }

            let blend = scheduler.blend();
            for ch in 0..num_channels {
                let spectrum: &[f32] = if blend == 1.0 {
                    &state.current[ch]
                } else {
                    for ((b, &cur), &prev) in state.blended[ch]
                        .iter_mut()
                        .zip(state.current[ch].iter())
                        .zip(state.previous[ch].iter())
                    {
                        *b = cur * blend + prev * (1.0 - blend);
                    }
                    &state.blended[ch]
                };
                spectral.synthesize(
                    spectrum,
                    &state.phases[ch],
                    self.phase.as_mut(),
                    &mut state.synthesis[ch],
                );
            }

            ola.process(&state.synthesis, &mut state.block);
            sink.write_block(&state.block)?;
            report.iterations += 1;
            report.output_len += half;

            scheduler.advance();

            let decile = (scheduler.progress() * 10.0) as u32;
            if decile > last_decile {
                last_decile = decile;
                log::debug!("{} %", decile * 10);
            }
        }

        sink.finish()?;

        log::info!(
            "done: {} output samples per channel, {} frames analysed, {} onsets",
            report.output_len,
            report.frames_fetched,
            report.onsets
        );
        Ok(report)
    }
}
