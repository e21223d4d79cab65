//! Magnitude analysis, phase replacement and windowed resynthesis.

use std::sync::Arc;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::core::fft::{num_bins, COMPLEX_ZERO, TWO_PI};
use crate::core::window::{generate_window, WindowShape};

/// Supplies the phase angle of every bin before resynthesis.
pub trait PhaseSource {
    /// Writes one angle per bin into `out`. `analysis` holds the phases measured
    /// on the most recently analysed frame, for sources that want them.
    fn fill(&mut self, analysis: &[f32], out: &mut [f32]);
}

/// Independent uniform angles in `[0, 2 pi)`.
pub struct RandomPhase {
    rng: StdRng,
    dist: Uniform<f32>,
}

impl RandomPhase {
    /// Seeds from operating system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            dist: Uniform::new(0.0, TWO_PI),
        }
    }
}

impl Default for RandomPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseSource for RandomPhase {
    fn fill(&mut self, _analysis: &[f32], out: &mut [f32]) {
        for phase in out.iter_mut() {
            *phase = self.dist.sample(&mut self.rng);
        }
    }
}

/// Keeps the measured phases, turning the engine into a plain STFT
/// analysis/resynthesis pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct OriginalPhase;

impl PhaseSource for OriginalPhase {
    fn fill(&mut self, analysis: &[f32], out: &mut [f32]) {
        out.copy_from_slice(&analysis[..out.len()]);
    }
}

/// Forward/inverse transform pair for one window size.
///
/// All buffers are allocated once; `analyze` and `synthesize` do not allocate.
pub struct SpectralProcessor {
    size: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    phases: Vec<f32>,
}

impl SpectralProcessor {
    /// Plans transforms of `size` points using a window of `shape`.
    pub fn new(size: usize, shape: WindowShape) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            size,
            window: generate_window(shape, size),
            forward,
            inverse,
            buffer: vec![COMPLEX_ZERO; size],
            scratch: vec![COMPLEX_ZERO; scratch_len],
            phases: vec![0.0; num_bins(size)],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        num_bins(self.size)
    }

    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Windows `frame`, transforms it, and writes the magnitude and phase
    /// of each of the `size / 2 + 1` bins.
    pub fn analyze(&mut self, frame: &[f32], magnitudes: &mut [f32], phases: &mut [f32]) {
        for (buf, (&s, &w)) in self
            .buffer
            .iter_mut()
            .zip(frame.iter().zip(self.window.iter()))
        {
            *buf = Complex::new(s * w, 0.0);
        }

        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let bins = self.num_bins();
        for ((c, mag), phase) in self.buffer[..bins]
            .iter()
            .zip(magnitudes.iter_mut())
            .zip(phases.iter_mut())
        {
            *mag = c.norm();
            *phase = c.arg();
        }
    }

    /// Rebuilds a time-domain frame from `magnitudes` with angles taken from
    /// `phase_source`, then applies the synthesis window.
    pub fn synthesize(
        &mut self,
        magnitudes: &[f32],
        analysis_phases: &[f32],
        phase_source: &mut dyn PhaseSource,
        out: &mut [f32],
    ) {
        let bins = self.num_bins();
        phase_source.fill(analysis_phases, &mut self.phases);

        for bin in 0..bins {
            self.buffer[bin] = Complex::from_polar(magnitudes[bin], self.phases[bin]);
        }
        // Hermitian mirror so the inverse transform is real
        for bin in 1..bins - 1 {
            self.buffer[self.size - bin] = self.buffer[bin].conj();
        }

        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let norm = 1.0 / self.size as f32;
        for ((o, c), &w) in out
            .iter_mut()
            .zip(self.buffer.iter())
            .zip(self.window.iter())
        {
            *o = c.re * norm * w;
        }
    }
}
