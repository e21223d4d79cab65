use std::fmt;

use crate::core::window::WindowShape;
use crate::error::StretchError;

/// Default stretch factor.
pub const DEFAULT_STRETCH: f64 = 8.0;
/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECONDS: f64 = 0.25;
/// Default onset sensitivity. Onset strength is clamped to [0, 1], so any
/// threshold at or above 1.0 never fires.
pub const DEFAULT_ONSET_SENSITIVITY: f32 = 10.0;
/// Window lengths at or below this many seconds are rejected.
pub const MIN_WINDOW_SECONDS: f64 = 0.001;
/// Smallest window size in samples.
pub const MIN_WINDOW_SIZE: usize = 16;

/// How the driver advances through the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StretchMode {
    /// Fixed hop of `(N / 2) / stretch` source samples per output frame.
    Classic,
    /// Fractional tick between cached spectra; source frames are fetched at
    /// a rate set by the stretch factor and snapped forward on onsets.
    OnsetAdaptive,
}

impl StretchMode {
    /// Window shape each mode uses unless overridden.
    pub fn default_window_shape(self) -> WindowShape {
        match self {
            StretchMode::Classic => WindowShape::PowerCosine,
            StretchMode::OnsetAdaptive => WindowShape::Hann,
        }
    }
}

impl fmt::Display for StretchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StretchMode::Classic => write!(f, "classic"),
            StretchMode::OnsetAdaptive => write!(f, "onset-adaptive"),
        }
    }
}

/// Parameters controlling a stretch run.
#[derive(Debug, Clone, PartialEq)]
pub struct StretchParams {
    /// Stretch factor: output duration is roughly input duration times this.
    pub stretch: f64,
    /// Window length in seconds (converted to samples per sample rate).
    pub window_seconds: f64,
    /// Onset strength above which the onset-adaptive scheduler snaps to a new frame.
    pub onset_sensitivity: f32,
    /// Scheduling mode.
    pub mode: StretchMode,
    /// Window shape override. `None` uses the mode's default.
    pub window_shape: Option<WindowShape>,
    /// Round window sizes up to a product of 2, 3 and 5.
    pub optimize_window_size: bool,
    /// Seed for the phase generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            stretch: DEFAULT_STRETCH,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            onset_sensitivity: DEFAULT_ONSET_SENSITIVITY,
            mode: StretchMode::Classic,
            window_shape: None,
            optimize_window_size: true,
            seed: None,
        }
    }
}

impl StretchParams {
    /// Creates parameters with the given stretch factor and defaults elsewhere.
    pub fn new(stretch: f64) -> Self {
        Self {
            stretch,
            ..Self::default()
        }
    }

    pub fn with_window_seconds(mut self, seconds: f64) -> Self {
        self.window_seconds = seconds;
        self
    }

    pub fn with_onset_sensitivity(mut self, sensitivity: f32) -> Self {
        self.onset_sensitivity = sensitivity;
        self
    }

    pub fn with_mode(mut self, mode: StretchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_window_shape(mut self, shape: WindowShape) -> Self {
        self.window_shape = Some(shape);
        self
    }

    pub fn with_optimize_window_size(mut self, optimize: bool) -> Self {
        self.optimize_window_size = optimize;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Window shape in effect for this run.
    pub fn effective_window_shape(&self) -> WindowShape {
        self.window_shape
            .unwrap_or_else(|| self.mode.default_window_shape())
    }

    /// Whether the amplitude-correction curve carries the `2 / k` gain.
    /// The onset-adaptive pipeline uses the scaled curve, classic the plain one.
    pub fn scaled_correction(&self) -> bool {
        self.mode == StretchMode::OnsetAdaptive
    }

    /// Window size in samples for `sample_rate`: at least 16, optionally
    /// rounded up to a 5-smooth size, then rounded down to even.
    pub fn window_size(&self, sample_rate: u32) -> usize {
        let raw = (self.window_seconds * sample_rate as f64) as usize;
        let mut n = raw.max(MIN_WINDOW_SIZE);
        if self.optimize_window_size {
            n = optimize_window_size(n);
        }
        (n / 2) * 2
    }

    /// Validate all parameters.
    ///
    /// # Errors
    /// Returns [`StretchError::InvalidParameter`] describing the first bad value.
    pub fn validate(&self) -> Result<(), StretchError> {
        if !self.stretch.is_finite() || self.stretch <= 0.0 {
            return Err(StretchError::InvalidParameter(format!(
                "stretch must be positive and finite, got {}",
                self.stretch
            )));
        }
        if !self.window_seconds.is_finite() || self.window_seconds <= MIN_WINDOW_SECONDS {
            return Err(StretchError::InvalidParameter(format!(
                "window size must be greater than {} seconds, got {}",
                MIN_WINDOW_SECONDS, self.window_seconds
            )));
        }
        if !self.onset_sensitivity.is_finite() || self.onset_sensitivity < 0.0 {
            return Err(StretchError::InvalidParameter(format!(
                "onset sensitivity must be non-negative, got {}",
                self.onset_sensitivity
            )));
        }
        Ok(())
    }
}

impl fmt::Display for StretchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stretch={:.4}, window={:.4}s, mode={}, window_shape={:?}, onset={}",
            self.stretch,
            self.window_seconds,
            self.mode,
            self.effective_window_shape(),
            self.onset_sensitivity
        )
    }
}

/// Smallest size `>= n` whose only prime factors are 2, 3 and 5.
pub fn optimize_window_size(n: usize) -> usize {
    if n < 2 {
        return n;
    }
    let mut candidate = n;
    loop {
        let mut rest = candidate;
        for factor in [2, 3, 5] {
            while rest % factor == 0 {
                rest /= factor;
            }
        }
        if rest < 2 {
            return candidate;
        }
        candidate += 1;
    }
}
