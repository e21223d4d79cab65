//! Hop scheduling strategies for the stretch driver.
//!
//! A scheduler decides, once per output frame, whether a new source frame is
//! read, how the current and previous spectra are blended, and when the run
//! is complete. The driver calls, in order: [`HopScheduler::should_fetch`],
//! [`HopScheduler::on_fetch`] (only after a fetch), [`HopScheduler::blend`],
//! then [`HopScheduler::advance`] after the output block has been emitted.

/// Shared interface of the classic and onset-adaptive schedulers.
pub trait HopScheduler {
    /// Whether this iteration reads and analyses a new source frame.
    fn should_fetch(&self) -> bool;

    /// Current source read position in samples.
    fn position(&self) -> f64;

    /// Notifies the scheduler that a frame was fetched and whether it was
    /// classified as an onset.
    fn on_fetch(&mut self, onset: bool);

    /// Weight of the current spectrum; the previous spectrum gets `1 - blend`.
    fn blend(&self) -> f32;

    /// Moves to the next iteration after an output block was emitted.
    fn advance(&mut self);

    /// True once the read position has reached the end of the source.
    fn is_done(&self) -> bool;

    /// Whether onset strength feeds this scheduler.
    fn uses_onsets(&self) -> bool {
        false
    }

    /// Completion in `[0, 1]`.
    fn progress(&self) -> f64;
}

/// Fixed fractional hop of `(window / 2) / stretch` samples; one fetch per
/// output block.
#[derive(Debug, Clone)]
pub struct ClassicScheduler {
    position: f64,
    hop: f64,
    length: usize,
    done: bool,
}

impl ClassicScheduler {
    pub fn new(length: usize, window_size: usize, stretch: f64) -> Self {
        Self {
            position: 0.0,
            hop: (window_size as f64 * 0.5) / stretch,
            length,
            done: length == 0,
        }
    }

    /// Source samples advanced per output block.
    pub fn hop(&self) -> f64 {
        self.hop
    }
}

impl HopScheduler for ClassicScheduler {
    fn should_fetch(&self) -> bool {
        true
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn on_fetch(&mut self, _onset: bool) {}

    fn blend(&self) -> f32 {
        1.0
    }

    fn advance(&mut self) {
        self.position += self.hop;
        if self.position >= self.length as f64 {
            self.done = true;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn progress(&self) -> f64 {
        progress(self.position, self.length)
    }
}

/// Fractional display tick between two cached spectra.
///
/// The tick grows by `min(1 / stretch, 1)` per output block. When it reaches
/// 1.0 it wraps and a new frame is fetched, half a window further into the
/// source. A detected onset forces the tick to 1.0 and adds one unit of
/// extra credit; while credit is outstanding the tick grows by only half its
/// usual increment, and that half is paid off the credit.
#[derive(Debug, Clone)]
pub struct OnsetScheduler {
    position: f64,
    displacement: f64,
    length: usize,
    tick: f64,
    tick_increase: f64,
    extra_credit: f64,
    fetch_pending: bool,
    fetched: bool,
    done: bool,
}

impl OnsetScheduler {
    pub fn new(length: usize, window_size: usize, stretch: f64) -> Self {
        Self {
            position: 0.0,
            displacement: window_size as f64 * 0.5,
            length,
            tick: 0.0,
            tick_increase: (1.0 / stretch).min(1.0),
            extra_credit: 0.0,
            fetch_pending: true,
            fetched: false,
            done: length == 0,
        }
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    pub fn tick_increase(&self) -> f64 {
        self.tick_increase
    }

    pub fn extra_credit(&self) -> f64 {
        self.extra_credit
    }
}

impl HopScheduler for OnsetScheduler {
    fn should_fetch(&self) -> bool {
        self.fetch_pending
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn on_fetch(&mut self, onset: bool) {
        self.fetched = true;
        if onset {
            self.tick = 1.0;
            self.extra_credit += 1.0;
        }
    }

    fn blend(&self) -> f32 {
        self.tick as f32
    }

    fn advance(&mut self) {
        if self.fetched {
            self.position += self.displacement;
        }
        self.fetched = false;
        self.fetch_pending = false;

        if self.position >= self.length as f64 {
            self.done = true;
            return;
        }

        if self.extra_credit <= 0.0 {
            self.tick += self.tick_increase;
        } else {
            // Must stay below tick_increase so the tick keeps moving
            let credit_get = 0.5 * self.tick_increase;
            self.extra_credit = (self.extra_credit - credit_get).max(0.0);
            self.tick += self.tick_increase - credit_get;
        }

        if self.tick >= 1.0 {
            self.tick %= 1.0;
            self.fetch_pending = true;
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn uses_onsets(&self) -> bool {
        true
    }

    fn progress(&self) -> f64 {
        progress(self.position, self.length)
    }
}

#[inline]
fn progress(position: f64, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        (position / length as f64).clamp(0.0, 1.0)
    }
}
