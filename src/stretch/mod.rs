pub mod diagnostics;
pub mod engine;
pub mod frame;
pub mod overlap_add;
pub mod params;
pub mod scheduler;
pub mod spectral;

pub use diagnostics::{Diagnostics, LogDiagnostics, NoDiagnostics, Observation};
pub use engine::{check_finite, fade_tail, SampleSink, StretchReport, Stretcher, WaveformCollector};
pub use params::{StretchMode, StretchParams};
pub use scheduler::{ClassicScheduler, HopScheduler, OnsetScheduler};
pub use spectral::{OriginalPhase, PhaseSource, RandomPhase, SpectralProcessor};
