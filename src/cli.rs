use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use paulstretch::io::wav::{read_wav_file, WavWriter};
use paulstretch::stretch::params::{
    DEFAULT_ONSET_SENSITIVITY, DEFAULT_STRETCH, DEFAULT_WINDOW_SECONDS,
};
use paulstretch::stretch::{check_finite, LogDiagnostics};
use paulstretch::{StretchMode, StretchParams, Stretcher, WindowShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Fixed fractional hop, power-cosine window
    Classic,
    /// Spectral crossfade with onset jumps, Hann window
    Onset,
}

impl From<Mode> for StretchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Classic => StretchMode::Classic,
            Mode::Onset => StretchMode::OnsetAdaptive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Window {
    Hann,
    PowerCosine,
}

impl From<Window> for WindowShape {
    fn from(window: Window) -> Self {
        match window {
            Window::Hann => WindowShape::Hann,
            Window::PowerCosine => WindowShape::PowerCosine,
        }
    }
}

/// Extreme time stretching of WAV files.
#[derive(Debug, Parser)]
#[command(name = "paulstretch", version, about)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file (16-bit PCM)
    output: PathBuf,

    /// Stretch amount (1.0 = no stretch)
    #[arg(short, long, default_value_t = DEFAULT_STRETCH)]
    stretch: f64,

    /// Window size in seconds
    #[arg(short = 'w', long = "window-size", default_value_t = DEFAULT_WINDOW_SECONDS)]
    window_size: f64,

    /// Onset sensitivity (0.0 = maximum, large values disable detection)
    #[arg(short = 't', long, allow_negative_numbers = true, default_value_t = DEFAULT_ONSET_SENSITIVITY)]
    onset: f32,

    /// Hop scheduler
    #[arg(short, long, value_enum, default_value_t = Mode::Classic)]
    mode: Mode,

    /// Analysis window; defaults to the mode's own window
    #[arg(long, value_enum)]
    window: Option<Window>,

    /// Downmix to mono before stretching
    #[arg(long, conflicts_with = "stereo")]
    mono: bool,

    /// Duplicate mono input to stereo before stretching
    #[arg(long)]
    stereo: bool,

    /// Seed for the phase generator (reproducible output)
    #[arg(long)]
    seed: Option<u64>,

    /// Use the exact window length instead of rounding to a fast FFT size
    #[arg(long)]
    no_optimize: bool,

    /// Print progress and per-frame onset strength
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn params(&self) -> StretchParams {
        let mut params = StretchParams::new(self.stretch)
            .with_window_seconds(self.window_size)
            .with_onset_sensitivity(self.onset)
            .with_mode(self.mode.into())
            .with_optimize_window_size(!self.no_optimize);
        if let Some(window) = self.window {
            params = params.with_window_shape(window.into());
        }
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        params
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        }
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let params = args.params();
    if let Err(e) = params.validate() {
        eprintln!("ERROR: {}", e);
        eprintln!("Usage: paulstretch [OPTIONS] <INPUT> <OUTPUT>  (see --help)");
        process::exit(1);
    }

    let mut input = match read_wav_file(&args.input) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", args.input.display(), e);
            process::exit(1);
        }
    };
    if args.mono {
        input = input.to_mono();
    } else if args.stereo {
        input = input.to_stereo();
    }

    eprintln!(
        "Input: {} samples, {} Hz, {} ch, {:.2}s, peak {:.3}",
        input.len(),
        input.sample_rate(),
        input.num_channels(),
        input.duration_secs(),
        input.peak()
    );

    if let Err(e) = check_finite(&input) {
        eprintln!("ERROR: {}: {}", args.input.display(), e);
        process::exit(1);
    }

    let mut stretcher = match Stretcher::new(params) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut writer = match WavWriter::create(&args.output, input.layout(), input.sample_rate()) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("ERROR: Failed to create {}: {}", args.output.display(), e);
            process::exit(1);
        }
    };

    let result = if args.verbose {
        stretcher.run_with_diagnostics(&input, &mut writer, &mut LogDiagnostics)
    } else {
        stretcher.run(&input, &mut writer)
    };

    match result {
        Ok(report) => {
            let secs = report.output_len as f64 / input.sample_rate() as f64;
            eprintln!(
                "Output: {} samples, {:.2}s, window {} samples ({} onsets)",
                report.output_len, secs, report.window_size, report.onsets
            );
            eprintln!(
                "Wrote {} frames to {}",
                writer.frames_written(),
                args.output.display()
            );
        }
        Err(e) => {
            eprintln!("ERROR: Stretch failed: {}", e);
            process::exit(1);
        }
    }
}
