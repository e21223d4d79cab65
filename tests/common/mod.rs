#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::Path;

use paulstretch::Waveform;

pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

/// Quiet pad with loud clicks at the given sample positions.
pub fn gen_click_pad(sr: u32, n: usize, click_positions: &[usize]) -> Vec<f32> {
    let mut out = gen_sine(220.0, sr, n, |_| 0.05);
    for &p in click_positions {
        for k in 0..64 {
            if p + k < n {
                out[p + k] += 0.9 * (1.0 - k as f32 / 64.0) * if k % 2 == 0 { 1.0 } else { -1.0 };
            }
        }
    }
    out
}

pub fn mono(samples: Vec<f32>, sr: u32) -> Waveform {
    Waveform::from_mono(samples, sr).unwrap()
}

pub fn windowed_rms(signal: &[f32], start: usize, len: usize) -> f64 {
    if signal.is_empty() || len == 0 {
        return 0.0;
    }
    let end = (start + len).min(signal.len());
    if start >= end {
        return 0.0;
    }
    let sum: f64 = signal[start..end].iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum / (end - start) as f64).sqrt()
}

pub fn rms(signal: &[f32]) -> f64 {
    windowed_rms(signal, 0, signal.len())
}

pub fn all_finite_in_range(signal: &[f32]) -> bool {
    signal.iter().all(|s| s.is_finite() && (-1.0..=1.0).contains(s))
}

/// Writes interleaved float samples with hound in the requested format.
pub fn write_hound_wav(
    path: &Path,
    interleaved: &[f32],
    channels: u16,
    sample_rate: u32,
    bits: u16,
    float: bool,
) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        sample_format: if float {
            hound::SampleFormat::Float
        } else {
            hound::SampleFormat::Int
        },
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in interleaved {
        if float {
            writer.write_sample(s).unwrap();
        } else {
            let max = ((1i64 << (bits - 1)) - 1) as f32;
            let v = (s * max).round() as i32;
            match bits {
                8 => writer.write_sample(v as i8).unwrap(),
                16 => writer.write_sample(v as i16).unwrap(),
                _ => writer.write_sample(v).unwrap(),
            }
        }
    }
    writer.finalize().unwrap();
}

/// Reads a 16-bit WAV with hound; returns (spec, interleaved samples).
pub fn read_hound_i16(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}
