mod common;

use common::*;
use paulstretch::{StretchError, StretchMode, StretchParams};
use tempfile::tempdir;

#[test]
fn test_sine_file_stretched_four_times() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sine.wav");
    let output = dir.path().join("stretched.wav");
    let sr = 44100;
    let samples = gen_sine(440.0, sr, sr as usize, |_| 0.5);
    write_hound_wav(&input, &samples, 1, sr, 16, false);

    let params = StretchParams::new(4.0).with_window_seconds(0.25).with_seed(11);
    let report = paulstretch::stretch_file(&input, &output, &params).unwrap();
    assert_eq!(report.window_size, 11250);

    let (spec, out) = read_hound_i16(&output);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, sr);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(out.len(), report.output_len);

    // Within one output block of 4 seconds
    let expected = 4 * sr as usize;
    assert!(out.len() >= expected, "too short: {}", out.len());
    assert!(out.len() < expected + 11250 / 2, "too long: {}", out.len());

    let float: Vec<f32> = out.iter().map(|&s| s as f32 / 32768.0).collect();
    let mid = windowed_rms(&float, float.len() / 4, float.len() / 2);
    assert!(mid > 0.05, "stretched body is silent: rms {}", mid);
}

#[test]
fn test_stereo_file_keeps_layout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("stereo.wav");
    let output = dir.path().join("out.wav");
    let sr = 22050;
    let left = gen_sine(330.0, sr, 11025, |_| 0.4);
    let right = gen_sine(550.0, sr, 11025, |_| 0.2);
    let interleaved: Vec<f32> = left
        .iter()
        .zip(right.iter())
        .flat_map(|(&l, &r)| [l, r])
        .collect();
    write_hound_wav(&input, &interleaved, 2, sr, 24, false);

    let params = StretchParams::new(3.0)
        .with_window_seconds(0.1)
        .with_mode(StretchMode::OnsetAdaptive)
        .with_seed(3);
    let report = paulstretch::stretch_file(&input, &output, &params).unwrap();

    let (spec, out) = read_hound_i16(&output);
    assert_eq!(spec.channels, 2);
    assert_eq!(out.len(), 2 * report.output_len);
    let left_out: Vec<f32> = out.iter().step_by(2).map(|&s| s as f32 / 32768.0).collect();
    let right_out: Vec<f32> = out.iter().skip(1).step_by(2).map(|&s| s as f32 / 32768.0).collect();
    assert!(rms(&left_out) > rms(&right_out));
}

#[test]
fn test_empty_input_gives_valid_empty_wav() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.wav");
    let output = dir.path().join("out.wav");
    write_hound_wav(&input, &[], 1, 44100, 16, false);

    let report =
        paulstretch::stretch_file(&input, &output, &StretchParams::new(8.0).with_seed(1)).unwrap();
    assert_eq!(report.iterations, 0);
    assert_eq!(report.output_len, 0);

    let (spec, out) = read_hound_i16(&output);
    assert_eq!(spec.sample_rate, 44100);
    assert!(out.is_empty());
}

#[test]
fn test_missing_input_creates_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("does-not-exist.wav");
    let output = dir.path().join("out.wav");

    let err = paulstretch::stretch_file(&input, &output, &StretchParams::default()).unwrap_err();
    assert!(matches!(err, StretchError::InputLoad(_)), "got {:?}", err);
    assert!(err.is_load_error());
    assert!(!output.exists());
}

#[test]
fn test_nan_input_creates_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("nan.wav");
    let output = dir.path().join("out.wav");
    let mut samples = gen_sine(440.0, 44100, 4410, |_| 0.5);
    samples[10] = f32::NAN;
    write_hound_wav(&input, &samples, 1, 44100, 32, true);

    let err = paulstretch::stretch_file(&input, &output, &StretchParams::new(2.0)).unwrap_err();
    assert!(matches!(err, StretchError::InvalidParameter(_)), "got {:?}", err);
    assert!(!output.exists());
}

#[test]
fn test_garbage_input_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("noise.wav");
    let output = dir.path().join("out.wav");
    std::fs::write(&input, b"this is not a riff file at all").unwrap();

    let err = paulstretch::stretch_file(&input, &output, &StretchParams::default()).unwrap_err();
    assert!(matches!(err, StretchError::InvalidFormat(_)));
    assert!(!output.exists());
}

#[test]
fn test_invalid_params_rejected_before_reading() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.wav");
    let params = StretchParams::new(2.0).with_window_seconds(0.0005);
    let err = paulstretch::stretch_file(dir.path().join("x.wav"), &output, &params).unwrap_err();
    assert!(matches!(err, StretchError::InvalidParameter(_)));
    assert!(!output.exists());
}
