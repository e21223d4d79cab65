//! Frame extraction with zero padding past the end of the source.

use crate::core::types::{Sample, Waveform};

/// Copies `out.len()` samples of `channel` starting at `start` into `out`.
/// Positions at or past the end of the channel are written as zero.
#[inline]
pub fn extract_frame(channel: &[Sample], start: usize, out: &mut [Sample]) {
    let available = channel.len().saturating_sub(start).min(out.len());
    if available > 0 {
        out[..available].copy_from_slice(&channel[start..start + available]);
    }
    out[available..].fill(0.0);
}

/// Extracts one frame per channel of `waveform` at `start`.
///
/// `frames` must hold one buffer per channel; each buffer's length sets
/// the frame size.
pub fn extract_frames(waveform: &Waveform, start: usize, frames: &mut [Vec<Sample>]) {
    for (channel, frame) in waveform.channels().iter().zip(frames.iter_mut()) {
        extract_frame(channel, start, frame);
    }
}

/// Floors a fractional read position to a sample index.
#[inline]
pub fn floor_index(position: f64) -> usize {
    if position <= 0.0 {
        0
    } else {
        position.floor() as usize
    }
}
