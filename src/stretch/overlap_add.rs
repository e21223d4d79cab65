//! 50%-overlap reconstruction of processed frames.

use crate::core::types::Sample;

/// Combines each synthesis frame with the second half of the previous one.
///
/// Holds exactly one previous frame per channel, so every frame contributes
/// to two consecutive output blocks and no more.
pub struct OverlapAdd {
    half: usize,
    previous: Vec<Vec<Sample>>,
    correction: Option<Vec<f32>>,
}

impl OverlapAdd {
    /// `window_size` must be even. `correction`, when present, holds
    /// `window_size / 2` gains applied to every output block.
    pub fn new(num_channels: usize, window_size: usize, correction: Option<Vec<f32>>) -> Self {
        let half = window_size / 2;
        debug_assert!(correction.as_ref().map_or(true, |c| c.len() == half));
        Self {
            half,
            previous: vec![vec![0.0; window_size]; num_channels],
            correction,
        }
    }

    /// Writes `half` output samples per channel into `out` and retains
    /// `frames` for the next call.
    ///
    /// `out[k] = clamp((frames[k] + previous[k + half]) * H[k], -1, 1)`.
    pub fn process(&mut self, frames: &[Vec<Sample>], out: &mut [Vec<Sample>]) {
        let half = self.half;
        for ((frame, prev), block) in frames
            .iter()
            .zip(self.previous.iter_mut())
            .zip(out.iter_mut())
        {
            for (k, o) in block[..half].iter_mut().enumerate() {
                *o = frame[k] + prev[k + half];
            }
            if let Some(h) = &self.correction {
                for (o, &g) in block[..half].iter_mut().zip(h.iter()) {
                    *o *= g;
                }
            }
            for o in block[..half].iter_mut() {
                *o = o.clamp(-1.0, 1.0);
            }
            prev.copy_from_slice(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_block_has_no_history() {
        let mut ola = OverlapAdd::new(1, 8, None);
        let frame = vec![vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]];
        let mut out = vec![vec![0.0; 4]];
        ola.process(&frame, &mut out);
        assert_eq!(out[0], vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_adds_previous_second_half() {
        let mut ola = OverlapAdd::new(1, 4, None);
        let mut out = vec![vec![0.0; 2]];
        ola.process(&[vec![0.0, 0.0, 0.25, 0.5]], &mut out);
        ola.process(&[vec![0.1, 0.1, 0.0, 0.0]], &mut out);
        assert!((out[0][0] - 0.35).abs() < 1e-6);
        assert!((out[0][1] - 0.6).abs() < 1e-6);
        // The first frame no longer contributes
        ola.process(&[vec![0.0; 4]], &mut out);
        assert_eq!(out[0], vec![0.0, 0.0]);
    }

    #[test]
    fn test_applies_correction_then_clamps() {
        let mut ola = OverlapAdd::new(2, 4, Some(vec![2.0, 0.5]));
        let frames = vec![vec![0.8, 0.8, 0.0, 0.0], vec![-0.3, -4.0, 0.0, 0.0]];
        let mut out = vec![vec![0.0; 2]; 2];
        ola.process(&frames, &mut out);
        assert_eq!(out[0], vec![1.0, 0.4]);
        assert_eq!(out[1], vec![-0.6, -1.0]);
    }
}
