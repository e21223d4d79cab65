use crate::error::StretchError;

/// A single audio sample (32-bit float, nominal range -1.0 to 1.0).
pub type Sample = f32;

/// Channel layouts supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Number of channels.
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }

    /// Maps a raw channel count to a layout.
    pub fn from_count(count: usize) -> Result<Self, StretchError> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            n => Err(StretchError::InvalidParameter(format!(
                "unsupported channel count: {} (expected 1 or 2)",
                n
            ))),
        }
    }
}

/// A fully loaded, planar waveform: one sample vector per channel.
///
/// All channels have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    channels: Vec<Vec<Sample>>,
    sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform from per-channel sample vectors.
    ///
    /// # Errors
    /// Returns [`StretchError::InvalidParameter`] for zero sample rate,
    /// a channel count other than 1 or 2, or channels of unequal length.
    pub fn new(channels: Vec<Vec<Sample>>, sample_rate: u32) -> Result<Self, StretchError> {
        if sample_rate == 0 {
            return Err(StretchError::InvalidParameter(
                "sample rate must be greater than 0".to_string(),
            ));
        }
        Channels::from_count(channels.len())?;
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(StretchError::InvalidParameter(
                "all channels must have the same number of samples".to_string(),
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Creates a mono waveform.
    pub fn from_mono(samples: Vec<Sample>, sample_rate: u32) -> Result<Self, StretchError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Creates a waveform from interleaved samples. Trailing samples that do
    /// not fill a whole frame are dropped.
    pub fn from_interleaved(
        data: &[Sample],
        channels: Channels,
        sample_rate: u32,
    ) -> Result<Self, StretchError> {
        let n = channels.count();
        let planar = (0..n)
            .map(|ch| {
                data.chunks_exact(n)
                    .map(|frame| frame[ch])
                    .collect::<Vec<_>>()
            })
            .collect();
        Self::new(planar, sample_rate)
    }

    /// An empty waveform with the given layout.
    pub fn empty(channels: Channels, sample_rate: u32) -> Result<Self, StretchError> {
        Self::new(vec![Vec::new(); channels.count()], sample_rate)
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn layout(&self) -> Channels {
        if self.channels.len() == 2 {
            Channels::Stereo
        } else {
            Channels::Mono
        }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    #[inline]
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel. Panics if `ch` is out of range.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[Sample] {
        &self.channels[ch]
    }

    pub fn channels(&self) -> &[Vec<Sample>] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<Sample>] {
        &mut self.channels
    }

    /// Interleaves channels into a single buffer (`[L0, R0, L1, R1, ...]`).
    pub fn to_interleaved(&self) -> Vec<Sample> {
        let n = self.num_channels();
        let mut out = Vec::with_capacity(self.len() * n);
        for i in 0..self.len() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Averages stereo down to a single channel. Mono is returned as is.
    pub fn to_mono(&self) -> Waveform {
        if self.num_channels() == 1 {
            return self.clone();
        }
        let mixed = self.channels[0]
            .iter()
            .zip(self.channels[1].iter())
            .map(|(&l, &r)| (l + r) * 0.5)
            .collect();
        Waveform {
            channels: vec![mixed],
            sample_rate: self.sample_rate,
        }
    }

    /// Duplicates a mono channel into both stereo channels.
    pub fn to_stereo(&self) -> Waveform {
        if self.num_channels() == 2 {
            return self.clone();
        }
        Waveform {
            channels: vec![self.channels[0].clone(), self.channels[0].clone()],
            sample_rate: self.sample_rate,
        }
    }

    /// Largest absolute sample value over all channels.
    pub fn peak(&self) -> Sample {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_mono() {
        let w = Waveform::from_mono(vec![0.1, 0.2, 0.3], 44100).unwrap();
        assert_eq!(w.len(), 3);
        assert_eq!(w.layout(), Channels::Mono);
        assert!((w.duration_secs() - 3.0 / 44100.0).abs() < 1e-10);
    }

    #[test]
    fn test_waveform_rejects_bad_layouts() {
        assert!(Waveform::new(vec![], 44100).is_err());
        assert!(Waveform::new(vec![vec![0.0]; 3], 44100).is_err());
        assert!(Waveform::new(vec![vec![0.0], vec![0.0, 1.0]], 44100).is_err());
        assert!(Waveform::from_mono(vec![0.0], 0).is_err());
    }

    #[test]
    fn test_interleave_roundtrip() {
        let data = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let w = Waveform::from_interleaved(&data, Channels::Stereo, 48000).unwrap();
        assert_eq!(w.channel(0), &[0.1, 0.3, 0.5]);
        assert_eq!(w.channel(1), &[0.2, 0.4, 0.6]);
        assert_eq!(w.to_interleaved(), data);
    }

    #[test]
    fn test_from_interleaved_drops_partial_frame() {
        let w = Waveform::from_interleaved(&[0.1, 0.2, 0.3], Channels::Stereo, 44100).unwrap();
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_to_mono_averages() {
        let w = Waveform::new(vec![vec![1.0, 0.0], vec![0.0, -1.0]], 44100).unwrap();
        let m = w.to_mono();
        assert_eq!(m.num_channels(), 1);
        assert_eq!(m.channel(0), &[0.5, -0.5]);
    }

    #[test]
    fn test_to_stereo_duplicates() {
        let w = Waveform::from_mono(vec![0.25, -0.25], 44100).unwrap();
        let s = w.to_stereo();
        assert_eq!(s.layout(), Channels::Stereo);
        assert_eq!(s.channel(0), s.channel(1));
    }

    #[test]
    fn test_empty_waveform() {
        let w = Waveform::empty(Channels::Stereo, 44100).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.num_channels(), 2);
        assert_eq!(w.peak(), 0.0);
    }
}
