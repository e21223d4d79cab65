//! Coarse spectral-energy onset detection.
//!
//! Each analysed frame is reduced to a small profile of averaged magnitudes;
//! consecutive profiles are compared to measure how sharply energy rose.

/// Number of buckets in a scaled-energy profile.
pub const NUM_PROFILE_BINS: usize = 32;

/// Additive floor in the onset-strength denominator.
const ONSET_EPSILON: f32 = 1e-3;

/// Averaged magnitude energy per frequency bucket for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledProfile {
    bins: [f32; NUM_PROFILE_BINS],
}

impl Default for ScaledProfile {
    fn default() -> Self {
        Self::zeros()
    }
}

impl ScaledProfile {
    pub fn zeros() -> Self {
        Self {
            bins: [0.0; NUM_PROFILE_BINS],
        }
    }

    pub fn from_bins(bins: [f32; NUM_PROFILE_BINS]) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[f32; NUM_PROFILE_BINS] {
        &self.bins
    }

    /// Builds a profile from per-channel magnitude spectra.
    ///
    /// Magnitudes are averaged across channels, then grouped into
    /// `NUM_PROFILE_BINS` contiguous buckets of `len / NUM_PROFILE_BINS` bins
    /// each; trailing bins that do not fill a bucket are ignored. Spectra with
    /// no more bins than buckets give an all-zero profile.
    pub fn from_magnitudes(spectra: &[Vec<f32>]) -> Self {
        let mut profile = Self::zeros();
        profile.update(spectra);
        profile
    }

    /// Recomputes the profile in place from per-channel spectra.
    pub fn update(&mut self, spectra: &[Vec<f32>]) {
        self.bins = [0.0; NUM_PROFILE_BINS];
        let len = spectra.iter().map(|s| s.len()).min().unwrap_or(0);
        if spectra.is_empty() || len <= NUM_PROFILE_BINS {
            return;
        }
        let group = len / NUM_PROFILE_BINS;
        let channel_norm = 1.0 / spectra.len() as f32;
        let group_norm = 1.0 / group as f32;

        for (bucket, value) in self.bins.iter_mut().enumerate() {
            let start = bucket * group;
            let mut sum = 0.0f32;
            for bin in start..start + group {
                let across: f32 = spectra.iter().map(|s| s[bin]).sum();
                sum += across * channel_norm;
            }
            *value = sum * group_norm;
        }
    }
}

/// Onset strength in `[0, 1]`:
/// `2 * mean(current - previous) / (mean(|previous|) + 1e-3)`, clamped.
pub fn onset_strength(current: &ScaledProfile, previous: &ScaledProfile) -> f32 {
    let n = NUM_PROFILE_BINS as f32;
    let rise: f32 = current
        .bins
        .iter()
        .zip(previous.bins.iter())
        .map(|(&c, &p)| c - p)
        .sum::<f32>()
        / n;
    let level: f32 = previous.bins.iter().map(|p| p.abs()).sum::<f32>() / n;
    let m = 2.0 * rise / (level + ONSET_EPSILON);
    m.clamp(0.0, 1.0)
}

/// Tracks the previous frame's profile and scores each new frame.
#[derive(Debug, Clone)]
pub struct OnsetDetector {
    sensitivity: f32,
    current: ScaledProfile,
    previous: ScaledProfile,
}

impl OnsetDetector {
    /// `sensitivity` is the strength a frame must exceed to count as an onset.
    /// Lower values are more sensitive.
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            current: ScaledProfile::zeros(),
            previous: ScaledProfile::zeros(),
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Scores a freshly analysed frame against the previous one and keeps it
    /// as the reference for the next call.
    pub fn observe(&mut self, spectra: &[Vec<f32>]) -> f32 {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.update(spectra);
        onset_strength(&self.current, &self.previous)
    }

    #[inline]
    pub fn is_onset(&self, strength: f32) -> bool {
        strength > self.sensitivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: f32) -> ScaledProfile {
        ScaledProfile::from_bins([value; NUM_PROFILE_BINS])
    }

    #[test]
    fn test_identical_profiles_have_zero_strength() {
        let p = flat(0.4);
        assert_eq!(onset_strength(&p, &p), 0.0);
    }

    #[test]
    fn test_doubled_energy_is_positive_and_clamped() {
        let prev = flat(0.4);
        let cur = flat(0.8);
        let m = onset_strength(&cur, &prev);
        assert!(m > 0.0 && m <= 1.0);
        assert_eq!(m, 1.0);
    }

    #[test]
    fn test_small_rise_is_not_clamped() {
        let prev = flat(1.0);
        let cur = flat(1.1);
        let m = onset_strength(&cur, &prev);
        // 2 * 0.1 / 1.001
        assert!((m - 0.2 / 1.001).abs() < 1e-4, "m={}", m);
    }

    #[test]
    fn test_decay_clamps_to_zero() {
        assert_eq!(onset_strength(&flat(0.1), &flat(0.9)), 0.0);
    }

    #[test]
    fn test_silence_after_silence_is_finite() {
        let m = onset_strength(&flat(0.0), &flat(0.0));
        assert_eq!(m, 0.0);
    }

    #[test]
    fn test_profile_groups_and_discards_remainder() {
        // 70 bins -> groups of 2, last 6 bins ignored
        let mut spectrum: Vec<f32> = (0..70).map(|i| i as f32).collect();
        for v in spectrum.iter_mut().skip(64) {
            *v = 1000.0;
        }
        let profile = ScaledProfile::from_magnitudes(&[spectrum]);
        assert_eq!(profile.bins()[0], 0.5);
        assert_eq!(profile.bins()[31], 62.5);
    }

    #[test]
    fn test_profile_averages_channels() {
        let left = vec![2.0; 64];
        let right = vec![4.0; 64];
        let profile = ScaledProfile::from_magnitudes(&[left, right]);
        assert!(profile.bins().iter().all(|&b| (b - 3.0).abs() < 1e-6));
    }

    #[test]
    fn test_short_spectrum_gives_zero_profile() {
        let profile = ScaledProfile::from_magnitudes(&[vec![5.0; 32]]);
        assert_eq!(profile, ScaledProfile::zeros());
    }

    #[test]
    fn test_detector_flags_sudden_energy() {
        let mut detector = OnsetDetector::new(0.5);
        let quiet = vec![vec![0.01; 129]];
        let loud = vec![vec![1.0; 129]];
        let first = detector.observe(&quiet);
        assert!(detector.is_onset(first));
        assert_eq!(detector.observe(&quiet), 0.0);
        let hit = detector.observe(&loud);
        assert!(detector.is_onset(hit));
        let again = detector.observe(&loud);
        assert!(!detector.is_onset(again));
    }

    #[test]
    fn test_threshold_at_one_never_fires() {
        let detector = OnsetDetector::new(1.0);
        assert!(!detector.is_onset(1.0));
    }
}
