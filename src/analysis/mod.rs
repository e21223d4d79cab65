pub mod onset;

pub use onset::{onset_strength, OnsetDetector, ScaledProfile, NUM_PROFILE_BINS};
