//! WAV decoding and encoding.

pub mod wav;

pub use wav::{read_wav, read_wav_file, write_wav_16bit, write_wav_file_16bit, WavWriter};
