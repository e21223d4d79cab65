use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::core::types::{Channels, Sample, Waveform};
use crate::error::StretchError;
use crate::stretch::engine::SampleSink;

/// WAV audio format codes.
const WAV_FORMAT_PCM: u16 = 1;
const WAV_FORMAT_IEEE_FLOAT: u16 = 3;
const WAV_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the canonical header written by this module.
const HEADER_LEN: usize = 44;
/// Byte offset of the RIFF size field.
const RIFF_SIZE_OFFSET: u64 = 4;
/// Byte offset of the data chunk size field in the canonical header.
const DATA_SIZE_OFFSET: u64 = 40;
/// Largest data chunk whose RIFF size still fits in a `u32`.
const MAX_DATA_BYTES: u64 = u32::MAX as u64 - 36;

/// Reads a WAV file from a byte slice.
///
/// Supports mono and stereo, 8/16/24/32-bit integer PCM and 32-bit IEEE
/// float, little-endian RIFF only.
pub fn read_wav(data: &[u8]) -> Result<Waveform, StretchError> {
    if data.len() < 12 {
        return Err(StretchError::InvalidFormat(
            "WAV file too short".to_string(),
        ));
    }
    if &data[0..4] != b"RIFF" {
        return Err(StretchError::InvalidFormat(
            "Missing RIFF header".to_string(),
        ));
    }
    if &data[8..12] != b"WAVE" {
        return Err(StretchError::InvalidFormat(
            "Missing WAVE identifier".to_string(),
        ));
    }
    let mut cursor = 12;

    let mut format_code: u16 = 0;
    let mut num_channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut bits_per_sample: u16 = 0;
    let mut audio_data: Option<&[u8]> = None;

    while cursor + 8 <= data.len() {
        let chunk_id = &data[cursor..cursor + 4];
        let chunk_size = read_u32_le(data, cursor + 4) as usize;
        cursor += 8;

        if chunk_id == b"fmt " {
            if chunk_size < 16 || cursor + 16 > data.len() {
                return Err(StretchError::InvalidFormat(
                    "fmt chunk too short".to_string(),
                ));
            }
            format_code = read_u16_le(data, cursor);
            num_channels = read_u16_le(data, cursor + 2);
            sample_rate = read_u32_le(data, cursor + 4);
            // skip byte rate (4 bytes) and block align (2 bytes)
            bits_per_sample = read_u16_le(data, cursor + 14);
            if format_code == WAV_FORMAT_EXTENSIBLE && chunk_size >= 40 && cursor + 26 <= data.len()
            {
                // First two bytes of the sub-format GUID carry the real code
                format_code = read_u16_le(data, cursor + 24);
            }
        } else if chunk_id == b"data" {
            let end = cursor.saturating_add(chunk_size).min(data.len());
            // Use whatever data is available
            audio_data = Some(&data[cursor..end]);
        }

        cursor = cursor.saturating_add(chunk_size);
        // WAV chunks are word-aligned
        if chunk_size % 2 != 0 {
            cursor = cursor.saturating_add(1);
        }
    }

    if sample_rate == 0 {
        return Err(StretchError::InvalidFormat(
            "No fmt chunk found".to_string(),
        ));
    }
    let audio_data = audio_data.ok_or_else(|| {
        StretchError::InvalidFormat("No data chunk found".to_string())
    })?;

    let channels = match num_channels {
        1 => Channels::Mono,
        2 => Channels::Stereo,
        n => {
            return Err(StretchError::InvalidFormat(format!(
                "Unsupported channel count: {}",
                n
            )))
        }
    };

    let samples: Vec<Sample> = match (format_code, bits_per_sample) {
        (WAV_FORMAT_PCM, 8) => audio_data
            .iter()
            .map(|&b| (b as f32 - 128.0) / 128.0)
            .collect(),
        (WAV_FORMAT_PCM, 16) => audio_data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect(),
        (WAV_FORMAT_PCM, 24) => audio_data
            .chunks_exact(3)
            .map(|b| {
                let raw = (b[0] as i32) | ((b[1] as i32) << 8) | ((b[2] as i32) << 16);
                // Sign extend
                let raw = if raw & 0x800000 != 0 {
                    raw | !0xFFFFFF
                } else {
                    raw
                };
                raw as f32 / 8388608.0
            })
            .collect(),
        (WAV_FORMAT_PCM, 32) => audio_data
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2147483648.0)
            .collect(),
        (WAV_FORMAT_IEEE_FLOAT, 32) => audio_data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        (fmt, bits) => {
            return Err(StretchError::InvalidFormat(format!(
                "Unsupported WAV format: code={}, bits={}",
                fmt, bits
            )))
        }
    };

    Waveform::from_interleaved(&samples, channels, sample_rate)
}

/// Reads a WAV file from disk.
pub fn read_wav_file(path: impl AsRef<Path>) -> Result<Waveform, StretchError> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| StretchError::InputLoad(format!("{}: {}", path.display(), e)))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| StretchError::InputLoad(format!("{}: {}", path.display(), e)))?;
    read_wav(&data)
}

/// Converts a sample to 16-bit PCM: clamp, scale by 32767, truncate.
#[inline]
pub fn quantize_i16(sample: Sample) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

fn header_16bit(num_channels: u16, sample_rate: u32, data_size: u32) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    // Saturates for rates above ~1 GHz
    let byte_rate = sample_rate.saturating_mul(block_align as u32);
    let file_size = 36u32.saturating_add(data_size);

    let mut out = Vec::with_capacity(HEADER_LEN);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    out.extend_from_slice(&WAV_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out
}

/// Size in bytes of a 16-bit data chunk holding `frames` frames.
///
/// # Errors
/// Returns [`StretchError::Io`] when the file would exceed the 4 GiB RIFF limit.
fn data_chunk_size(frames: u64, num_channels: u16) -> Result<u32, StretchError> {
    let bytes = frames.saturating_mul(2 * num_channels as u64);
    if bytes > MAX_DATA_BYTES {
        return Err(StretchError::Io(
            "output exceeds the 4 GiB WAV size limit".to_string(),
        ));
    }
    Ok(bytes as u32)
}

/// Encodes a waveform as a 16-bit PCM WAV file.
///
/// # Errors
/// Returns [`StretchError::Io`] if the waveform is too long for a RIFF file.
pub fn write_wav_16bit(waveform: &Waveform) -> Result<Vec<u8>, StretchError> {
    let num_channels = waveform.num_channels() as u16;
    let data_size = data_chunk_size(waveform.len() as u64, num_channels)?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_size as usize);
    out.extend_from_slice(&header_16bit(num_channels, waveform.sample_rate(), data_size));
    for sample in waveform.to_interleaved() {
        out.extend_from_slice(&quantize_i16(sample).to_le_bytes());
    }
    Ok(out)
}

/// Writes a waveform to disk as 16-bit PCM.
pub fn write_wav_file_16bit(path: impl AsRef<Path>, waveform: &Waveform) -> Result<(), StretchError> {
    let path = path.as_ref();
    let data = write_wav_16bit(waveform)?;
    let mut file = File::create(path)
        .map_err(|e| StretchError::Io(format!("{}: {}", path.display(), e)))?;
    file.write_all(&data)
        .map_err(|e| StretchError::Io(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Streaming 16-bit PCM writer.
///
/// Writes a placeholder header on creation, appends blocks as they arrive,
/// and patches the RIFF and data sizes in [`SampleSink::finish`]. A writer
/// dropped before `finish` leaves a file with zero sizes in its header.
pub struct WavWriter<W: Write + Seek> {
    inner: W,
    num_channels: u16,
    data_bytes: u64,
    scratch: Vec<u8>,
    finished: bool,
}

impl WavWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the header.
    pub fn create(
        path: impl AsRef<Path>,
        channels: Channels,
        sample_rate: u32,
    ) -> Result<Self, StretchError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| StretchError::Io(format!("{}: {}", path.display(), e)))?;
        Self::new(BufWriter::new(file), channels, sample_rate)
    }
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(mut inner: W, channels: Channels, sample_rate: u32) -> Result<Self, StretchError> {
        let num_channels = channels.count() as u16;
        inner.write_all(&header_16bit(num_channels, sample_rate, 0))?;
        Ok(Self {
            inner,
            num_channels,
            data_bytes: 0,
            scratch: Vec::new(),
            finished: false,
        })
    }

    /// Sample frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.data_bytes / (2 * self.num_channels as u64)
    }

    /// Returns the wrapped writer. Call after `finish`.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> SampleSink for WavWriter<W> {
    fn write_block(&mut self, block: &[Vec<Sample>]) -> Result<(), StretchError> {
        let frames = block.first().map_or(0, |c| c.len());
        self.scratch.clear();
        for i in 0..frames {
            for channel in block.iter().take(self.num_channels as usize) {
                self.scratch
                    .extend_from_slice(&quantize_i16(channel[i]).to_le_bytes());
            }
        }
        let new_total = self.data_bytes + self.scratch.len() as u64;
        if new_total > MAX_DATA_BYTES {
            return Err(StretchError::Io(
                "output exceeds the 4 GiB WAV size limit".to_string(),
            ));
        }
        self.inner.write_all(&self.scratch)?;
        self.data_bytes = new_total;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StretchError> {
        if self.finished {
            return Ok(());
        }
        let data_size = self.data_bytes as u32;
        self.inner.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
        self.inner.write_all(&(36 + data_size).to_le_bytes())?;
        self.inner.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
        self.inner.write_all(&data_size.to_le_bytes())?;
        self.inner.seek(SeekFrom::End(0))?;
        self.inner.flush()?;
        self.finished = true;
        Ok(())
    }
}

#[inline]
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
