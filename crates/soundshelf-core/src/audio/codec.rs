//! WAV container encoding and decoding.
//!
//! Clips are stored as uncompressed 16-bit integer PCM (`fmt ` format tag 1)
//! at [`SAMPLE_RATE`]. Decoding accepts any integer PCM bit depth hound can
//! read, but rejects float or compressed codecs, foreign sample rates, and
//! containers whose chunk sizes disagree with the file on disk.

use crate::{CoreError, CoreResult, DecodeError, PcmBuffer, audio::SAMPLE_RATE};

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, instrument, warn};

/// Bit depth written by [`WavCodec::encode`].
///
/// Samples are quantized to `i16`, so a decode of an encoded buffer matches
/// the original to within one quantization step (`1 / 32768`).
pub const BITS_PER_SAMPLE: u16 = 16;

const I16_SCALE: f32 = 32_768.0;
const RIFF_HEADER_LEN: u64 = 12;
/// Smallest header in front of the samples: RIFF preamble, `fmt ` and `data` chunk headers.
const MIN_HEADER_LEN: u64 = 44;

/// Stateless WAV encoder/decoder for [`PcmBuffer`]s.
pub struct WavCodec;

impl WavCodec {
    /// Write `pcm` to `path` as a 16-bit PCM WAV file.
    ///
    /// The file is written to a sibling temp file, synced, and renamed into
    /// place, so `path` either holds a complete container or does not exist.
    #[track_caller]
    #[instrument(skip(pcm), fields(sample_count = pcm.samples().len()))]
    pub fn encode(pcm: &PcmBuffer, path: &Path) -> CoreResult<()> {
        let temp_path = temp_path_for(path);

        let result = Self::write_container(pcm, &temp_path).and_then(|()| {
            fs::rename(&temp_path, path).map_err(|e| CoreError::Encode {
                path: path.to_path_buf(),
                reason: format!("Failed to rename temp file into place: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
        });

        if result.is_err() && temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!(temp_path = ?temp_path, error = %e, "Failed to remove partial WAV file");
            }
        }

        if result.is_ok() {
            debug!(path = ?path, frames = pcm.frames(), "Clip encoded");
        }

        result
    }

    /// Parse the WAV file at `path` back into a [`PcmBuffer`].
    #[track_caller]
    #[instrument]
    pub fn decode(path: &Path) -> CoreResult<PcmBuffer> {
        let location = ErrorLocation::from(Location::caller());

        Self::read_container(path).map_err(|source| CoreError::Decode {
            path: path.to_path_buf(),
            source,
            location,
        })
    }

    #[track_caller]
    fn write_container(pcm: &PcmBuffer, temp_path: &Path) -> CoreResult<()> {
        let encode_error = |reason: String| CoreError::Encode {
            path: temp_path.to_path_buf(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        let spec = WavSpec {
            channels: pcm.channels(),
            sample_rate: pcm.sample_rate(),
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        };

        let file = File::create(temp_path)
            .map_err(|e| encode_error(format!("Failed to create file: {}", e)))?;
        let mut buffered = BufWriter::new(file);

        {
            let mut writer = WavWriter::new(&mut buffered, spec)
                .map_err(|e| encode_error(format!("Failed to write header: {}", e)))?;

            for &sample in pcm.samples() {
                writer
                    .write_sample(quantize(sample))
                    .map_err(|e| encode_error(format!("Failed to write sample: {}", e)))?;
            }

            writer
                .finalize()
                .map_err(|e| encode_error(format!("Failed to finalize container: {}", e)))?;
        }

        let file = buffered
            .into_inner()
            .map_err(|e| encode_error(format!("Failed to flush file: {}", e.error())))?;

        file.sync_all()
            .map_err(|e| encode_error(format!("Failed to sync file: {}", e)))?;

        Ok(())
    }

    fn read_container(path: &Path) -> Result<PcmBuffer, DecodeError> {
        let mut file = File::open(path)?;
        let file_len = check_riff_header(&mut file)?;
        file.seek(SeekFrom::Start(0))?;

        let reader = WavReader::new(BufReader::new(file)).map_err(map_hound_error)?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int {
            return Err(DecodeError::UnsupportedFormat {
                reason: "IEEE float samples are not integer PCM".to_string(),
            });
        }
        if spec.sample_rate != SAMPLE_RATE {
            return Err(DecodeError::UnsupportedSampleRate {
                found: spec.sample_rate,
            });
        }
        if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(DecodeError::UnsupportedBitDepth {
                bits: spec.bits_per_sample,
            });
        }
        if spec.channels == 0 {
            return Err(DecodeError::Malformed {
                reason: "fmt chunk declares zero channels".to_string(),
            });
        }

        // The data chunk header is untrusted; never reserve more than the file can hold.
        let expected = reader.len();
        let bytes_per_sample = u64::from(spec.bits_per_sample / 8);
        let on_disk = file_len.saturating_sub(MIN_HEADER_LEN) / bytes_per_sample;
        let capacity = u64::from(expected).min(on_disk) as usize;

        let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
        let mut samples = Vec::with_capacity(capacity);

        for sample in reader.into_samples::<i32>() {
            match sample {
                Ok(value) => samples.push(value as f32 / scale),
                Err(hound::Error::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(DecodeError::Truncated {
                        expected,
                        read: samples.len() as u32,
                    });
                }
                Err(e) => return Err(map_hound_error(e)),
            }
        }

        Ok(PcmBuffer::new(samples, spec.channels))
    }
}

/// Sibling path the encoder writes before renaming into place.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn quantize(sample: f32) -> i16 {
    (sample * I16_SCALE)
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// Validate the 12-byte RIFF/WAVE preamble against the file length, which is
/// returned.
fn check_riff_header(file: &mut File) -> Result<u64, DecodeError> {
    let file_len = file.metadata()?.len();
    if file_len < RIFF_HEADER_LEN {
        return Err(DecodeError::NotRiff);
    }

    let mut header = [0_u8; RIFF_HEADER_LEN as usize];
    file.read_exact(&mut header)?;

    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err(DecodeError::NotRiff);
    }

    let declared = u64::from(u32::from_le_bytes([header[4], header[5], header[6], header[7]]));
    let actual = file_len - 8;
    if declared != actual {
        return Err(DecodeError::ChunkSizeMismatch { declared, actual });
    }

    Ok(file_len)
}

fn map_hound_error(error: hound::Error) -> DecodeError {
    match error {
        hound::Error::IoError(e) => DecodeError::Io(e),
        hound::Error::Unsupported => DecodeError::UnsupportedFormat {
            reason: "fmt chunk names a codec other than PCM".to_string(),
        },
        hound::Error::FormatError(reason) => DecodeError::Malformed {
            reason: reason.to_string(),
        },
        other => DecodeError::Malformed {
            reason: other.to_string(),
        },
    }
}
