//! Recording profiles and encoder capability negotiation
//!
//! A profile is an ordered list of acceptable encodings. At the start of a
//! session the first candidate the registry can actually produce wins; if
//! none can, the platform default is used instead of failing the recording.

use super::capture::InputFormat;
use super::format::{f32_to_i16, AudioConverter};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;

/// Sample rate of the compact encoding
const COMPACT_SAMPLE_RATE: u32 = 16000;

/// Recording quality policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordingProfile {
    /// Uncompressed PCM at the device rate
    #[default]
    HighFidelity,
    /// Smallest upload the platform can produce
    Compressed,
}

impl RecordingProfile {
    /// Candidate encodings in priority order
    pub fn candidates(&self) -> &'static [Encoding] {
        match self {
            RecordingProfile::HighFidelity => &[Encoding::WavPcm16],
            RecordingProfile::Compressed => &[
                Encoding::OpusWebm,
                Encoding::OpusOgg,
                Encoding::AacMp4,
                Encoding::WavPcm16Mono16k,
            ],
        }
    }
}

/// Container/codec pairs a recording can be uploaded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// 16-bit PCM WAV at the device rate and channel count
    WavPcm16,
    /// 16-bit PCM WAV, mono, 16kHz
    WavPcm16Mono16k,
    OpusWebm,
    OpusOgg,
    AacMp4,
}

impl Encoding {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Encoding::WavPcm16 | Encoding::WavPcm16Mono16k => "audio/wav",
            Encoding::OpusWebm => "audio/webm;codecs=opus",
            Encoding::OpusOgg => "audio/ogg;codecs=opus",
            Encoding::AacMp4 => "audio/mp4",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Encoding::WavPcm16 | Encoding::WavPcm16Mono16k => "wav",
            Encoding::OpusWebm => "webm",
            Encoding::OpusOgg => "ogg",
            Encoding::AacMp4 => "m4a",
        }
    }

    /// Best guess from a file name or URL path
    pub fn from_extension(name: &str) -> Option<Self> {
        let path = name.split(['?', '#']).next().unwrap_or(name);
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "wav" => Some(Encoding::WavPcm16),
            "webm" => Some(Encoding::OpusWebm),
            "ogg" | "opus" => Some(Encoding::OpusOgg),
            "m4a" | "mp4" | "aac" => Some(Encoding::AacMp4),
            _ => None,
        }
    }
}

/// Encoding used when no profile candidate is supported
pub const PLATFORM_DEFAULT: Encoding = Encoding::WavPcm16;

/// Errors raised while encoding a finished recording
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("Resampling failed: {0}")]
    Resample(String),
}

/// Turns buffered interleaved f32 samples into an upload-ready byte blob
pub trait AudioEncoder: Send + Sync {
    fn encoding(&self) -> Encoding;

    fn encode(&self, samples: &[f32], format: InputFormat) -> Result<Vec<u8>, EncodeError>;
}

/// Uncompressed WAV at the source rate and channel count
pub struct WavEncoder;

impl AudioEncoder for WavEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::WavPcm16
    }

    fn encode(&self, samples: &[f32], format: InputFormat) -> Result<Vec<u8>, EncodeError> {
        let spec = hound::WavSpec {
            channels: format.channels.max(1),
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(spec, &f32_to_i16(samples))
    }
}

/// Mono 16kHz WAV, roughly a sixth the size of a stereo 48kHz capture
pub struct CompactWavEncoder;

impl AudioEncoder for CompactWavEncoder {
    fn encoding(&self) -> Encoding {
        Encoding::WavPcm16Mono16k
    }

    fn encode(&self, samples: &[f32], format: InputFormat) -> Result<Vec<u8>, EncodeError> {
        let mono = if format.sample_rate == COMPACT_SAMPLE_RATE {
            super::format::mix_to_mono(samples, usize::from(format.channels))
        } else {
            let mut converter = AudioConverter::new(
                format.sample_rate,
                COMPACT_SAMPLE_RATE,
                usize::from(format.channels),
            )
            .map_err(|e| EncodeError::Resample(e.to_string()))?;
            converter
                .convert_all(samples)
                .map_err(|e| EncodeError::Resample(e.to_string()))?
        };

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: COMPACT_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(spec, &f32_to_i16(&mono))
    }
}

fn write_wav(spec: hound::WavSpec, samples: &[i16]) -> Result<Vec<u8>, EncodeError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Set of encoders the current platform can run
#[derive(Clone)]
pub struct EncoderRegistry {
    encoders: Vec<Arc<dyn AudioEncoder>>,
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EncoderRegistry {
    /// Registry with the encoders this crate ships
    pub fn builtin() -> Self {
        Self {
            encoders: vec![Arc::new(WavEncoder), Arc::new(CompactWavEncoder)],
        }
    }

    /// Registry that supports nothing, leaving only the platform default
    pub fn empty() -> Self {
        Self {
            encoders: Vec::new(),
        }
    }

    pub fn register(&mut self, encoder: Arc<dyn AudioEncoder>) {
        self.encoders.push(encoder);
    }

    /// Pick the first supported candidate of `profile`
    pub fn negotiate(&self, profile: RecordingProfile) -> Arc<dyn AudioEncoder> {
        for candidate in profile.candidates() {
            if let Some(encoder) = self.encoders.iter().find(|e| e.encoding() == *candidate) {
                tracing::info!(
                    "Negotiated encoding {:?} ({}) for {:?} profile",
                    candidate,
                    candidate.mime_type(),
                    profile
                );
                return encoder.clone();
            }
            tracing::debug!("Encoding {:?} not supported, trying next", candidate);
        }

        tracing::warn!(
            "No {:?} profile encoding supported, using platform default {:?}",
            profile,
            PLATFORM_DEFAULT
        );
        Arc::new(WavEncoder)
    }
}
