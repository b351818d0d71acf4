//! Microphone capture sessions
//!
//! A `CaptureSession` holds the microphone exclusively between `start()` and
//! `stop()`/`cancel()`. Audio arrives from the device callback over a channel
//! and is buffered for encoding; the same stream feeds the loudness tap used
//! for live waveforms. Releasing the device is tied to dropping the
//! `InputGuard`, so every exit path lets go of it.

use super::blob::AudioBlob;
use super::device::{device_display_name, recording_device};
use super::encoding::{AudioEncoder, EncodeError, EncoderRegistry, RecordingProfile};
use super::format::mix_to_mono;
use super::metering::{FrequencyAnalyser, FFT_SIZE};
use super::waveform;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use crossbeam_channel::{Receiver, Sender};
use std::collections::VecDeque;
use std::sync::Arc;

/// Shape of the interleaved samples a device delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Keeps an acquired microphone open; dropping it releases the device
pub trait InputGuard {
    fn device_name(&self) -> &str;
}

/// A microphone that has been opened and is streaming
pub struct AcquiredInput {
    pub format: InputFormat,
    /// Interleaved f32 chunks in arrival order
    pub samples: Receiver<Vec<f32>>,
    pub guard: Box<dyn InputGuard>,
}

/// Platform access to an exclusive microphone
pub trait MicrophoneSource {
    fn acquire(&mut self) -> Result<AcquiredInput, CaptureError>;
}

/// Errors raised by capture sessions
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Microphone access was denied")]
    PermissionDenied,

    #[error("No usable audio input device: {0}")]
    DeviceUnavailable(String),

    #[error("A capture session is already active")]
    SessionAlreadyActive,

    #[error("No capture session is active")]
    NoActiveSession,

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

/// Output of a completed capture
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub blob: AudioBlob,
    /// Fixed-length display waveform
    pub waveform: Vec<f32>,
}

struct ActiveCapture {
    guard: Box<dyn InputGuard>,
    samples: Receiver<Vec<f32>>,
    format: InputFormat,
    buffered: Vec<f32>,
    tap: VecDeque<f32>,
    history: Vec<f32>,
    encoder: Arc<dyn AudioEncoder>,
}

impl ActiveCapture {
    /// Move everything the device has delivered into the buffers
    fn drain_pending(&mut self) {
        while let Ok(chunk) = self.samples.try_recv() {
            let mono = mix_to_mono(&chunk, usize::from(self.format.channels));
            self.tap.extend(mono);
            let excess = self.tap.len().saturating_sub(FFT_SIZE);
            self.tap.drain(..excess);
            self.buffered.extend_from_slice(&chunk);
        }
    }
}

/// One microphone, one recording at a time
pub struct CaptureSession<M: MicrophoneSource> {
    source: M,
    encoders: EncoderRegistry,
    profile: RecordingProfile,
    analyser: FrequencyAnalyser,
    active: Option<ActiveCapture>,
}

impl<M: MicrophoneSource> CaptureSession<M> {
    pub fn new(source: M, encoders: EncoderRegistry, profile: RecordingProfile) -> Self {
        Self {
            source,
            encoders,
            profile,
            analyser: FrequencyAnalyser::new(),
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn profile(&self) -> RecordingProfile {
        self.profile
    }

    /// Takes effect from the next `start()`
    pub fn set_profile(&mut self, profile: RecordingProfile) {
        self.profile = profile;
    }

    /// Acquire the microphone and begin buffering
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.active.is_some() {
            tracing::warn!("Capture: start called while a session is active");
            return Err(CaptureError::SessionAlreadyActive);
        }

        let input = self.source.acquire()?;
        let encoder = self.encoders.negotiate(self.profile);

        tracing::info!(
            "Capture started: device='{}', {}Hz, {} channels, encoding={:?}",
            input.guard.device_name(),
            input.format.sample_rate,
            input.format.channels,
            encoder.encoding()
        );

        self.analyser.reset();
        self.active = Some(ActiveCapture {
            guard: input.guard,
            samples: input.samples,
            format: input.format,
            buffered: Vec::new(),
            tap: VecDeque::with_capacity(FFT_SIZE),
            history: Vec::new(),
            encoder,
        });
        Ok(())
    }

    /// Current loudness on a 0-100 scale, recorded into the waveform history
    ///
    /// Returns 0 when no session is active.
    pub fn sample_amplitude(&mut self) -> f32 {
        let Some(active) = self.active.as_mut() else {
            return 0.0;
        };
        active.drain_pending();

        let (front, back) = active.tap.as_slices();
        let frame = [front, back].concat();
        let level = self.analyser.loudness(&frame);
        active.history.push(level);
        level
    }

    /// Finish the recording, release the device and encode the audio
    pub fn stop(&mut self) -> Result<CaptureResult, CaptureError> {
        let mut active = self.active.take().ok_or(CaptureError::NoActiveSession)?;

        let device_name = active.guard.device_name().to_string();
        // Placeholder guard so the real one can be dropped before draining
        let guard = std::mem::replace(&mut active.guard, Box::new(ReleasedGuard));
        drop(guard);
        tracing::info!("Capture: released '{}'", device_name);

        active.drain_pending();

        let channels = usize::from(active.format.channels.max(1));
        let frames = active.buffered.len() / channels;
        let duration_seconds = frames as f64 / f64::from(active.format.sample_rate.max(1));

        let bytes = active.encoder.encode(&active.buffered, active.format)?;
        let blob = AudioBlob::new(bytes, active.encoder.encoding(), duration_seconds);
        let waveform = waveform::downsample(&active.history);

        tracing::info!(
            "Capture stopped: {:.1}s, {} bytes, {} amplitude readings",
            duration_seconds,
            blob.len(),
            active.history.len()
        );
        Ok(CaptureResult { blob, waveform })
    }

    /// Discard the recording and release the device; safe to call at any time
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(
                "Capture cancelled: discarding {} samples from '{}'",
                active.buffered.len(),
                active.guard.device_name()
            );
        }
    }
}

struct ReleasedGuard;

impl InputGuard for ReleasedGuard {
    fn device_name(&self) -> &str {
        "released"
    }
}

// =============================================================================
// cpal microphone
// =============================================================================

/// Microphone backed by the default cpal host
pub struct CpalMicrophone {
    device_name: Option<String>,
}

impl CpalMicrophone {
    /// `device_name` of `None` records from the system default input
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

struct CpalGuard {
    // Dropping the stream stops the callback and closes the device
    _stream: cpal::Stream,
    device_name: String,
}

impl InputGuard for CpalGuard {
    fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for CpalGuard {
    fn drop(&mut self) {
        tracing::debug!("Closing input stream on '{}'", self.device_name);
    }
}

impl MicrophoneSource for CpalMicrophone {
    fn acquire(&mut self) -> Result<AcquiredInput, CaptureError> {
        let device = recording_device(self.device_name.as_deref()).ok_or_else(|| {
            CaptureError::DeviceUnavailable("no input device found".to_string())
        })?;
        let device_name = device_display_name(&device);

        let supported = device.default_input_config().map_err(|e| match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(device_name.clone())
            }
            other => classify_backend_error(other.to_string()),
        })?;

        let format = InputFormat {
            sample_rate: supported.sample_rate().0,
            channels: supported.channels(),
        };
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let (tx, rx) = crossbeam_channel::unbounded();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_input_stream::<f32>(&device, &config, tx),
            cpal::SampleFormat::I16 => build_input_stream::<i16>(&device, &config, tx),
            cpal::SampleFormat::U16 => build_input_stream::<u16>(&device, &config, tx),
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(device_name.clone())
            }
            other => classify_backend_error(other.to_string()),
        })?;

        stream.play().map_err(|e| match e {
            cpal::PlayStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(device_name.clone())
            }
            other => classify_backend_error(other.to_string()),
        })?;

        Ok(AcquiredInput {
            format,
            samples: rx,
            guard: Box::new(CpalGuard {
                _stream: stream,
                device_name,
            }),
        })
    }
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tx: Sender<Vec<f32>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let chunk: Vec<f32> = data.iter().map(|&s| f32::from_sample(s)).collect();
            // Receiver gone means the session already ended
            let _ = tx.send(chunk);
        },
        |err| {
            tracing::error!("Audio input stream error: {}", err);
        },
        None,
    )
}

/// Backends report permission problems as free-form text
fn classify_backend_error(message: String) -> CaptureError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        tracing::warn!("Microphone permission denied: {}", message);
        CaptureError::PermissionDenied
    } else {
        tracing::warn!("Microphone unavailable: {}", message);
        CaptureError::DeviceUnavailable(message)
    }
}
