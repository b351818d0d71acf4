//! Audio subsystem for Tacet
//!
//! Microphone capture, loudness metering, waveform summaries, encodings and
//! the local blob URLs used to preview a take before upload.

pub mod blob;
pub mod capture;
pub mod device;
pub mod encoding;
pub mod format;
pub mod metering;
pub mod waveform;

pub use blob::{AudioBlob, BlobRegistry, BlobUrl};
pub use capture::{
    AcquiredInput, CaptureError, CaptureResult, CaptureSession, CpalMicrophone, InputFormat,
    InputGuard, MicrophoneSource,
};
pub use device::{list_input_devices, InputDevice};
pub use encoding::{AudioEncoder, Encoding, EncoderRegistry, RecordingProfile};
pub use metering::FrequencyAnalyser;
pub use waveform::{WAVEFORM_FLOOR, WAVEFORM_POINTS};
