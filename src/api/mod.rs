//! Recordings service collaborator
//!
//! The recording flow hands finished drafts to a `RecordingApi`; browsing
//! and remote playback read through the same trait.

pub mod http;
pub mod types;

pub use http::HttpRecordingApi;
pub use types::{NewRecording, Recording, RecordingFilter, RecordingUser};

/// Error types for recordings service operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether repeating the same request might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect(),
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Operations the app needs from the recordings service
#[allow(async_fn_in_trait)]
pub trait RecordingApi {
    /// Publish a finished recording
    async fn create_recording(&self, recording: NewRecording) -> Result<Recording, ApiError>;

    async fn list_recordings(&self, filter: &RecordingFilter) -> Result<Vec<Recording>, ApiError>;

    /// Download the audio behind a recording's `audio_url`
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}
