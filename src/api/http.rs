//! reqwest client for the recordings service
//!
//! Uploads are sent once; a failed upload is reported back to the recording
//! flow, which leaves retrying to the user. Read-only requests retry
//! transient failures with exponential backoff.

use super::types::{NewRecording, Recording, RecordingFilter};
use super::{ApiError, RecordingApi};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Default timeout for API requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for read-only requests
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff in milliseconds
const BASE_RETRY_DELAY_MS: u64 = 100;

/// HTTP implementation of `RecordingApi`
#[derive(Debug, Clone)]
pub struct HttpRecordingApi {
    base_url: Url,
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpRecordingApi {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, ApiError> {
        Self::with_config(base_url, DEFAULT_TIMEOUT_SECS, auth_token)
    }

    /// Create a client with an explicit request timeout
    ///
    /// `base_url` is treated as a directory: `https://host/api` and
    /// `https://host/api/` both resolve `recordings` to `https://host/api/recordings`.
    pub fn with_config(
        base_url: &str,
        timeout_secs: u64,
        auth_token: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            client,
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn a non-2xx response into `ApiError::Status`
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(ApiError::Status { status, body })
    }

    /// Send a GET, retrying connection failures and 5xx responses
    async fn get_with_retry(
        &self,
        url: Url,
        authorized: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            let mut request = self.client.get(url.clone());
            if authorized {
                request = self.authorized(request);
            }

            let result = match request.send().await {
                Ok(response) => Self::check_status(response).await,
                Err(e) => Err(ApiError::Http(e)),
            };

            match result {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::debug!("GET {} succeeded on attempt {}", url, attempt + 1);
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!("GET {} attempt {} failed: {}", url, attempt + 1, e);
                    last_error = Some(e);
                    if attempt + 1 < MAX_RETRY_ATTEMPTS {
                        let delay = BASE_RETRY_DELAY_MS * 2u64.pow(attempt);
                        sleep(Duration::from_millis(delay)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::Decode("no attempts made".to_string())))
    }
}

fn upload_form(recording: NewRecording) -> Result<Form, ApiError> {
    let encoding = recording.audio.encoding();
    let audio = Part::bytes(recording.audio.bytes().to_vec())
        .file_name(format!("recording.{}", encoding.file_extension()))
        .mime_str(encoding.mime_type())?;

    let mut form = Form::new()
        .part("audio", audio)
        .text("movement", recording.movement.as_str().to_string())
        .text("durationSeconds", recording.duration_seconds.to_string())
        .text("tags", serde_json::to_string(&recording.tags)?)
        .text("waveform", serde_json::to_string(&recording.waveform)?);
    if let Some(title) = recording.title {
        form = form.text("title", title);
    }
    Ok(form)
}

impl RecordingApi for HttpRecordingApi {
    async fn create_recording(&self, recording: NewRecording) -> Result<Recording, ApiError> {
        let url = self.endpoint("recordings")?;
        tracing::info!(
            "Uploading {} recording ({} bytes, {} tags) to {}",
            recording.movement,
            recording.audio.len(),
            recording.tags.len(),
            url
        );

        let form = upload_form(recording)?;
        let response = self
            .authorized(self.client.post(url))
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let created: Recording = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        tracing::info!("Upload complete: recording {}", created.id);
        Ok(created)
    }

    async fn list_recordings(&self, filter: &RecordingFilter) -> Result<Vec<Recording>, ApiError> {
        let (path, query) = filter.path();
        let mut url = self.endpoint(path)?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }

        let response = self.get_with_retry(url, true).await?;
        let recordings: Vec<Recording> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        tracing::debug!("Fetched {} recordings for {:?}", recordings.len(), filter);
        Ok(recordings)
    }

    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        // Relative audio URLs are served by the API host
        let url = match Url::parse(url) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.endpoint(url.trim_start_matches('/'))?
            }
            Err(e) => return Err(e.into()),
        };

        let response = self.get_with_retry(url, false).await?;
        let bytes = response.bytes().await?;
        tracing::debug!("Fetched {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }
}
