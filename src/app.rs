//! Application context
//!
//! Built once at start-up and passed by reference. It owns the only
//! recording controller and the only player.

use crate::api::{ApiError, HttpRecordingApi, Recording, RecordingApi};
use crate::audio::{
    AudioBlob, BlobRegistry, BlobUrl, CaptureSession, CpalMicrophone, EncoderRegistry, Encoding,
};
use crate::config::Config;
use crate::playback::{LocalSourceResolver, PlaybackController, RodioOutput};
use crate::recording::{RecordingController, RecordingStateMachine, SystemClock};

pub type LiveRecordingController =
    RecordingController<CpalMicrophone, HttpRecordingApi, SystemClock>;

pub type LivePlaybackController = PlaybackController<RodioOutput<LocalSourceResolver>>;

pub struct AppContext {
    pub config: Config,
    pub blobs: BlobRegistry,
    /// Client for browsing; the recording controller holds its own clone
    pub api: HttpRecordingApi,
    pub recording: LiveRecordingController,
    pub playback: LivePlaybackController,
}

impl AppContext {
    /// Wire up the live microphone, speaker and REST client
    ///
    /// No device is opened until recording or playback actually starts.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let blobs = BlobRegistry::new();
        let api = HttpRecordingApi::with_config(
            &config.api.base_url,
            config.api.timeout_secs,
            config.api.auth_token.clone(),
        )?;

        let capture = CaptureSession::new(
            CpalMicrophone::new(config.audio.device_name.clone()),
            EncoderRegistry::builtin(),
            config.audio.profile,
        );
        let machine = RecordingStateMachine::with_min_tags(
            blobs.clone(),
            config.recording.min_tags_for_upload,
        );
        let recording =
            RecordingController::new(machine, capture, api.clone(), SystemClock::default());

        let output = RodioOutput::new(LocalSourceResolver::new(blobs.clone()));
        let playback = PlaybackController::with_timing(
            output,
            config.playback.simulation_tick(),
            config.playback.restart_threshold_seconds,
        );

        tracing::info!("Application context ready (api: {})", api.base_url());
        Ok(Self {
            config,
            blobs,
            api,
            recording,
            playback,
        })
    }

    /// Make a remote recording playable locally
    ///
    /// Downloads the audio into the blob registry and returns a copy of the
    /// recording pointing at the local URL. Recordings without audio, or
    /// whose audio is already local, are returned unchanged.
    pub async fn prefetch(&self, recording: &Recording) -> Result<Recording, ApiError> {
        let Some(url) = recording.audio_url.as_deref() else {
            return Ok(recording.clone());
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Ok(recording.clone());
        }

        let bytes = self.api.fetch_audio(url).await?;
        let encoding = Encoding::from_extension(url).unwrap_or(Encoding::WavPcm16);
        let blob = AudioBlob::new(bytes, encoding, recording.duration_seconds);
        let local = self.blobs.create_url(blob);

        let mut playable = recording.clone();
        playable.audio_url = Some(local.to_string());
        Ok(playable)
    }

    /// Revoke the local URL issued by `prefetch`, if any
    pub fn release_prefetched(&self, recording: &Recording) {
        if let Some(url) = recording.audio_url.as_deref() {
            if let Some(local) = BlobUrl::parse(url) {
                self.blobs.revoke(&local);
            }
        }
    }
}
