//! Audio output behind the playback controller
//!
//! `AudioOutput` is the single process-wide speaker. The rodio backend plays
//! local blobs and files; anything it cannot open is reported as
//! `PlaybackUnavailable` so the controller can fall back to simulation.

use crate::audio::{BlobRegistry, BlobUrl};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Errors raised by audio outputs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("Playback unavailable: {0}")]
    PlaybackUnavailable(String),
}

/// Progress reported by an output, drained with `poll_events`
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Playback position, seconds
    TimeAdvanced { position: f64 },
    /// Length of the loaded source, seconds
    MetadataLoaded { duration: f64 },
    /// The loaded source played to the end
    Ended,
    /// The source stopped producing audio
    Failed { message: String },
}

/// A single audio output device
pub trait AudioOutput {
    /// Replace the current source. Loading never starts playback.
    fn load(&mut self, url: &str) -> Result<(), PlaybackError>;

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn seek(&mut self, position: f64) -> Result<(), PlaybackError>;

    /// Stop and drop the current source
    fn clear_source(&mut self);

    /// Events produced since the last poll, oldest first
    fn poll_events(&mut self) -> Vec<OutputEvent>;
}

/// Turns a playable URL into encoded audio bytes
pub trait SourceResolver {
    fn resolve(&self, url: &str) -> Result<Vec<u8>, PlaybackError>;
}

/// Resolves local preview blobs and files on disk
///
/// Remote URLs are not fetched here; callers prefetch them into the blob
/// registry and play the resulting `blob:` URL.
#[derive(Clone, Default)]
pub struct LocalSourceResolver {
    blobs: BlobRegistry,
}

impl LocalSourceResolver {
    pub fn new(blobs: BlobRegistry) -> Self {
        Self { blobs }
    }

    fn local_path(url: &str) -> Result<PathBuf, PlaybackError> {
        if url.starts_with("file:") {
            let parsed = Url::parse(url)
                .map_err(|e| PlaybackError::PlaybackUnavailable(format!("{}: {}", url, e)))?;
            return parsed.to_file_path().map_err(|_| {
                PlaybackError::PlaybackUnavailable(format!("{} is not a local path", url))
            });
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(PlaybackError::PlaybackUnavailable(format!(
                "remote source {} was not prefetched",
                url
            )));
        }
        Ok(PathBuf::from(url))
    }
}

impl SourceResolver for LocalSourceResolver {
    fn resolve(&self, url: &str) -> Result<Vec<u8>, PlaybackError> {
        if BlobUrl::is_blob_url(url) {
            return self
                .blobs
                .resolve(url)
                .map(|blob| blob.bytes().to_vec())
                .ok_or_else(|| PlaybackError::PlaybackUnavailable(format!("{} was revoked", url)));
        }

        let path = Self::local_path(url)?;
        std::fs::read(&path).map_err(|e| {
            PlaybackError::PlaybackUnavailable(format!("{}: {}", path.display(), e))
        })
    }
}

/// Speaker output through rodio
///
/// The output stream is opened on first load, so constructing this never
/// touches the audio device.
pub struct RodioOutput<R: SourceResolver> {
    resolver: R,
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    playing: bool,
    last_position: f64,
    events: Vec<OutputEvent>,
}

impl<R: SourceResolver> RodioOutput<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            stream: None,
            sink: None,
            playing: false,
            last_position: 0.0,
            events: Vec::new(),
        }
    }

    fn stream(&mut self) -> Result<&OutputStream, PlaybackError> {
        if self.stream.is_none() {
            let stream = OutputStreamBuilder::open_default_stream().map_err(|e| {
                PlaybackError::PlaybackUnavailable(format!("no output device: {}", e))
            })?;
            tracing::info!("Opened default audio output");
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| PlaybackError::PlaybackUnavailable("no output stream".to_string()))
    }
}

impl<R: SourceResolver> AudioOutput for RodioOutput<R> {
    fn load(&mut self, url: &str) -> Result<(), PlaybackError> {
        self.clear_source();

        let bytes = self.resolver.resolve(url)?;
        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| {
            PlaybackError::PlaybackUnavailable(format!("cannot decode {}: {}", url, e))
        })?;
        let total = decoder.total_duration();

        let sink = Sink::connect_new(self.stream()?.mixer());
        sink.pause();
        sink.append(decoder);
        self.sink = Some(sink);

        if let Some(total) = total {
            self.events.push(OutputEvent::MetadataLoaded {
                duration: total.as_secs_f64(),
            });
        }
        tracing::debug!("Loaded audio source {}", url);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| PlaybackError::PlaybackUnavailable("nothing loaded".to_string()))?;
        sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
    }

    fn seek(&mut self, position: f64) -> Result<(), PlaybackError> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| PlaybackError::PlaybackUnavailable("nothing loaded".to_string()))?;
        sink.try_seek(Duration::from_secs_f64(position.max(0.0)))
            .map_err(|e| PlaybackError::PlaybackUnavailable(format!("seek failed: {}", e)))?;
        self.last_position = position;
        Ok(())
    }

    fn clear_source(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.playing = false;
        self.last_position = 0.0;
        self.events.clear();
    }

    fn poll_events(&mut self) -> Vec<OutputEvent> {
        if let (Some(sink), true) = (&self.sink, self.playing) {
            let position = sink.get_pos().as_secs_f64();
            if (position - self.last_position).abs() > f64::EPSILON {
                self.last_position = position;
                self.events.push(OutputEvent::TimeAdvanced { position });
            }
            if sink.empty() {
                self.playing = false;
                self.events.push(OutputEvent::Ended);
            }
        }
        std::mem::take(&mut self.events)
    }
}
