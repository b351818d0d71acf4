//! Fakes shared by the integration tests.

#![allow(dead_code)]

use chrono::Utc;
use crossbeam_channel::Sender;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tacet_lib::api::{
    ApiError, NewRecording, Recording, RecordingApi, RecordingFilter, RecordingUser,
};
use tacet_lib::audio::{
    AcquiredInput, BlobRegistry, CaptureError, CaptureSession, EncoderRegistry, InputFormat,
    InputGuard, MicrophoneSource, RecordingProfile,
};
use tacet_lib::playback::{AudioOutput, OutputEvent, PlaybackError};
use tacet_lib::recording::{ManualClock, RecordingController, RecordingStateMachine};
use tacet_lib::Movement;

// =============================================================================
// Microphone
// =============================================================================

struct FakeGuard(Arc<AtomicUsize>);

impl InputGuard for FakeGuard {
    fn device_name(&self) -> &str {
        "fake microphone"
    }
}

impl Drop for FakeGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Microphone that counts how many handles to it are open
#[derive(Default)]
pub struct FakeMic {
    pub held: Arc<AtomicUsize>,
    pub sender: Option<Sender<Vec<f32>>>,
    pub deny: bool,
}

impl MicrophoneSource for FakeMic {
    fn acquire(&mut self) -> Result<AcquiredInput, CaptureError> {
        if self.deny {
            return Err(CaptureError::PermissionDenied);
        }
        let (tx, rx) = crossbeam_channel::unbounded();
        self.sender = Some(tx);
        self.held.fetch_add(1, Ordering::SeqCst);
        Ok(AcquiredInput {
            format: InputFormat {
                sample_rate: 8000,
                channels: 1,
            },
            samples: rx,
            guard: Box::new(FakeGuard(self.held.clone())),
        })
    }
}

// =============================================================================
// Recordings service
// =============================================================================

/// What the fake service has been asked to do
#[derive(Debug, Default)]
pub struct ApiLog {
    pub created: Vec<NewRecording>,
    pub fail_next: Option<u16>,
    /// The next create call never answers
    pub hang_next: bool,
}

/// In-memory recordings service; clones share the log
#[derive(Clone, Default)]
pub struct FakeApi {
    pub log: Rc<RefCell<ApiLog>>,
}

impl FakeApi {
    pub fn fail_next(&self, status: u16) {
        self.log.borrow_mut().fail_next = Some(status);
    }

    pub fn hang_next(&self) {
        self.log.borrow_mut().hang_next = true;
    }

    pub fn created_count(&self) -> usize {
        self.log.borrow().created.len()
    }
}

impl RecordingApi for FakeApi {
    async fn create_recording(&self, recording: NewRecording) -> Result<Recording, ApiError> {
        let hang = std::mem::take(&mut self.log.borrow_mut().hang_next);
        if hang {
            std::future::pending::<()>().await;
        }
        let mut log = self.log.borrow_mut();
        if let Some(status) = log.fail_next.take() {
            return Err(ApiError::Status {
                status,
                body: "unavailable".to_string(),
            });
        }
        let published = Recording {
            id: format!("rec-{}", log.created.len() + 1),
            user: RecordingUser {
                id: "me".to_string(),
                username: "me".to_string(),
            },
            movement: recording.movement,
            duration_seconds: recording.duration_seconds,
            audio_url: None,
            waveform_data: recording.waveform.clone(),
            tags: recording.tags.clone(),
            title: recording.title.clone(),
            like_count: 0,
            play_count: 0,
            created_at: Utc::now(),
        };
        log.created.push(recording);
        Ok(published)
    }

    async fn list_recordings(&self, _: &RecordingFilter) -> Result<Vec<Recording>, ApiError> {
        Ok(Vec::new())
    }

    async fn fetch_audio(&self, _: &str) -> Result<Vec<u8>, ApiError> {
        Ok(Vec::new())
    }
}

// =============================================================================
// Recording controller
// =============================================================================

pub type TestController = RecordingController<FakeMic, FakeApi, ManualClock>;

/// Everything a recording-flow test needs to drive and observe the controller
pub struct Harness {
    pub controller: TestController,
    pub clock: ManualClock,
    pub api: FakeApi,
    pub blobs: BlobRegistry,
    pub held: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        let mic = FakeMic::default();
        let held = mic.held.clone();
        let clock = ManualClock::new();
        let api = FakeApi::default();
        let blobs = BlobRegistry::new();

        let capture = CaptureSession::new(
            mic,
            EncoderRegistry::builtin(),
            RecordingProfile::HighFidelity,
        );
        let machine = RecordingStateMachine::new(blobs.clone());
        let controller = RecordingController::new(machine, capture, api.clone(), clock.clone());

        Self {
            controller,
            clock,
            api,
            blobs,
            held,
        }
    }

    pub fn microphones_held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }

    /// Advance the clock by `seconds` and deliver one timer callback
    pub fn tick_after(&mut self, seconds: f64) {
        self.clock.advance_secs(seconds);
        self.controller.on_timer_tick().expect("tick failed");
    }

    /// Record `movement` to completion in one late tick
    pub fn record_full(&mut self, movement: Movement) {
        self.controller.select_movement(movement).unwrap();
        self.controller.start_recording().unwrap();
        self.tick_after(movement.duration_secs_f64());
    }
}

// =============================================================================
// Audio output
// =============================================================================

/// Audio output whose behaviour each test scripts
#[derive(Default)]
pub struct ScriptedOutput {
    /// Refuse every load, forcing simulation
    pub unavailable: bool,
    pub loaded: Vec<String>,
    pub cleared: usize,
    pub seeks: Vec<f64>,
    pub pending: Vec<OutputEvent>,
}

impl ScriptedOutput {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }
}

impl AudioOutput for ScriptedOutput {
    fn load(&mut self, url: &str) -> Result<(), PlaybackError> {
        if self.unavailable {
            return Err(PlaybackError::PlaybackUnavailable(url.to_string()));
        }
        self.loaded.push(url.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, position: f64) -> Result<(), PlaybackError> {
        self.seeks.push(position);
        Ok(())
    }

    fn clear_source(&mut self) {
        self.cleared += 1;
    }

    fn poll_events(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// A queue item; `audio` selects whether it has a source to load
pub fn item(id: &str, seconds: f64, audio: bool) -> Recording {
    Recording {
        id: id.to_string(),
        user: RecordingUser {
            id: "listener".to_string(),
            username: "listener".to_string(),
        },
        movement: Movement::I,
        duration_seconds: seconds,
        audio_url: audio.then(|| format!("file:///tmp/{}.wav", id)),
        waveform_data: Vec::new(),
        tags: Vec::new(),
        title: None,
        like_count: 0,
        play_count: 0,
        created_at: Utc::now(),
    }
}
