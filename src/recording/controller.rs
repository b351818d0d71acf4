//! Recording controller
//!
//! Drives the recording state machine from user actions and an external
//! interval timer, and coordinates the capture session, elapsed tracker and
//! upload service around it.

use super::draft::{RecordingDraft, TagError};
use super::state::{
    RecordingEvent, RecordingPhase, RecordingStateMachine, TickEvent, TransitionReason,
    TransitionResult,
};
use super::timer::{Clock, ElapsedTracker};
use crate::api::{ApiError, NewRecording, Recording, RecordingApi};
use crate::audio::{CaptureError, CaptureSession, MicrophoneSource};
use crate::movement::Movement;
use crate::observer::{Subscribers, SubscriptionId};
use serde::Serialize;

/// Errors surfaced by recording operations
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Cannot {action} in phase '{}'", .phase.description())]
    InvalidTransition {
        action: &'static str,
        phase: RecordingPhase,
    },

    #[error("Upload needs at least {required} tags, found {found}")]
    NotEnoughTags { required: usize, found: usize },

    #[error("No audio has been recorded")]
    NoAudio,

    #[error("Upload failed: {0}")]
    UploadFailed(#[source] ApiError),

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Snapshot delivered to subscribers after every change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingUpdate {
    pub phase: RecordingPhase,
    pub movement: Option<Movement>,
    pub elapsed_seconds: f64,
    pub progress: f64,
    pub remaining_seconds: f64,
    pub waveform: Vec<f32>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub preview_url: Option<String>,
    pub can_upload: bool,
    pub last_error: Option<String>,
}

/// Recording controller
///
/// One per application. The caller owns the interval timer: it should call
/// `on_timer_tick` while `is_timer_running()` is true.
pub struct RecordingController<M: MicrophoneSource, A: RecordingApi, C: Clock> {
    machine: RecordingStateMachine,
    capture: CaptureSession<M>,
    tracker: ElapsedTracker,
    clock: C,
    api: A,
    subscribers: Subscribers<RecordingUpdate>,
    last_error: Option<String>,
}

impl<M: MicrophoneSource, A: RecordingApi, C: Clock> RecordingController<M, A, C> {
    pub fn new(
        machine: RecordingStateMachine,
        capture: CaptureSession<M>,
        api: A,
        clock: C,
    ) -> Self {
        Self {
            machine,
            capture,
            tracker: ElapsedTracker::new(),
            clock,
            api,
            subscribers: Subscribers::new(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        self.machine.phase()
    }

    pub fn draft(&self) -> &RecordingDraft {
        self.machine.draft()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.machine.elapsed_seconds()
    }

    pub fn progress(&self) -> f64 {
        self.machine.progress()
    }

    pub fn remaining(&self) -> f64 {
        self.machine.remaining()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn capture(&self) -> &CaptureSession<M> {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut CaptureSession<M> {
        &mut self.capture
    }

    /// Whether the caller's interval timer should keep firing
    pub fn is_timer_running(&self) -> bool {
        self.tracker.is_running()
    }

    pub fn snapshot(&self) -> RecordingUpdate {
        let draft = self.machine.draft();
        RecordingUpdate {
            phase: self.machine.phase(),
            movement: draft.movement,
            elapsed_seconds: self.machine.elapsed_seconds(),
            progress: self.machine.progress(),
            remaining_seconds: self.machine.remaining(),
            waveform: draft.waveform.clone(),
            tags: draft.tags.as_slice().to_vec(),
            title: draft.title.clone(),
            preview_url: draft.preview_url.as_ref().map(|u| u.as_str().to_string()),
            can_upload: self.machine.can_upload(),
            last_error: self.last_error.clone(),
        }
    }

    /// Register for a snapshot after every change
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&RecordingUpdate) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify(&mut self) {
        let update = self.snapshot();
        self.subscribers.notify(&update);
    }

    /// Feed an event, mapping a rejection to `InvalidTransition`
    fn apply(
        &mut self,
        action: &'static str,
        event: RecordingEvent,
    ) -> Result<TransitionResult, RecordingError> {
        let phase = self.machine.phase();
        match self.machine.process_event(event) {
            Some(result) => {
                self.notify();
                Ok(result)
            }
            None => {
                tracing::debug!("Rejected '{}' in phase {:?}", action, phase);
                Err(RecordingError::InvalidTransition { action, phase })
            }
        }
    }

    fn require_phase(
        &self,
        action: &'static str,
        allowed: impl Fn(RecordingPhase) -> bool,
    ) -> Result<(), RecordingError> {
        let phase = self.machine.phase();
        if allowed(phase) {
            Ok(())
        } else {
            Err(RecordingError::InvalidTransition { action, phase })
        }
    }

    fn fail(&mut self, error: &RecordingError) {
        tracing::error!("Recording error: {}", error);
        self.last_error = Some(error.to_string());
        self.notify();
    }

    pub fn select_movement(&mut self, movement: Movement) -> Result<(), RecordingError> {
        self.last_error = None;
        self.apply("select a movement", RecordingEvent::SelectMovement(movement))?;
        Ok(())
    }

    /// Back out of Ready or Tagging
    pub fn go_back(&mut self) -> Result<(), RecordingError> {
        self.apply("go back", RecordingEvent::GoBack)?;
        Ok(())
    }

    /// Open the microphone and start the elapsed clock
    ///
    /// If the device cannot be acquired the phase stays Ready and the error
    /// is returned and recorded in `last_error`.
    pub fn start_recording(&mut self) -> Result<(), RecordingError> {
        self.require_phase("start recording", |p| p == RecordingPhase::Ready)?;

        if let Err(e) = self.capture.start() {
            let error = RecordingError::from(e);
            self.fail(&error);
            return Err(error);
        }

        self.last_error = None;
        self.tracker.start(self.clock.now());
        if let Err(e) = self.apply("start recording", RecordingEvent::StartRecording) {
            self.tracker.stop();
            self.capture.cancel();
            return Err(e);
        }
        Ok(())
    }

    /// Handle one interval-timer callback
    ///
    /// Returns the transition the tick caused, or `None` if the timer is not
    /// running or the tick was stale. When the movement length is reached
    /// the clock stops before this returns and the capture is finalised.
    pub fn on_timer_tick(&mut self) -> Result<Option<TransitionResult>, RecordingError> {
        let Some(elapsed_seconds) = self.tracker.elapsed(self.clock.now()) else {
            return Ok(None);
        };
        let amplitude = self.capture.sample_amplitude();

        let Some(result) = self.machine.process_event(RecordingEvent::Tick(TickEvent {
            elapsed_seconds,
            amplitude: Some(amplitude),
        })) else {
            return Ok(None);
        };

        if result.reason == TransitionReason::DurationReached {
            self.tracker.stop();
            match self.capture.stop() {
                Ok(capture) => {
                    self.machine.attach_capture(capture);
                }
                Err(e) => {
                    // Nothing usable was recorded; the user starts over
                    self.machine.reset();
                    let error = RecordingError::from(e);
                    self.fail(&error);
                    return Err(error);
                }
            }
        }

        self.notify();
        Ok(Some(result))
    }

    /// Abandon the recording in progress
    ///
    /// The clock is stopped and the microphone released before this returns,
    /// whatever the current phase.
    pub fn cancel_recording(&mut self) -> Result<(), RecordingError> {
        self.tracker.stop();
        self.capture.cancel();
        self.apply("cancel", RecordingEvent::Cancel)?;
        Ok(())
    }

    /// Add a tag, returning its normalised form
    pub fn add_tag(&mut self, raw: &str) -> Result<String, RecordingError> {
        self.require_phase("edit tags", |p| p.accepts_edits())?;
        let tag = self.machine.draft().tags.validate(raw)?;
        self.apply("edit tags", RecordingEvent::AddTag(tag.clone()))?;
        Ok(tag)
    }

    /// Remove a tag. Returns false if it was not present.
    pub fn remove_tag(&mut self, raw: &str) -> Result<bool, RecordingError> {
        self.require_phase("edit tags", |p| p.accepts_edits())?;
        if !self.machine.draft().tags.contains(raw) {
            return Ok(false);
        }
        self.apply("edit tags", RecordingEvent::RemoveTag(raw.to_string()))?;
        Ok(true)
    }

    pub fn set_title(&mut self, raw: &str) -> Result<(), RecordingError> {
        self.apply("set the title", RecordingEvent::SetTitle(raw.to_string()))?;
        Ok(())
    }

    /// Discard the finished take and return to movement selection
    pub fn start_over(&mut self) -> Result<(), RecordingError> {
        self.last_error = None;
        self.apply("start over", RecordingEvent::StartOver)?;
        Ok(())
    }

    pub fn go_to_tags(&mut self) -> Result<(), RecordingError> {
        self.apply("open tags", RecordingEvent::GoToTags)?;
        Ok(())
    }

    /// Publish the draft
    ///
    /// On success the draft is discarded and the flow returns to Selecting.
    /// On failure the flow returns to Tagging with the draft intact so the
    /// user can retry. Dropping the future before the service answers (a
    /// timeout, an aborted task) also returns to Tagging; subscribers see
    /// that on the next change.
    pub async fn upload(&mut self) -> Result<Recording, RecordingError> {
        self.require_phase("upload", |p| p == RecordingPhase::Tagging)?;

        let draft = self.machine.draft();
        let required = self.machine.min_tags_for_upload();
        if draft.tags.len() < required {
            return Err(RecordingError::NotEnoughTags {
                required,
                found: draft.tags.len(),
            });
        }
        let (Some(audio), Some(movement)) = (draft.audio.clone(), draft.movement) else {
            return Err(RecordingError::NoAudio);
        };
        let request = NewRecording {
            audio,
            movement,
            duration_seconds: movement.duration_secs_f64(),
            tags: draft.tags.as_slice().to_vec(),
            waveform: draft.waveform.clone(),
            title: draft.title.clone(),
        };

        self.last_error = None;
        self.apply("upload", RecordingEvent::Upload)?;

        let outcome = {
            let mut in_flight = InFlightUpload {
                machine: &mut self.machine,
                last_error: &mut self.last_error,
                settled: false,
            };
            let outcome = self.api.create_recording(request).await;
            in_flight.settled = true;
            outcome
        };

        match outcome {
            Ok(recording) => {
                self.apply("finish upload", RecordingEvent::UploadSucceeded)?;
                Ok(recording)
            }
            Err(e) => {
                let message = e.to_string();
                self.last_error = Some(message.clone());
                tracing::warn!("Upload failed, draft kept for retry: {}", message);
                self.apply("finish upload", RecordingEvent::UploadFailed { message })?;
                Err(RecordingError::UploadFailed(e))
            }
        }
    }
}

/// Sends an abandoned upload back to Tagging when dropped unsettled
struct InFlightUpload<'a> {
    machine: &'a mut RecordingStateMachine,
    last_error: &'a mut Option<String>,
    settled: bool,
}

impl Drop for InFlightUpload<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let message = "Upload was interrupted before the server answered".to_string();
        tracing::warn!("{}, draft kept for retry", message);
        *self.last_error = Some(message.clone());
        self.machine.process_event(RecordingEvent::UploadFailed { message });
    }
}
