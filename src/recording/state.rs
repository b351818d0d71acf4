//! Recording flow state machine
//!
//! Defines the phases a recording passes through, from choosing a movement
//! to uploading the tagged take. The machine is passive: it owns the draft
//! and reacts to events, while timers and devices are driven by the caller.

use super::draft::{normalize_title, RecordingDraft};
use crate::audio::{BlobRegistry, CaptureResult};
use crate::movement::Movement;
use serde::{Deserialize, Serialize};

/// Tags a draft needs before it may be uploaded
pub const DEFAULT_MIN_TAGS_FOR_UPLOAD: usize = 3;

/// Recording phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordingPhase {
    /// Choosing a movement
    #[default]
    Selecting,
    /// Movement chosen, waiting to start
    Ready,
    /// Microphone open, timer running
    Recording,
    /// Take finished, preview available
    Recorded,
    /// Editing tags and title before upload
    Tagging,
    /// Upload in flight
    Uploading,
}

impl RecordingPhase {
    /// Returns a human-readable description of the phase
    pub fn description(&self) -> &'static str {
        match self {
            RecordingPhase::Selecting => "Choose a movement",
            RecordingPhase::Ready => "Ready to record",
            RecordingPhase::Recording => "Recording",
            RecordingPhase::Recorded => "Recording complete",
            RecordingPhase::Tagging => "Tag what you heard",
            RecordingPhase::Uploading => "Uploading",
        }
    }

    /// Returns whether a recording in this phase can be cancelled
    pub fn is_cancellable(&self) -> bool {
        matches!(self, RecordingPhase::Recording)
    }

    /// Returns whether tags and title can be edited in this phase
    pub fn accepts_edits(&self) -> bool {
        matches!(self, RecordingPhase::Recorded | RecordingPhase::Tagging)
    }
}

/// One timer callback while recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEvent {
    /// Wall-clock seconds since recording started
    pub elapsed_seconds: f64,
    /// Loudness reading taken with this tick, 0-100
    pub amplitude: Option<f32>,
}

/// Events that can trigger phase transitions
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingEvent {
    SelectMovement(Movement),
    StartRecording,
    GoBack,
    Tick(TickEvent),
    Cancel,
    /// Tag text; rejected unless it passes `TagSet::validate`
    AddTag(String),
    RemoveTag(String),
    SetTitle(String),
    StartOver,
    GoToTags,
    Upload,
    UploadSucceeded,
    UploadFailed { message: String },
}

/// Reason for entering a phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    MovementSelected,
    MovementCleared,
    RecordingStarted,
    TimeAdvanced,
    /// Elapsed time reached the movement length
    DurationReached,
    UserCancellation,
    TagsChanged,
    TitleChanged,
    StartedOver,
    OpenedTags,
    ReturnedToReview,
    UploadStarted,
    UploadSucceeded,
    UploadFailed { message: String },
}

/// Result of a phase transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub previous: RecordingPhase,
    pub new_phase: RecordingPhase,
    pub reason: TransitionReason,
}

/// Recording state machine
///
/// Holds the only draft. Local preview URLs are issued through the blob
/// registry and revoked whenever the draft is replaced or discarded.
pub struct RecordingStateMachine {
    phase: RecordingPhase,
    draft: RecordingDraft,
    /// Seconds recorded so far, as reported by the last accepted tick
    elapsed_seconds: f64,
    min_tags_for_upload: usize,
    blobs: BlobRegistry,
}

impl RecordingStateMachine {
    /// Creates a new state machine in the Selecting phase
    pub fn new(blobs: BlobRegistry) -> Self {
        Self::with_min_tags(blobs, DEFAULT_MIN_TAGS_FOR_UPLOAD)
    }

    pub fn with_min_tags(blobs: BlobRegistry, min_tags_for_upload: usize) -> Self {
        Self {
            phase: RecordingPhase::Selecting,
            draft: RecordingDraft::default(),
            elapsed_seconds: 0.0,
            min_tags_for_upload,
            blobs,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    pub fn draft(&self) -> &RecordingDraft {
        &self.draft
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn min_tags_for_upload(&self) -> usize {
        self.min_tags_for_upload
    }

    /// Percentage of the movement recorded, 0-100
    pub fn progress(&self) -> f64 {
        match self.draft.movement {
            Some(movement) => {
                (self.elapsed_seconds / movement.duration_secs_f64() * 100.0).min(100.0)
            }
            None => 0.0,
        }
    }

    /// Seconds left in the movement, never negative
    pub fn remaining(&self) -> f64 {
        match self.draft.movement {
            Some(movement) => (movement.duration_secs_f64() - self.elapsed_seconds).max(0.0),
            None => 0.0,
        }
    }

    /// Whether the draft has enough tags to be uploaded
    pub fn can_upload(&self) -> bool {
        self.draft.tags.len() >= self.min_tags_for_upload
    }

    /// Process an event and return the transition result if a transition occurred
    ///
    /// Returns `None` if the event is not valid for the current phase.
    pub fn process_event(&mut self, event: RecordingEvent) -> Option<TransitionResult> {
        use RecordingEvent as E;
        use RecordingPhase as P;

        let (new_phase, reason) = match (self.phase, event) {
            // SELECTING
            (P::Selecting, E::SelectMovement(movement)) => {
                self.draft.movement = Some(movement);
                (P::Ready, TransitionReason::MovementSelected)
            }

            // READY
            (P::Ready, E::StartRecording) => {
                self.elapsed_seconds = 0.0;
                self.draft.waveform.clear();
                (P::Recording, TransitionReason::RecordingStarted)
            }
            (P::Ready, E::GoBack) => {
                self.draft.movement = None;
                (P::Selecting, TransitionReason::MovementCleared)
            }

            // RECORDING
            (P::Recording, E::Tick(tick)) => {
                // Stale or duplicate ticks never move time backwards or re-trigger completion
                if tick.elapsed_seconds.is_nan() || tick.elapsed_seconds <= self.elapsed_seconds {
                    tracing::debug!(
                        "Ignoring non-monotonic tick: {:.3}s after {:.3}s",
                        tick.elapsed_seconds,
                        self.elapsed_seconds
                    );
                    return None;
                }
                self.elapsed_seconds = tick.elapsed_seconds;
                if let Some(amplitude) = tick.amplitude {
                    self.draft.waveform.push(amplitude);
                }

                let duration = self
                    .draft
                    .movement
                    .map(|m| m.duration_secs_f64())
                    .unwrap_or(0.0);
                if self.elapsed_seconds >= duration {
                    (P::Recorded, TransitionReason::DurationReached)
                } else {
                    (P::Recording, TransitionReason::TimeAdvanced)
                }
            }
            (P::Recording, E::Cancel) => {
                self.discard_draft();
                (P::Selecting, TransitionReason::UserCancellation)
            }

            // RECORDED and TAGGING share the edit operations
            (phase, E::AddTag(raw)) if phase.accepts_edits() => {
                if let Err(e) = self.draft.tags.add(&raw) {
                    tracing::debug!("Tag '{}' rejected: {}", raw, e);
                    return None;
                }
                (phase, TransitionReason::TagsChanged)
            }
            (phase, E::RemoveTag(raw)) if phase.accepts_edits() => {
                if !self.draft.tags.remove(&raw) {
                    return None;
                }
                (phase, TransitionReason::TagsChanged)
            }
            (phase, E::SetTitle(raw)) if phase.accepts_edits() => {
                self.draft.title = normalize_title(&raw);
                (phase, TransitionReason::TitleChanged)
            }

            (P::Recorded, E::StartOver) => {
                self.discard_draft();
                (P::Selecting, TransitionReason::StartedOver)
            }
            (P::Recorded, E::GoToTags) => (P::Tagging, TransitionReason::OpenedTags),

            // TAGGING
            (P::Tagging, E::GoBack) => (P::Recorded, TransitionReason::ReturnedToReview),
            (P::Tagging, E::Upload) => {
                if !self.can_upload() {
                    tracing::debug!(
                        "Upload rejected: {} of {} required tags",
                        self.draft.tags.len(),
                        self.min_tags_for_upload
                    );
                    return None;
                }
                (P::Uploading, TransitionReason::UploadStarted)
            }

            // UPLOADING
            (P::Uploading, E::UploadSucceeded) => {
                self.discard_draft();
                (P::Selecting, TransitionReason::UploadSucceeded)
            }
            (P::Uploading, E::UploadFailed { message }) => {
                (P::Tagging, TransitionReason::UploadFailed { message })
            }

            // Invalid transitions
            _ => return None,
        };

        let result = TransitionResult {
            previous: self.phase,
            new_phase,
            reason,
        };
        self.apply_transition(&result);
        Some(result)
    }

    fn apply_transition(&mut self, result: &TransitionResult) {
        self.phase = result.new_phase;

        if result.previous == result.new_phase {
            tracing::trace!(
                "Recording phase {:?} updated (reason: {:?})",
                result.new_phase,
                result.reason
            );
        } else {
            tracing::info!(
                "Recording phase transition: {:?} -> {:?} (reason: {:?})",
                result.previous,
                result.new_phase,
                result.reason
            );
        }
    }

    /// Store a finished capture in the draft and issue its preview URL
    ///
    /// Only valid in Recorded; returns false otherwise.
    pub fn attach_capture(&mut self, capture: CaptureResult) -> bool {
        if self.phase != RecordingPhase::Recorded {
            tracing::warn!("Discarding capture delivered in phase {:?}", self.phase);
            return false;
        }

        self.revoke_preview();
        self.draft.preview_url = Some(self.blobs.create_url(capture.blob.clone()));
        self.draft.audio = Some(capture.blob);
        self.draft.waveform = capture.waveform;
        true
    }

    fn revoke_preview(&mut self) {
        if let Some(url) = self.draft.preview_url.take() {
            self.blobs.revoke(&url);
        }
    }

    fn discard_draft(&mut self) {
        self.revoke_preview();
        self.draft = RecordingDraft::default();
        self.elapsed_seconds = 0.0;
    }

    /// Reset the state machine to Selecting, discarding the draft
    pub fn reset(&mut self) {
        self.discard_draft();
        self.phase = RecordingPhase::Selecting;
        tracing::info!("Recording state machine reset to Selecting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioBlob, Encoding};

    fn tick(elapsed_seconds: f64) -> RecordingEvent {
        RecordingEvent::Tick(TickEvent {
            elapsed_seconds,
            amplitude: Some(40.0),
        })
    }

    fn capture() -> CaptureResult {
        CaptureResult {
            blob: AudioBlob::new(vec![0; 16], Encoding::WavPcm16, 30.0),
            waveform: vec![10.0; 50],
        }
    }

    fn recorded_machine(blobs: &BlobRegistry) -> RecordingStateMachine {
        let mut sm = RecordingStateMachine::new(blobs.clone());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);
        sm.process_event(tick(30.0));
        assert!(sm.attach_capture(capture()));
        sm
    }

    #[test]
    fn test_initial_phase_is_selecting() {
        let sm = RecordingStateMachine::new(BlobRegistry::new());
        assert_eq!(sm.phase(), RecordingPhase::Selecting);
        assert!(sm.draft().movement.is_none());
        assert_eq!(sm.progress(), 0.0);
    }

    #[test]
    fn test_start_resets_elapsed_and_waveform() {
        for movement in Movement::ALL {
            let mut sm = RecordingStateMachine::new(BlobRegistry::new());
            sm.process_event(RecordingEvent::SelectMovement(movement));
            let result = sm.process_event(RecordingEvent::StartRecording).unwrap();

            assert_eq!(result.previous, RecordingPhase::Ready);
            assert_eq!(sm.phase(), RecordingPhase::Recording);
            assert_eq!(sm.elapsed_seconds(), 0.0);
            assert!(sm.draft().waveform.is_empty());
        }
    }

    #[test]
    fn test_go_back_clears_movement() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::II));
        let result = sm.process_event(RecordingEvent::GoBack).unwrap();

        assert_eq!(result.new_phase, RecordingPhase::Selecting);
        assert!(sm.draft().movement.is_none());
    }

    #[test]
    fn test_ticks_update_progress() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);

        let result = sm.process_event(tick(15.0)).unwrap();
        assert_eq!(result.reason, TransitionReason::TimeAdvanced);
        assert_eq!(sm.progress(), 50.0);
        assert_eq!(sm.remaining(), 15.0);
        assert_eq!(sm.draft().waveform, vec![40.0]);
    }

    #[test]
    fn test_tick_without_amplitude_keeps_waveform() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);
        sm.process_event(RecordingEvent::Tick(TickEvent {
            elapsed_seconds: 1.0,
            amplitude: None,
        }));
        assert_eq!(sm.elapsed_seconds(), 1.0);
        assert!(sm.draft().waveform.is_empty());
    }

    #[test]
    fn test_duration_reached_transitions_once() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);

        let result = sm.process_event(tick(31.2)).unwrap();
        assert_eq!(result.new_phase, RecordingPhase::Recorded);
        assert_eq!(result.reason, TransitionReason::DurationReached);
        assert_eq!(sm.progress(), 100.0);
        assert_eq!(sm.remaining(), 0.0);

        assert!(sm.process_event(tick(32.0)).is_none());
        assert_eq!(sm.phase(), RecordingPhase::Recorded);
    }

    #[test]
    fn test_non_monotonic_ticks_are_ignored() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);

        assert!(sm.process_event(tick(0.0)).is_none());
        sm.process_event(tick(5.0));
        assert!(sm.process_event(tick(5.0)).is_none());
        assert!(sm.process_event(tick(3.0)).is_none());
        assert!(sm.process_event(tick(f64::NAN)).is_none());
        assert_eq!(sm.elapsed_seconds(), 5.0);
        assert_eq!(sm.draft().waveform.len(), 1);
    }

    #[test]
    fn test_tick_outside_recording_is_ignored() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        assert!(sm.process_event(tick(1.0)).is_none());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        assert!(sm.process_event(tick(1.0)).is_none());
        assert_eq!(sm.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_cancel_returns_to_selecting() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::III));
        sm.process_event(RecordingEvent::StartRecording);
        sm.process_event(tick(10.0));

        let result = sm.process_event(RecordingEvent::Cancel).unwrap();
        assert_eq!(result.reason, TransitionReason::UserCancellation);
        assert_eq!(sm.phase(), RecordingPhase::Selecting);
        assert_eq!(sm.elapsed_seconds(), 0.0);
        assert!(sm.draft().movement.is_none());

        assert!(sm.process_event(tick(11.0)).is_none());
        assert_eq!(sm.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_attach_capture_issues_preview() {
        let blobs = BlobRegistry::new();
        let sm = recorded_machine(&blobs);

        let url = sm.draft().preview_url.clone().unwrap();
        assert!(blobs.resolve(url.as_str()).is_some());
        assert_eq!(sm.draft().waveform.len(), 50);
        assert!(sm.draft().audio.is_some());
    }

    #[test]
    fn test_attach_capture_replaces_previous_preview() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        let first = sm.draft().preview_url.clone().unwrap();

        sm.attach_capture(capture());
        assert!(blobs.resolve(first.as_str()).is_none());
        assert_eq!(blobs.live_count(), 1);
    }

    #[test]
    fn test_attach_capture_outside_recorded_is_rejected() {
        let blobs = BlobRegistry::new();
        let mut sm = RecordingStateMachine::new(blobs.clone());
        assert!(!sm.attach_capture(capture()));
        assert_eq!(blobs.live_count(), 0);
    }

    #[test]
    fn test_start_over_revokes_preview() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.process_event(RecordingEvent::AddTag("hum".to_string()));

        let result = sm.process_event(RecordingEvent::StartOver).unwrap();
        assert_eq!(result.new_phase, RecordingPhase::Selecting);
        assert_eq!(blobs.live_count(), 0);
        assert!(sm.draft().tags.is_empty());
        assert!(sm.draft().audio.is_none());
    }

    #[test]
    fn test_repeated_record_discard_cycles_do_not_leak() {
        let blobs = BlobRegistry::new();
        let mut sm = RecordingStateMachine::new(blobs.clone());
        for _ in 0..5 {
            sm.process_event(RecordingEvent::SelectMovement(Movement::I));
            sm.process_event(RecordingEvent::StartRecording);
            sm.process_event(tick(30.0));
            sm.attach_capture(capture());
            assert_eq!(blobs.live_count(), 1);
            sm.process_event(RecordingEvent::StartOver);
        }
        assert_eq!(blobs.live_count(), 0);
    }

    #[test]
    fn test_tag_edits_in_recorded_and_tagging() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);

        let result = sm
            .process_event(RecordingEvent::AddTag("#Fridge".to_string()))
            .unwrap();
        assert_eq!(result.new_phase, RecordingPhase::Recorded);
        assert!(sm.process_event(RecordingEvent::AddTag("FRIDGE".to_string())).is_none());

        sm.process_event(RecordingEvent::GoToTags);
        sm.process_event(RecordingEvent::AddTag("birds".to_string()));
        assert!(sm.process_event(RecordingEvent::RemoveTag("fridge".to_string())).is_some());
        assert!(sm.process_event(RecordingEvent::RemoveTag("fridge".to_string())).is_none());
        assert_eq!(sm.draft().tags.as_slice(), ["birds".to_string()]);
        assert_eq!(sm.phase(), RecordingPhase::Tagging);
    }

    #[test]
    fn test_tag_edits_rejected_while_recording() {
        let mut sm = RecordingStateMachine::new(BlobRegistry::new());
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);
        assert!(sm.process_event(RecordingEvent::AddTag("hum".to_string())).is_none());
        assert!(sm.draft().tags.is_empty());
    }

    #[test]
    fn test_set_title() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.process_event(RecordingEvent::SetTitle("  Kitchen at night ".to_string()));
        assert_eq!(sm.draft().title.as_deref(), Some("Kitchen at night"));
        sm.process_event(RecordingEvent::SetTitle(" ".to_string()));
        assert!(sm.draft().title.is_none());
    }

    #[test]
    fn test_upload_gate() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.process_event(RecordingEvent::GoToTags);
        sm.process_event(RecordingEvent::AddTag("a".to_string()));
        sm.process_event(RecordingEvent::AddTag("b".to_string()));

        assert!(sm.process_event(RecordingEvent::Upload).is_none());
        assert_eq!(sm.phase(), RecordingPhase::Tagging);

        sm.process_event(RecordingEvent::AddTag("c".to_string()));
        let result = sm.process_event(RecordingEvent::Upload).unwrap();
        assert_eq!(result.new_phase, RecordingPhase::Uploading);
    }

    #[test]
    fn test_upload_not_allowed_from_recorded() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        for t in ["a", "b", "c"] {
            sm.process_event(RecordingEvent::AddTag(t.to_string()));
        }
        assert!(sm.process_event(RecordingEvent::Upload).is_none());
    }

    #[test]
    fn test_upload_failure_keeps_draft() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.process_event(RecordingEvent::GoToTags);
        for t in ["a", "b", "c"] {
            sm.process_event(RecordingEvent::AddTag(t.to_string()));
        }
        sm.process_event(RecordingEvent::Upload);

        let result = sm
            .process_event(RecordingEvent::UploadFailed {
                message: "503".to_string(),
            })
            .unwrap();
        assert_eq!(result.new_phase, RecordingPhase::Tagging);
        assert!(matches!(result.reason, TransitionReason::UploadFailed { .. }));
        assert_eq!(sm.draft().tags.len(), 3);
        assert!(sm.draft().audio.is_some());
        assert_eq!(blobs.live_count(), 1);
    }

    #[test]
    fn test_upload_success_resets() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.process_event(RecordingEvent::GoToTags);
        for t in ["a", "b", "c"] {
            sm.process_event(RecordingEvent::AddTag(t.to_string()));
        }
        sm.process_event(RecordingEvent::Upload);
        sm.process_event(RecordingEvent::UploadSucceeded);

        assert_eq!(sm.phase(), RecordingPhase::Selecting);
        assert!(sm.draft().movement.is_none());
        assert_eq!(blobs.live_count(), 0);
    }

    #[test]
    fn test_custom_min_tags() {
        let blobs = BlobRegistry::new();
        let mut sm = RecordingStateMachine::with_min_tags(blobs.clone(), 1);
        sm.process_event(RecordingEvent::SelectMovement(Movement::I));
        sm.process_event(RecordingEvent::StartRecording);
        sm.process_event(tick(30.0));
        sm.process_event(RecordingEvent::GoToTags);
        sm.process_event(RecordingEvent::AddTag("solo".to_string()));
        assert!(sm.process_event(RecordingEvent::Upload).is_some());
    }

    #[test]
    fn test_go_back_from_tagging() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.process_event(RecordingEvent::GoToTags);
        let result = sm.process_event(RecordingEvent::GoBack).unwrap();
        assert_eq!(result.new_phase, RecordingPhase::Recorded);
    }

    #[test]
    fn test_reset() {
        let blobs = BlobRegistry::new();
        let mut sm = recorded_machine(&blobs);
        sm.reset();
        assert_eq!(sm.phase(), RecordingPhase::Selecting);
        assert_eq!(blobs.live_count(), 0);
    }

    #[test]
    fn test_phase_descriptions() {
        assert_eq!(RecordingPhase::Selecting.description(), "Choose a movement");
        assert_eq!(RecordingPhase::Recorded.description(), "Recording complete");
    }

    #[test]
    fn test_cancellable_phases() {
        assert!(!RecordingPhase::Selecting.is_cancellable());
        assert!(!RecordingPhase::Ready.is_cancellable());
        assert!(RecordingPhase::Recording.is_cancellable());
        assert!(!RecordingPhase::Recorded.is_cancellable());
        assert!(!RecordingPhase::Tagging.is_cancellable());
        assert!(!RecordingPhase::Uploading.is_cancellable());
    }

    #[test]
    fn test_phase_serialization() {
        assert_eq!(
            serde_json::to_string(&RecordingPhase::Uploading).unwrap(),
            "\"uploading\""
        );
    }
}
