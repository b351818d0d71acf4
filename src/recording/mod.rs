//! Recording flow for Tacet
//!
//! Movement selection, the timed capture, tagging and upload.

pub mod controller;
pub mod draft;
pub mod state;
pub mod timer;

pub use controller::{RecordingController, RecordingError, RecordingUpdate};
pub use draft::{RecordingDraft, TagError, TagSet, MAX_TAGS, MAX_TAG_LENGTH, MAX_TITLE_LENGTH};
pub use state::{
    RecordingEvent, RecordingPhase, RecordingStateMachine, TickEvent, TransitionReason,
    TransitionResult, DEFAULT_MIN_TAGS_FOR_UPLOAD,
};
pub use timer::{Clock, ElapsedTracker, ManualClock, SystemClock};
