//! Playback for Tacet
//!
//! One player per process: a "now playing" item, an ordered queue, and a
//! simulated fallback when there is no audio to play.

pub mod controller;
pub mod output;
pub mod state;

pub use controller::{
    PlaybackController, DEFAULT_RESTART_THRESHOLD_SECONDS, DEFAULT_SIMULATION_TICK,
};
pub use output::{
    AudioOutput, LocalSourceResolver, OutputEvent, PlaybackError, RodioOutput, SourceResolver,
};
pub use state::{PlaybackDriver, PlayerState};
