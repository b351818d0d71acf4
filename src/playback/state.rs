//! Player state shared with every screen that can trigger playback

use crate::api::Recording;
use serde::Serialize;

/// What is playing and where in the queue it sits
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub current_item: Option<Recording>,
    pub is_playing: bool,
    /// Position in the current item, seconds
    pub current_time: f64,
    /// Length of the current item, seconds
    pub duration: f64,
    pub playlist: Vec<Recording>,
    pub current_index: usize,
}

impl PlayerState {
    /// Position as a percentage of the item length
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.playlist.len()
    }

    pub fn has_previous(&self) -> bool {
        self.current_index > 0
    }

    /// Whether `item` is the loaded item
    pub fn is_current(&self, item: &Recording) -> bool {
        self.current_item
            .as_ref()
            .is_some_and(|current| current.id == item.id)
    }
}

/// Which clock is advancing `current_time`
///
/// Exactly one driver is active; events from the other are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackDriver {
    /// Nothing loaded, or the loaded item has finished
    #[default]
    Idle,
    /// The audio output reports position
    Real,
    /// A fixed-step timer stands in for missing audio
    Simulated,
}
