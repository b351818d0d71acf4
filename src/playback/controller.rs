//! Playback controller
//!
//! Owns the player state and the one audio output. Items without a playable
//! source are "played" by a fixed-step simulation so the player behaves the
//! same with or without real audio.

use super::output::{AudioOutput, OutputEvent, PlaybackError};
use super::state::{PlaybackDriver, PlayerState};
use crate::api::Recording;
use crate::observer::{Subscribers, SubscriptionId};
use std::time::Duration;

/// Interval between simulated playback ticks
pub const DEFAULT_SIMULATION_TICK: Duration = Duration::from_millis(100);

/// Seconds into an item after which `previous` restarts it
pub const DEFAULT_RESTART_THRESHOLD_SECONDS: f64 = 3.0;

/// Tolerance for accumulated simulation steps reaching the end
const END_EPSILON: f64 = 1e-6;

/// Playback controller
///
/// The caller drives two timers: `poll_output` while the real output is
/// active, and `tick_simulation` every `simulation_tick()` while
/// `is_simulating()` is true.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    state: PlayerState,
    driver: PlaybackDriver,
    simulation_tick: Duration,
    restart_threshold: f64,
    subscribers: Subscribers<PlayerState>,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O) -> Self {
        Self::with_timing(
            output,
            DEFAULT_SIMULATION_TICK,
            DEFAULT_RESTART_THRESHOLD_SECONDS,
        )
    }

    pub fn with_timing(output: O, simulation_tick: Duration, restart_threshold: f64) -> Self {
        Self {
            output,
            state: PlayerState::default(),
            driver: PlaybackDriver::Idle,
            simulation_tick,
            restart_threshold,
            subscribers: Subscribers::new(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn driver(&self) -> PlaybackDriver {
        self.driver
    }

    pub fn simulation_tick(&self) -> Duration {
        self.simulation_tick
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Whether the simulation timer should be firing
    pub fn is_simulating(&self) -> bool {
        self.driver == PlaybackDriver::Simulated && self.state.is_playing
    }

    /// Register for a state snapshot after every change
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlayerState) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify(&mut self) {
        let snapshot = self.state.clone();
        self.subscribers.notify(&snapshot);
    }

    /// Play `item`, optionally replacing the queue with `playlist`
    ///
    /// Without a playlist the existing queue is kept: an empty queue becomes
    /// `[item]`, otherwise the index moves to `item` if it is queued. Playing
    /// the item that is already loaded toggles play/pause.
    pub fn play(&mut self, item: Recording, playlist: Option<Vec<Recording>>) {
        let position = |queue: &[Recording]| queue.iter().position(|r| r.id == item.id);

        match playlist {
            Some(queue) => {
                self.state.current_index = position(&queue).unwrap_or(0);
                self.state.playlist = queue;
            }
            None if self.state.playlist.is_empty() => {
                self.state.playlist = vec![item.clone()];
                self.state.current_index = 0;
            }
            None => {
                if let Some(index) = position(&self.state.playlist) {
                    self.state.current_index = index;
                }
            }
        }

        if self.state.is_current(&item) {
            self.toggle_play_pause();
            return;
        }
        self.load_and_play(item);
    }

    /// Tear down the previous source and start `item` from the beginning
    fn load_and_play(&mut self, item: Recording) {
        self.output.clear_source();
        self.driver = PlaybackDriver::Idle;

        self.state.current_time = 0.0;
        self.state.duration = item.duration_seconds.max(0.0);
        self.state.is_playing = false;

        let started = match item.audio_url.as_deref() {
            Some(url) => self.output.load(url).and_then(|()| self.output.play()),
            None => Err(PlaybackError::PlaybackUnavailable(
                "recording has no audio".to_string(),
            )),
        };
        tracing::info!("Now playing {} ({:.1}s)", item.id, self.state.duration);
        self.state.current_item = Some(item);

        match started {
            Ok(()) => {
                self.driver = PlaybackDriver::Real;
                self.state.is_playing = true;
            }
            Err(e) => self.fall_back_to_simulation(&e),
        }
        self.notify();
    }

    fn fall_back_to_simulation(&mut self, reason: &PlaybackError) {
        // Playback problems are not surfaced; the position keeps moving either way
        tracing::warn!("Simulating playback: {}", reason);
        self.output.clear_source();
        self.driver = PlaybackDriver::Simulated;
        self.state.is_playing = true;
    }

    /// Advance simulated playback by one step
    ///
    /// Returns false, without changing anything, unless simulated playback
    /// is running.
    pub fn tick_simulation(&mut self) -> bool {
        if !self.is_simulating() {
            return false;
        }

        let next = self.state.current_time + self.simulation_tick.as_secs_f64();
        if next >= self.state.duration - END_EPSILON {
            self.state.current_time = self.state.duration;
            self.finish_item();
        } else {
            self.state.current_time = next;
        }
        self.notify();
        true
    }

    /// Drain and apply events from the audio output
    pub fn poll_output(&mut self) {
        for event in self.output.poll_events() {
            self.on_output_event(event);
        }
    }

    /// Apply one event from the audio output
    ///
    /// Ignored unless the real output is the active driver.
    pub fn on_output_event(&mut self, event: OutputEvent) {
        if self.driver != PlaybackDriver::Real {
            tracing::trace!("Ignoring output event {:?} while {:?}", event, self.driver);
            return;
        }

        match event {
            OutputEvent::TimeAdvanced { position } => {
                self.state.current_time = position.clamp(0.0, self.state.duration);
            }
            OutputEvent::MetadataLoaded { duration } => {
                if duration.is_finite() && duration > 0.0 {
                    self.state.duration = duration;
                }
            }
            OutputEvent::Ended => self.finish_item(),
            OutputEvent::Failed { message } => {
                let was_playing = self.state.is_playing;
                self.fall_back_to_simulation(&PlaybackError::PlaybackUnavailable(message));
                self.state.is_playing = was_playing;
            }
        }
        self.notify();
    }

    /// Move to the next queued item, or stop at the start of this one
    fn finish_item(&mut self) {
        if self.state.has_next() {
            self.state.current_index += 1;
            let next = self.state.playlist[self.state.current_index].clone();
            self.load_and_play(next);
            return;
        }

        tracing::debug!("Reached end of queue");
        self.output.clear_source();
        self.driver = PlaybackDriver::Idle;
        self.state.is_playing = false;
        self.state.current_time = 0.0;
    }

    pub fn pause(&mut self) {
        if !self.state.is_playing {
            return;
        }
        if self.driver == PlaybackDriver::Real {
            self.output.pause();
        }
        self.state.is_playing = false;
        self.notify();
    }

    /// Resume whichever driver was active, or restart a finished item
    fn resume(&mut self) {
        match self.driver {
            PlaybackDriver::Real => match self.output.play() {
                Ok(()) => self.state.is_playing = true,
                Err(e) => self.fall_back_to_simulation(&e),
            },
            PlaybackDriver::Simulated => self.state.is_playing = true,
            PlaybackDriver::Idle => {
                if let Some(item) = self.state.current_item.clone() {
                    self.load_and_play(item);
                }
                return;
            }
        }
        self.notify();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.current_item.is_none() {
            return;
        }
        if self.state.is_playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Jump to `time` seconds, clamped to the item
    pub fn seek(&mut self, time: f64) {
        if self.state.current_item.is_none() {
            return;
        }
        let time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.state.duration)
        };

        self.state.current_time = time;
        if self.driver == PlaybackDriver::Real {
            if let Err(e) = self.output.seek(time) {
                tracing::warn!("Seek to {:.1}s failed: {}", time, e);
            }
        }
        self.notify();
    }

    pub fn seek_to_percent(&mut self, percent: f64) {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.seek(self.state.duration * percent / 100.0);
    }

    /// Skip to the next queued item. Returns false at the end of the queue.
    pub fn next(&mut self) -> bool {
        if !self.state.has_next() {
            return false;
        }
        self.state.current_index += 1;
        let item = self.state.playlist[self.state.current_index].clone();
        self.load_and_play(item);
        true
    }

    /// Restart the current item, or go back one item near its start
    ///
    /// More than the restart threshold into an item, or at the head of the
    /// queue, this seeks to 0 instead of moving.
    pub fn previous(&mut self) {
        if self.state.current_time > self.restart_threshold || !self.state.has_previous() {
            self.seek(0.0);
            return;
        }
        self.state.current_index -= 1;
        let item = self.state.playlist[self.state.current_index].clone();
        self.load_and_play(item);
    }

    /// Clear the item and queue and release the output source
    pub fn stop(&mut self) {
        self.output.clear_source();
        self.driver = PlaybackDriver::Idle;
        self.state = PlayerState::default();
        tracing::debug!("Playback stopped");
        self.notify();
    }
}
