//! Payloads exchanged with the recordings service

use crate::audio::AudioBlob;
use crate::movement::Movement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner of a recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingUser {
    pub id: String,
    pub username: String,
}

/// A recording as published by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub user: RecordingUser,
    pub movement: Movement,
    pub duration_seconds: f64,
    /// Absent when the audio has not been processed yet
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub waveform_data: Vec<f32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub play_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to publish a finished draft
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub audio: AudioBlob,
    pub movement: Movement,
    pub duration_seconds: f64,
    pub tags: Vec<String>,
    pub waveform: Vec<f32>,
    pub title: Option<String>,
}

/// Which recordings to browse
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingFilter {
    #[default]
    Trending,
    Tag(String),
    User(String),
}

impl RecordingFilter {
    /// Path and query, relative to the API base
    pub fn path(&self) -> (&'static str, Option<(&'static str, &str)>) {
        match self {
            RecordingFilter::Trending => ("recordings/trending", None),
            RecordingFilter::Tag(tag) => ("recordings", Some(("tag", tag.as_str()))),
            RecordingFilter::User(user) => ("recordings", Some(("user", user.as_str()))),
        }
    }
}
