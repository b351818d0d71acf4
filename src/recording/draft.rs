//! The in-progress recording and its tags

use crate::audio::{AudioBlob, BlobUrl};
use crate::movement::Movement;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Most tags a recording can carry
pub const MAX_TAGS: usize = 5;

/// Longest tag, in characters
pub const MAX_TAG_LENGTH: usize = 20;

/// Longest title, in characters; longer titles are cut
pub const MAX_TITLE_LENGTH: usize = 100;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Reasons a tag was not added
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Tag is empty")]
    Empty,

    #[error("Tag is longer than {max} characters")]
    TooLong { max: usize },

    #[error("Tag '{0}' is already on this recording")]
    Duplicate(String),

    #[error("A recording can have at most {max} tags")]
    LimitReached { max: usize },
}

/// Canonical form of a tag: trimmed, `#` stripped, single-spaced, lowercase
pub fn normalize_tag(raw: &str) -> Result<String, TagError> {
    let stripped = raw.trim().trim_start_matches('#').trim();
    let tag = whitespace().replace_all(stripped, " ").to_lowercase();

    if tag.is_empty() {
        return Err(TagError::Empty);
    }
    if tag.chars().count() > MAX_TAG_LENGTH {
        return Err(TagError::TooLong {
            max: MAX_TAG_LENGTH,
        });
    }
    Ok(tag)
}

/// Ordered, deduplicated set of at most `MAX_TAGS` normalised tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `raw` could be added, without adding it
    pub fn validate(&self, raw: &str) -> Result<String, TagError> {
        let tag = normalize_tag(raw)?;
        if self.0.contains(&tag) {
            return Err(TagError::Duplicate(tag));
        }
        if self.0.len() >= MAX_TAGS {
            return Err(TagError::LimitReached { max: MAX_TAGS });
        }
        Ok(tag)
    }

    /// Add a tag, returning its normalised form
    pub fn add(&mut self, raw: &str) -> Result<String, TagError> {
        let tag = self.validate(raw)?;
        self.0.push(tag.clone());
        Ok(tag)
    }

    /// Remove a tag by any spelling that normalises to it
    pub fn remove(&mut self, raw: &str) -> bool {
        let Ok(tag) = normalize_tag(raw) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|t| *t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, raw: &str) -> bool {
        normalize_tag(raw).is_ok_and(|tag| self.0.contains(&tag))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Clean up a user-entered title; blank titles become `None`
pub fn normalize_title(raw: &str) -> Option<String> {
    let title = whitespace().replace_all(raw.trim(), " ");
    if title.is_empty() {
        return None;
    }
    Some(title.chars().take(MAX_TITLE_LENGTH).collect())
}

/// Everything collected for a recording that has not been uploaded yet
#[derive(Debug, Clone, Default)]
pub struct RecordingDraft {
    pub movement: Option<Movement>,
    pub audio: Option<AudioBlob>,
    /// Local URL for previewing `audio`; must be revoked when discarded
    pub preview_url: Option<BlobUrl>,
    /// Live amplitude readings while recording, the 50-point summary after
    pub waveform: Vec<f32>,
    pub tags: TagSet,
    pub title: Option<String>,
}
