//! Recording flow integration tests for Tacet.
//!
//! Drives the recording controller end to end with a fake microphone, a
//! hand-advanced clock and an in-memory recordings service.

mod common;

use common::Harness;
use std::time::Duration;
use tacet_lib::audio::WAVEFORM_POINTS;
use tacet_lib::recording::{
    RecordingError, RecordingPhase, TransitionReason, MAX_TAGS, MAX_TAG_LENGTH,
};
use tacet_lib::Movement;

// =============================================================================
// Starting and timing
// =============================================================================

#[test]
fn test_every_movement_starts_from_zero() {
    for movement in Movement::ALL {
        let mut h = Harness::new();
        h.controller.select_movement(movement).unwrap();
        h.controller.start_recording().unwrap();

        assert_eq!(h.controller.phase(), RecordingPhase::Recording);
        assert_eq!(h.controller.elapsed_seconds(), 0.0);
        assert!(h.controller.draft().waveform.is_empty());
        assert!(h.controller.is_timer_running());
        assert_eq!(h.microphones_held(), 1);
    }
}

#[test]
fn test_movement_one_completes_on_thirtieth_tick() {
    let mut h = Harness::new();
    h.controller.select_movement(Movement::I).unwrap();
    h.controller.start_recording().unwrap();

    for second in 1..=29 {
        h.tick_after(1.0);
        assert_eq!(
            h.controller.phase(),
            RecordingPhase::Recording,
            "finished early at tick {}",
            second
        );
        if second == 15 {
            assert_eq!(h.controller.progress(), 50.0);
            assert_eq!(h.controller.remaining(), 15.0);
        }
    }

    h.clock.advance_secs(1.0);
    let result = h.controller.on_timer_tick().unwrap().unwrap();
    assert_eq!(result.reason, TransitionReason::DurationReached);
    assert_eq!(h.controller.phase(), RecordingPhase::Recorded);
    assert_eq!(h.controller.progress(), 100.0);
    assert_eq!(h.controller.remaining(), 0.0);
}

#[test]
fn test_completion_happens_exactly_once() {
    let mut h = Harness::new();
    let completions = std::rc::Rc::new(std::cell::Cell::new(0));
    let seen = completions.clone();
    h.controller.subscribe(move |update| {
        if update.phase == RecordingPhase::Recorded && update.tags.is_empty() {
            seen.set(seen.get() + 1);
        }
    });

    h.record_full(Movement::I);
    assert_eq!(completions.get(), 1);
    assert!(!h.controller.is_timer_running());

    // A stale timer firing after completion changes nothing
    h.clock.advance_secs(5.0);
    assert!(h.controller.on_timer_tick().unwrap().is_none());
    assert_eq!(completions.get(), 1);
    assert_eq!(h.controller.phase(), RecordingPhase::Recorded);
}

#[test]
fn test_delayed_ticks_follow_the_clock() {
    let mut h = Harness::new();
    h.controller.select_movement(Movement::II).unwrap();
    h.controller.start_recording().unwrap();

    // Three callbacks, but 61 seconds of wall-clock time
    h.tick_after(0.5);
    h.tick_after(40.0);
    h.tick_after(20.5);

    assert_eq!(h.controller.elapsed_seconds(), 61.0);
    assert_eq!(h.controller.draft().waveform.len(), 3);
}

#[test]
fn test_late_tick_past_duration_completes() {
    let mut h = Harness::new();
    h.controller.select_movement(Movement::III).unwrap();
    h.controller.start_recording().unwrap();
    h.tick_after(500.0);

    assert_eq!(h.controller.phase(), RecordingPhase::Recorded);
    assert_eq!(h.controller.progress(), 100.0);
    assert_eq!(h.microphones_held(), 0);
    assert_eq!(h.controller.draft().waveform.len(), WAVEFORM_POINTS);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancel_stops_timer_and_releases_microphone() {
    let mut h = Harness::new();
    h.controller.select_movement(Movement::Full).unwrap();
    h.controller.start_recording().unwrap();
    h.tick_after(10.0);

    h.controller.cancel_recording().unwrap();
    assert_eq!(h.controller.phase(), RecordingPhase::Selecting);
    assert!(!h.controller.is_timer_running());
    assert_eq!(h.microphones_held(), 0);
    assert_eq!(h.controller.draft().movement, None);

    h.clock.advance_secs(300.0);
    assert!(h.controller.on_timer_tick().unwrap().is_none());
    assert_eq!(h.controller.elapsed_seconds(), 0.0);
    assert_eq!(h.controller.phase(), RecordingPhase::Selecting);
}

#[test]
fn test_record_again_after_cancel() {
    let mut h = Harness::new();
    h.controller.select_movement(Movement::I).unwrap();
    h.controller.start_recording().unwrap();
    h.controller.cancel_recording().unwrap();

    h.record_full(Movement::I);
    assert_eq!(h.controller.phase(), RecordingPhase::Recorded);
    assert_eq!(h.microphones_held(), 0);
}

// =============================================================================
// Tags
// =============================================================================

#[test]
fn test_tag_set_stays_bounded_and_normalised() {
    let mut h = Harness::new();
    h.record_full(Movement::I);

    let attempts = [
        "Rain", "rain", " TRAFFIC ", "#birds", "Fridge Hum", "cough", "door", "wind",
    ];
    for raw in attempts {
        let _ = h.controller.add_tag(raw);
    }
    let _ = h.controller.add_tag(&"x".repeat(MAX_TAG_LENGTH + 1));
    h.controller.remove_tag("COUGH").unwrap();
    let _ = h.controller.add_tag("Wind");

    let tags = h.controller.draft().tags.as_slice().to_vec();
    assert!(tags.len() <= MAX_TAGS);
    for tag in &tags {
        assert_eq!(tag, &tag.to_lowercase());
        assert!(tag.chars().count() <= MAX_TAG_LENGTH);
    }
    let mut unique = tags.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), tags.len());
    assert!(tags.contains(&"wind".to_string()));
}

#[test]
fn test_tags_rejected_while_recording() {
    let mut h = Harness::new();
    h.controller.select_movement(Movement::I).unwrap();
    h.controller.start_recording().unwrap();

    assert!(matches!(
        h.controller.add_tag("rain"),
        Err(RecordingError::InvalidTransition { .. })
    ));
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_needs_three_tags() {
    let mut h = Harness::new();
    h.record_full(Movement::I);
    h.controller.add_tag("rain").unwrap();
    h.controller.add_tag("traffic").unwrap();
    h.controller.go_to_tags().unwrap();

    let err = h.controller.upload().await.unwrap_err();
    assert!(matches!(
        err,
        RecordingError::NotEnoughTags {
            required: 3,
            found: 2
        }
    ));
    assert_eq!(h.controller.phase(), RecordingPhase::Tagging);
    assert_eq!(h.api.created_count(), 0);
}

#[tokio::test]
async fn test_upload_before_tagging_is_rejected() {
    let mut h = Harness::new();
    h.record_full(Movement::I);
    for tag in ["rain", "traffic", "birds"] {
        h.controller.add_tag(tag).unwrap();
    }

    assert!(matches!(
        h.controller.upload().await,
        Err(RecordingError::InvalidTransition {
            phase: RecordingPhase::Recorded,
            ..
        })
    ));
    assert_eq!(h.api.created_count(), 0);
}

#[tokio::test]
async fn test_successful_upload_resets_flow() {
    let mut h = Harness::new();
    h.record_full(Movement::II);
    h.controller.go_to_tags().unwrap();
    for tag in ["rain", "traffic", "birds"] {
        h.controller.add_tag(tag).unwrap();
    }
    h.controller.set_title("  Tuesday   morning ").unwrap();

    let published = h.controller.upload().await.unwrap();
    assert_eq!(published.movement, Movement::II);
    assert_eq!(published.tags, vec!["rain", "traffic", "birds"]);
    assert_eq!(published.title.as_deref(), Some("Tuesday morning"));

    assert_eq!(h.controller.phase(), RecordingPhase::Selecting);
    assert!(h.controller.draft().audio.is_none());
    assert_eq!(h.blobs.live_count(), 0);

    let log = h.api.log.borrow();
    assert_eq!(log.created.len(), 1);
    assert_eq!(log.created[0].duration_seconds, 143.0);
    assert_eq!(log.created[0].waveform.len(), WAVEFORM_POINTS);
}

#[tokio::test]
async fn test_failed_upload_keeps_draft_for_retry() {
    let mut h = Harness::new();
    h.record_full(Movement::I);
    h.controller.go_to_tags().unwrap();
    for tag in ["rain", "traffic", "birds"] {
        h.controller.add_tag(tag).unwrap();
    }
    h.api.fail_next(503);

    let err = h.controller.upload().await.unwrap_err();
    assert!(matches!(err, RecordingError::UploadFailed(_)));
    assert_eq!(h.controller.phase(), RecordingPhase::Tagging);
    assert!(h.controller.draft().audio.is_some());
    assert_eq!(h.controller.draft().tags.len(), 3);
    assert!(h.controller.last_error().is_some());

    // The user retries without re-recording
    h.controller.upload().await.unwrap();
    assert_eq!(h.controller.phase(), RecordingPhase::Selecting);
    assert_eq!(h.api.created_count(), 1);
    assert!(h.controller.last_error().is_none());
}

#[tokio::test]
async fn test_interrupted_upload_returns_to_tagging() {
    let mut h = Harness::new();
    h.record_full(Movement::I);
    h.controller.go_to_tags().unwrap();
    for tag in ["rain", "traffic", "birds"] {
        h.controller.add_tag(tag).unwrap();
    }
    h.api.hang_next();

    let attempt = tokio::time::timeout(Duration::from_millis(20), h.controller.upload()).await;
    assert!(attempt.is_err(), "upload should still be waiting");

    assert_eq!(h.controller.phase(), RecordingPhase::Tagging);
    assert!(h.controller.draft().audio.is_some());
    assert_eq!(h.controller.draft().tags.len(), 3);
    assert!(h.controller.last_error().is_some());
    assert_eq!(h.api.created_count(), 0);

    h.controller.upload().await.unwrap();
    assert_eq!(h.controller.phase(), RecordingPhase::Selecting);
    assert_eq!(h.api.created_count(), 1);
}

// =============================================================================
// Preview handles
// =============================================================================

#[test]
fn test_preview_urls_do_not_accumulate() {
    let mut h = Harness::new();
    for _ in 0..5 {
        h.record_full(Movement::I);
        assert!(h.controller.draft().preview_url.is_some());
        assert_eq!(h.blobs.live_count(), 1);
        h.controller.start_over().unwrap();
        assert_eq!(h.blobs.live_count(), 0);
    }
}

#[test]
fn test_preview_url_resolves_to_recorded_audio() {
    let mut h = Harness::new();
    h.record_full(Movement::I);

    let url = h.controller.draft().preview_url.clone().unwrap();
    let blob = h.blobs.resolve(url.as_str()).unwrap();
    let audio = h.controller.draft().audio.as_ref().unwrap();
    assert_eq!(blob.bytes(), audio.bytes());
    assert_eq!(blob.mime_type(), "audio/wav");
}
