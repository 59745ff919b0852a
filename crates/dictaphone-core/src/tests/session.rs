use crate::{RecordingSession, SessionEvent, SessionStatus, transition};

use std::path::PathBuf;

fn session(status: SessionStatus, clip: Option<&str>) -> RecordingSession {
    RecordingSession {
        status,
        clip: clip.map(PathBuf::from),
    }
}

fn assert_locator_invariant(session: &RecordingSession) {
    if session.clip.is_some() {
        assert_eq!(session.status, SessionStatus::Stopped);
    }
}

/// WHAT: Starting from idle begins recording
/// WHY: The initial record press must open a capture
#[test]
fn given_idle_when_start_then_recording() {
    // Given: The initial session
    let initial = RecordingSession::new();

    // When: Start is applied
    let next = transition(&initial, SessionEvent::Start);

    // Then: The session is recording with no clip
    assert_eq!(next, session(SessionStatus::Recording, None));
    assert_locator_invariant(&next);
}

/// WHAT: Starting from stopped clears the previous clip
/// WHY: A fresh take must never carry the old clip locator
#[test]
fn given_stopped_with_clip_when_start_then_recording_without_clip() {
    // Given: A stopped session holding a clip
    let stopped = session(SessionStatus::Stopped, Some("take-1.wav"));

    // When: Start is applied
    let next = transition(&stopped, SessionEvent::Start);

    // Then: Recording begins and the locator is gone
    assert_eq!(next, session(SessionStatus::Recording, None));
    assert_locator_invariant(&next);
}

/// WHAT: Pausing an in-progress recording suspends it
/// WHY: The hold control must be able to suspend capture
#[test]
fn given_recording_when_pause_then_paused() {
    // Given: A recording session
    let recording = session(SessionStatus::Recording, None);

    // When: Pause is applied
    let next = transition(&recording, SessionEvent::Pause);

    // Then: The session is paused
    assert_eq!(next, session(SessionStatus::Paused, None));
}

/// WHAT: Resuming a paused recording continues it
/// WHY: The hold control must be able to continue capture
#[test]
fn given_paused_when_resume_then_recording() {
    // Given: A paused session
    let paused = session(SessionStatus::Paused, None);

    // When: Resume is applied
    let next = transition(&paused, SessionEvent::Resume);

    // Then: The session is recording again
    assert_eq!(next, session(SessionStatus::Recording, None));
}

/// WHAT: Stopping a recording lands on the produced clip
/// WHY: The stopped session is what playback and reset operate on
#[test]
fn given_recording_when_stop_with_clip_then_stopped_with_clip() {
    // Given: A recording session
    let recording = session(SessionStatus::Recording, None);

    // When: Stop carrying a clip is applied
    let next = transition(
        &recording,
        SessionEvent::Stop {
            clip: Some(PathBuf::from("take-2.wav")),
        },
    );

    // Then: The session is stopped holding that clip
    assert_eq!(next, session(SessionStatus::Stopped, Some("take-2.wav")));
    assert_locator_invariant(&next);
}

/// WHAT: Stopping from paused also lands on stopped
/// WHY: A suspended capture can be finished without resuming first
#[test]
fn given_paused_when_stop_then_stopped() {
    // Given: A paused session
    let paused = session(SessionStatus::Paused, None);

    // When: Stop is applied
    let next = transition(
        &paused,
        SessionEvent::Stop {
            clip: Some(PathBuf::from("take-3.wav")),
        },
    );

    // Then: The session is stopped holding the clip
    assert_eq!(next, session(SessionStatus::Stopped, Some("take-3.wav")));
}

/// WHAT: Stop without a clip is a valid stopped session
/// WHY: A capture that produced nothing still finishes cleanly
#[test]
fn given_recording_when_stop_without_clip_then_stopped_without_clip() {
    // Given: A recording session
    let recording = session(SessionStatus::Recording, None);

    // When: Stop carrying no clip is applied
    let next = transition(&recording, SessionEvent::Stop { clip: None });

    // Then: The session is stopped with nothing to play
    assert_eq!(next, session(SessionStatus::Stopped, None));
    assert_locator_invariant(&next);
}

/// WHAT: Reset returns a stopped session to the initial state
/// WHY: Deleting a take must leave a blank slate
#[test]
fn given_stopped_when_reset_then_initial() {
    // Given: A stopped session holding a clip
    let stopped = session(SessionStatus::Stopped, Some("take-4.wav"));

    // When: Reset is applied
    let next = transition(&stopped, SessionEvent::Reset);

    // Then: The session is the initial one
    assert_eq!(next, RecordingSession::new());
}

/// WHAT: Events not legal for the current status change nothing
/// WHY: Stray control presses must never corrupt the session
#[test]
fn given_illegal_event_for_status_when_applied_then_unchanged() {
    // Given: Every (status, event) pair outside the transition table
    let cases = vec![
        (session(SessionStatus::Idle, None), SessionEvent::Pause),
        (session(SessionStatus::Idle, None), SessionEvent::Resume),
        (
            session(SessionStatus::Idle, None),
            SessionEvent::Stop {
                clip: Some(PathBuf::from("stray.wav")),
            },
        ),
        (session(SessionStatus::Idle, None), SessionEvent::Reset),
        (session(SessionStatus::Recording, None), SessionEvent::Start),
        (session(SessionStatus::Recording, None), SessionEvent::Resume),
        (session(SessionStatus::Recording, None), SessionEvent::Reset),
        (session(SessionStatus::Paused, None), SessionEvent::Start),
        (session(SessionStatus::Paused, None), SessionEvent::Pause),
        (session(SessionStatus::Paused, None), SessionEvent::Reset),
        (
            session(SessionStatus::Stopped, Some("kept.wav")),
            SessionEvent::Pause,
        ),
        (
            session(SessionStatus::Stopped, Some("kept.wav")),
            SessionEvent::Resume,
        ),
        (
            session(SessionStatus::Stopped, Some("kept.wav")),
            SessionEvent::Stop {
                clip: Some(PathBuf::from("stray.wav")),
            },
        ),
    ];

    for (before, event) in cases {
        // When: The illegal event is applied
        let next = transition(&before, event.clone());

        // Then: The session is unchanged
        assert_eq!(next, before, "event {:?} must be ignored", event);
        assert_locator_invariant(&next);
    }
}

/// WHAT: Pausing and resuming never touches the clip locator
/// WHY: The locator may only appear when the session stops
#[test]
fn given_active_session_when_pausing_and_resuming_then_clip_stays_none() {
    // Given: A session taken through start
    let mut current = transition(&RecordingSession::new(), SessionEvent::Start);

    // When: The session is paused and resumed repeatedly
    for _ in 0..3 {
        current = transition(&current, SessionEvent::Pause);
        assert_eq!(current.clip, None);
        current = transition(&current, SessionEvent::Resume);
        assert_eq!(current.clip, None);
    }

    // Then: The locator never appeared outside stopped
    assert_locator_invariant(&current);
    assert_eq!(current.status, SessionStatus::Recording);
}
