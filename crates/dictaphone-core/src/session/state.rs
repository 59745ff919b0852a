use std::path::PathBuf;

use tracing::debug;

/// Lifecycle phase of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No recording exists yet.
    Idle,
    /// Audio is being captured.
    Recording,
    /// Capture is suspended and can resume.
    Paused,
    /// Capture has finished; a clip may be available.
    Stopped,
}

impl SessionStatus {
    /// Whether capture is in progress (recording or paused).
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Recording | SessionStatus::Paused)
    }
}

/// Snapshot of a recording session.
///
/// The clip locator is populated only in [`SessionStatus::Stopped`]; every
/// other status carries `None`. A stopped session may still hold `None`
/// when the capture produced nothing playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    /// Current lifecycle phase.
    pub status: SessionStatus,
    /// Location of the finished clip, if one exists.
    pub clip: Option<PathBuf>,
}

impl RecordingSession {
    /// The initial session: idle with no clip.
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            clip: None,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Transition request applied to a [`RecordingSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Begin capturing a fresh clip.
    Start,
    /// Suspend an in-progress capture.
    Pause,
    /// Resume a suspended capture.
    Resume,
    /// Finish capture, landing on the produced clip.
    Stop {
        /// Clip written by the capture device, if any.
        clip: Option<PathBuf>,
    },
    /// Discard the stopped session and return to idle.
    Reset,
}

/// Apply `event` to `session`, returning the next session.
///
/// Events that are not legal for the current status leave the session
/// unchanged. Starting always clears the previous clip, so the locator
/// can never leak out of the stopped status.
pub fn transition(session: &RecordingSession, event: SessionEvent) -> RecordingSession {
    match (session.status, event) {
        (SessionStatus::Idle | SessionStatus::Stopped, SessionEvent::Start) => RecordingSession {
            status: SessionStatus::Recording,
            clip: None,
        },
        (SessionStatus::Recording, SessionEvent::Pause) => RecordingSession {
            status: SessionStatus::Paused,
            clip: session.clip.clone(),
        },
        (SessionStatus::Paused, SessionEvent::Resume) => RecordingSession {
            status: SessionStatus::Recording,
            clip: session.clip.clone(),
        },
        (SessionStatus::Recording | SessionStatus::Paused, SessionEvent::Stop { clip }) => {
            RecordingSession {
                status: SessionStatus::Stopped,
                clip,
            }
        }
        (SessionStatus::Stopped, SessionEvent::Reset) => RecordingSession::new(),
        (status, event) => {
            debug!(?status, ?event, "Ignoring event not legal for status");
            session.clone()
        }
    }
}
