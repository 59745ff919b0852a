//! Maps session status to the action each toggle control performs.
//!
//! The record control is a start/stop toggle and the hold control is a
//! pause/resume toggle. Keeping the mapping here lets the UI stay a thin
//! dispatcher and makes the toggle behaviour testable on its own.

use crate::SessionStatus;

/// Action the primary record control performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// Begin a fresh capture.
    Start,
    /// Finish the capture in progress.
    Stop,
}

/// Action the secondary hold control performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldAction {
    /// Suspend the capture in progress.
    Pause,
    /// Resume the suspended capture.
    Resume,
}

/// Select the record control's action for the current status.
pub fn record_control(status: SessionStatus) -> RecordAction {
    match status {
        SessionStatus::Idle | SessionStatus::Stopped => RecordAction::Start,
        SessionStatus::Recording | SessionStatus::Paused => RecordAction::Stop,
    }
}

/// Select the hold control's action for the current status.
///
/// Returns `None` when the control is inert (nothing to pause or resume).
pub fn hold_control(status: SessionStatus) -> Option<HoldAction> {
    match status {
        SessionStatus::Recording => Some(HoldAction::Pause),
        SessionStatus::Paused => Some(HoldAction::Resume),
        SessionStatus::Idle | SessionStatus::Stopped => None,
    }
}
