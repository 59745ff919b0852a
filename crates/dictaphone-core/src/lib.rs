//! Dictaphone Core Library
//!
//! Recording session engine: the session state machine and its
//! controller, microphone capture and WAV playback devices, the
//! permission gate, and lifecycle plumbing for async operations.
//!
//! # Example
//!
//! ```no_run
//! use dictaphone_core::{CoreResult, SessionController, WavRecorder};
//!
//! use std::{path::PathBuf, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let recorder = WavRecorder::new(None)?;
//!     let mut controller = SessionController::new(Box::new(recorder), PathBuf::from("clips"));
//!
//!     controller.start().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     controller.stop().await?;
//!
//!     println!("Clip: {:?}", controller.session().clip);
//!     Ok(())
//! }
//! ```

mod device;
mod error;
mod lifecycle;
mod permission;
mod playback;
mod session;
mod timer;

pub use {
    device::{CaptureDevice, PlaybackDevice, PlayerState, WavPlayer, WavRecorder},
    error::{CoreError, Result as CoreResult},
    lifecycle::{AsyncOp, OpState},
    permission::{PermissionDecision, PermissionSource, PermissionStatus, acquire},
    playback::{PLAYBACK_RATES, RateCycle, progress},
    session::{
        ConfirmPrompt, HoldAction, RecordAction, RecordingSession, SessionController,
        SessionEvent, SessionStatus, hold_control, record_control, transition,
    },
    timer::{RecordingTimer, format_clock},
};

#[cfg(test)]
mod tests;
