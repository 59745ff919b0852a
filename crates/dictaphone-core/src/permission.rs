//! Microphone permission gate.
//!
//! Recording must not begin until [`acquire`] has returned `Ok`. The
//! flow mirrors platform permission prompts: an undecided permission is
//! requested exactly once, and a denial that cannot be asked again is
//! terminal for the whole app rather than a retryable failure.

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

use crate::{CoreError, CoreResult};

/// Instruction surfaced when access is denied for good.
const DENIED_INSTRUCTION: &str =
    "Microphone permissions are not granted. Please enable them in your device settings.";

/// Raw permission answer from the platform or a persisted policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionStatus {
    /// Whether microphone access is currently allowed.
    pub granted: bool,
    /// Whether an interactive request may still be made.
    pub can_ask_again: bool,
}

/// What the gate should do with a [`PermissionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Access is allowed; proceed.
    Granted,
    /// Undecided; request interactively.
    AskAgain,
    /// Denied with no way to ask; terminal.
    Blocked,
}

impl From<PermissionStatus> for PermissionDecision {
    fn from(status: PermissionStatus) -> Self {
        if status.granted {
            PermissionDecision::Granted
        } else if status.can_ask_again {
            PermissionDecision::AskAgain
        } else {
            PermissionDecision::Blocked
        }
    }
}

/// Source of permission answers.
///
/// `query` must be side-effect free; `request` may prompt the user and
/// is only called when a query reported the permission as undecided.
#[async_trait::async_trait]
pub trait PermissionSource: Send {
    /// Read the current permission without prompting.
    async fn query(&mut self) -> CoreResult<PermissionStatus>;

    /// Prompt for the permission and return the resulting status.
    async fn request(&mut self) -> CoreResult<PermissionStatus>;
}

/// Drive the permission flow to a decision.
///
/// Queries first, requests interactively at most once, and returns
/// [`CoreError::PermissionDenied`] when access cannot be obtained.
#[instrument(skip(source))]
pub async fn acquire(source: &mut dyn PermissionSource) -> CoreResult<()> {
    let status = source.query().await?;

    match PermissionDecision::from(status) {
        PermissionDecision::Granted => {
            debug!("Microphone access granted");
            Ok(())
        }
        PermissionDecision::AskAgain => {
            info!("Microphone access undecided, requesting");
            let response = source.request().await?;
            if response.granted {
                info!("Microphone access granted on request");
                Ok(())
            } else {
                warn!("Microphone access refused on request");
                Err(denied())
            }
        }
        PermissionDecision::Blocked => {
            warn!("Microphone access blocked");
            Err(denied())
        }
    }
}

#[track_caller]
fn denied() -> CoreError {
    CoreError::PermissionDenied {
        instruction: DENIED_INSTRUCTION.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
