//! Persisted microphone consent as a permission source.
//!
//! Desktop platforms have no OS-level microphone prompt to lean on, so
//! consent is collected on the terminal and stored in the config file.
//! The file is re-read on every query, which lets a user fix a denial
//! by editing the config and retrying without restarting.

use crate::{
    LineSource, StdioPrompt,
    config::{Config, Consent, PrivacyConfig},
};

use std::{panic::Location, sync::Arc};

use async_trait::async_trait;
use dictaphone_core::{
    AsyncOp, ConfirmPrompt, CoreError, CoreResult, PermissionSource, PermissionStatus, acquire,
};
use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Permission source backed by the config file and a terminal prompt.
pub(crate) struct ConsentGate {
    prompt: Arc<dyn ConfirmPrompt>,
}

impl ConsentGate {
    pub(crate) fn new(prompt: Arc<dyn ConfirmPrompt>) -> Self {
        Self { prompt }
    }
}

/// Map a persisted consent decision onto a permission status.
pub(crate) fn classify(privacy: &PrivacyConfig) -> PermissionStatus {
    match privacy.microphone {
        Consent::Granted => PermissionStatus {
            granted: true,
            can_ask_again: true,
        },
        Consent::Denied => PermissionStatus {
            granted: false,
            can_ask_again: privacy.ask_again,
        },
        Consent::Unset => PermissionStatus {
            granted: false,
            can_ask_again: true,
        },
    }
}

#[track_caller]
fn load_store() -> CoreResult<Config> {
    Config::load().map_err(|e| CoreError::PermissionPromptFailed {
        reason: format!("Consent store unavailable: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[async_trait]
impl PermissionSource for ConsentGate {
    async fn query(&mut self) -> CoreResult<PermissionStatus> {
        let config = load_store()?;
        Ok(classify(&config.privacy))
    }

    async fn request(&mut self) -> CoreResult<PermissionStatus> {
        let allowed = self
            .prompt
            .confirm("Allow Dictaphone to use the microphone")
            .await?;

        let mut config = load_store()?;
        config.privacy.microphone = if allowed {
            Consent::Granted
        } else {
            Consent::Denied
        };
        if !allowed {
            // An explicit refusal is final until the config is edited.
            config.privacy.ask_again = false;
        }

        config.save().map_err(|e| CoreError::PermissionPromptFailed {
            reason: format!("Failed to record consent: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(granted = allowed, "Consent recorded");

        Ok(classify(&config.privacy))
    }
}

/// Run the permission gate before any recording machinery starts.
///
/// Returns `false` when the user quit or access could not be obtained.
/// Failures are rendered full screen with a retry option rather than
/// propagated, so a denial never leaves a half-started app behind.
#[instrument(skip(lines))]
pub(crate) async fn acquire_consent(lines: &LineSource) -> bool {
    let gate = Arc::new(Mutex::new(ConsentGate::new(Arc::new(StdioPrompt::new(
        Arc::clone(lines),
    )))));

    let op = AsyncOp::new(move || {
        let gate = Arc::clone(&gate);
        Box::pin(async move { acquire(&mut *gate.lock().await).await })
    });
    op.run();

    let mut state_rx = op.subscribe();

    loop {
        // Wait for the in-flight attempt to settle.
        loop {
            if !state_rx.borrow_and_update().is_loading() {
                break;
            }
            if state_rx.changed().await.is_err() {
                return false;
            }
        }

        let state = op.state();
        let Some(error) = state.error() else {
            info!("Microphone consent in place");
            return true;
        };

        render_denied(error, op.attempts());

        let answer = { lines.lock().await.recv().await };
        match answer.as_deref().map(str::trim) {
            Some("r") | Some("R") | Some("retry") => op.retry(),
            _ => return false,
        }
    }
}

fn render_denied(error: &CoreError, attempts: u32) {
    println!();
    match error {
        CoreError::PermissionDenied { instruction, .. } => println!("{instruction}"),
        other => println!("{other}"),
    }
    if let Ok(path) = Config::config_path() {
        println!("Consent is stored in {}.", path.display());
    }
    if attempts > 0 {
        println!("Retry attempt {attempts} did not succeed.");
    }
    println!("Press r to retry once access is enabled, or anything else to quit.");
}
