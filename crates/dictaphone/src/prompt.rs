//! Confirmation prompts over standard IO.
//!
//! Stdin is read by a single forwarder task and consumed through a
//! shared [`LineSource`], so the consent phase and the main loop can
//! take turns without fighting over the reader.

use std::{io::Write, sync::Arc};

use async_trait::async_trait;
use dictaphone_core::{ConfirmPrompt, CoreResult};
use tokio::sync::{Mutex, mpsc};

/// Shared handle to the forwarded stdin lines.
pub(crate) type LineSource = Arc<Mutex<mpsc::Receiver<String>>>;

/// Interactive yes/no prompt on the terminal. Defaults to no.
pub(crate) struct StdioPrompt {
    lines: LineSource,
}

impl StdioPrompt {
    pub(crate) fn new(lines: LineSource) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl ConfirmPrompt for StdioPrompt {
    async fn confirm(&self, action: &str) -> CoreResult<bool> {
        print!("{action}? [y/N] ");
        let _ = std::io::stdout().flush();

        let answer = { self.lines.lock().await.recv().await };

        // A closed input counts as a decline.
        let Some(line) = answer else {
            return Ok(false);
        };

        Ok(matches!(
            line.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Pre-resolved confirmation for callers that already collected the
/// answer elsewhere.
pub(crate) struct Resolved(pub(crate) bool);

#[async_trait]
impl ConfirmPrompt for Resolved {
    async fn confirm(&self, _action: &str) -> CoreResult<bool> {
        Ok(self.0)
    }
}
