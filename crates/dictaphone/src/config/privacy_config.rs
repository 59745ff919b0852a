use crate::config::default_ask_again;

use serde::{Deserialize, Serialize};

/// Persisted microphone consent decision.
///
/// `Unset` means the user has never been asked. A fresh prompt is only
/// shown while `ask_again` on [`PrivacyConfig`] is still true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consent {
    /// Never asked.
    Unset,
    /// Access allowed.
    Granted,
    /// Access refused.
    Denied,
}

/// Privacy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyConfig {
    /// Recorded microphone consent.
    #[serde(default = "default_consent")]
    pub microphone: Consent,
    /// Whether an interactive consent prompt may still be shown.
    #[serde(default = "default_ask_again")]
    pub ask_again: bool,
}

fn default_consent() -> Consent {
    Consent::Unset
}
