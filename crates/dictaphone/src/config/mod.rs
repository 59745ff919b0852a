mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod privacy_config;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig,
    config::Config,
    privacy_config::{Consent, PrivacyConfig},
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_CLIP_DIR_NAME: &str = "clips";

pub(crate) fn default_ask_again() -> bool {
    true
}
