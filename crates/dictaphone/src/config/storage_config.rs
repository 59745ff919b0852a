use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Clip storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory recorded clips are written to (None = platform data dir).
    #[serde(default)]
    pub clip_dir: Option<PathBuf>,
}
