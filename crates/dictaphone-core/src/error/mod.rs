use error_location::ErrorLocation;
use thiserror::Error;

/// Recording and playback errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture device operation failed.
    #[error("Capture error: {reason} {location}")]
    CaptureError {
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback device operation failed.
    #[error("Playback error: {reason} {location}")]
    PlaybackError {
        /// Description of the playback failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// WAV encoding or decoding failed.
    #[error("WAV error: {reason} {location}")]
    WavError {
        /// Description of the codec failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Clip file operation failed.
    #[error("Clip I/O error for {path:?}: {source} {location}")]
    ClipIo {
        /// Path of the clip involved.
        path: std::path::PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Microphone access denied with no way to ask again.
    #[error("Permission denied: {instruction} {location}")]
    PermissionDenied {
        /// User-facing recovery instruction.
        instruction: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Permission prompt could not be delivered.
    #[error("Permission prompt failed: {reason} {location}")]
    PermissionPromptFailed {
        /// Description of the prompt failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
