mod mic;
mod player;

pub use {mic::WavRecorder, player::WavPlayer};

use std::{path::PathBuf, time::Duration};

use crate::CoreResult;

/// Microphone capture seam used by the session controller.
///
/// Implementations own the platform stream and the clip being written.
/// Methods are cancel-safe from the controller's point of view: a failed
/// call leaves the device in its previous phase.
#[async_trait::async_trait]
pub trait CaptureDevice: Send {
    /// Begin capturing into a fresh clip at `clip`.
    async fn begin(&mut self, clip: PathBuf) -> CoreResult<()>;

    /// Suspend capture without finishing the clip.
    async fn pause(&mut self) -> CoreResult<()>;

    /// Resume a suspended capture.
    async fn resume(&mut self) -> CoreResult<()>;

    /// Finish capture and return the written clip.
    ///
    /// Returns `None` when nothing was captured, in which case no file
    /// is left behind.
    async fn finish(&mut self) -> CoreResult<Option<PathBuf>>;
}

/// Playback phase reported by a [`PlaybackDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No clip loaded.
    Idle,
    /// A clip is loaded and stopped or paused.
    Ready,
    /// Samples are being rendered.
    Playing,
    /// The clip ran to its end.
    Ended,
}

/// Clip playback seam used by the app shell.
#[async_trait::async_trait]
pub trait PlaybackDevice: Send {
    /// Load `clip` and prepare the output stream, replacing any
    /// previously loaded clip.
    async fn load(&mut self, clip: PathBuf) -> CoreResult<()>;

    /// Start or resume rendering. After the clip has ended, playback
    /// restarts from the beginning.
    async fn play(&mut self) -> CoreResult<()>;

    /// Pause rendering, keeping the position.
    async fn pause(&mut self) -> CoreResult<()>;

    /// Move the position back to the start of the clip.
    async fn seek_to_start(&mut self) -> CoreResult<()>;

    /// Change the playback rate multiplier.
    async fn set_rate(&mut self, rate: f32) -> CoreResult<()>;

    /// Elapsed playback time of the loaded clip.
    fn position(&self) -> Duration;

    /// Total duration of the loaded clip.
    fn duration(&self) -> Duration;

    /// Current playback phase.
    fn state(&self) -> PlayerState;
}
