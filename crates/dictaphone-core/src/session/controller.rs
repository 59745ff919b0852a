use crate::{
    CoreError, CoreResult, RecordingTimer,
    device::CaptureDevice,
    session::{
        dispatch::{HoldAction, RecordAction, hold_control, record_control},
        state::{RecordingSession, SessionEvent, SessionStatus, transition},
    },
};

use std::{panic::Location, path::PathBuf, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Confirmation seam for destructive actions.
///
/// Callers that have already collected an answer can pass it through a
/// pre-resolved implementation; interactive shells prompt here.
#[async_trait::async_trait]
pub trait ConfirmPrompt: Send + Sync {
    /// Ask the user to confirm `action`. Returns `true` to proceed.
    async fn confirm(&self, action: &str) -> CoreResult<bool>;
}

/// Serialized front door to the recording session.
///
/// Owns the capture device, the session state, and the recording clock.
/// Intents take `&mut self`, so at most one is in flight at a time and
/// observers only ever see states the transition table allows. Device
/// calls happen before the matching event is applied; a failed call
/// therefore leaves the session exactly where it was.
pub struct SessionController {
    session_id: Uuid,
    device: Box<dyn CaptureDevice>,
    clip_dir: PathBuf,
    session_tx: watch::Sender<RecordingSession>,
    timer: RecordingTimer,
}

impl SessionController {
    /// Create a controller writing clips under `clip_dir`.
    pub fn new(device: Box<dyn CaptureDevice>, clip_dir: PathBuf) -> Self {
        let session_id = Uuid::new_v4();
        let (session_tx, _) = watch::channel(RecordingSession::new());

        info!(session_id = %session_id, clip_dir = ?clip_dir, "Session controller created");

        Self {
            session_id,
            device,
            clip_dir,
            session_tx,
            timer: RecordingTimer::new(),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> RecordingSession {
        self.session_tx.borrow().clone()
    }

    /// Watch session transitions.
    pub fn subscribe(&self) -> watch::Receiver<RecordingSession> {
        self.session_tx.subscribe()
    }

    /// Time spent recording in the current take.
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Begin capturing a fresh clip. No-op unless idle or stopped.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn start(&mut self) -> CoreResult<()> {
        let status = self.session().status;
        if status.is_active() {
            debug!(?status, "Start ignored");
            return Ok(());
        }

        let clip = self.clip_dir.join(format!("{}.wav", Uuid::new_v4()));
        self.device.begin(clip).await?;
        self.timer.start();
        self.apply(SessionEvent::Start);

        info!("Recording started");

        Ok(())
    }

    /// Suspend the capture in progress. No-op unless recording.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn pause(&mut self) -> CoreResult<()> {
        let status = self.session().status;
        if status != SessionStatus::Recording {
            debug!(?status, "Pause ignored");
            return Ok(());
        }

        self.device.pause().await?;
        self.timer.pause();
        self.apply(SessionEvent::Pause);

        info!("Recording paused");

        Ok(())
    }

    /// Resume a suspended capture. No-op unless paused.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn resume(&mut self) -> CoreResult<()> {
        let status = self.session().status;
        if status != SessionStatus::Paused {
            debug!(?status, "Resume ignored");
            return Ok(());
        }

        self.device.resume().await?;
        self.timer.resume();
        self.apply(SessionEvent::Resume);

        info!("Recording resumed");

        Ok(())
    }

    /// Finish the capture and land on the produced clip. No-op unless
    /// recording or paused.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn stop(&mut self) -> CoreResult<()> {
        let status = self.session().status;
        if !status.is_active() {
            debug!(?status, "Stop ignored");
            return Ok(());
        }

        let clip = self.device.finish().await?;
        self.timer.pause();
        self.apply(SessionEvent::Stop { clip: clip.clone() });

        info!(clip = ?clip, "Recording stopped");

        Ok(())
    }

    /// Discard the stopped session after confirmation. No-op unless
    /// stopped; declining the confirmation leaves everything in place.
    #[instrument(skip(self, prompt), fields(session_id = %self.session_id))]
    pub async fn reset(&mut self, prompt: &dyn ConfirmPrompt) -> CoreResult<()> {
        let session = self.session();
        if session.status != SessionStatus::Stopped {
            debug!(status = ?session.status, "Reset ignored");
            return Ok(());
        }

        if !prompt.confirm("Delete the current recording").await? {
            debug!("Reset declined");
            return Ok(());
        }

        if let Some(clip) = session.clip {
            match std::fs::remove_file(&clip) {
                Ok(()) => info!(clip = ?clip, "Clip deleted"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(clip = ?clip, "Clip already missing")
                }
                Err(e) => {
                    return Err(CoreError::ClipIo {
                        path: clip,
                        source: e,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }

        self.timer.reset();
        self.apply(SessionEvent::Reset);

        info!("Session reset");

        Ok(())
    }

    /// Dispatch the record control: start when idle or stopped, stop
    /// when a capture is underway.
    pub async fn record_or_stop(&mut self) -> CoreResult<()> {
        match record_control(self.session().status) {
            RecordAction::Start => self.start().await,
            RecordAction::Stop => self.stop().await,
        }
    }

    /// Dispatch the hold control: pause when recording, resume when
    /// paused, nothing otherwise.
    pub async fn pause_or_resume(&mut self) -> CoreResult<()> {
        match hold_control(self.session().status) {
            Some(HoldAction::Pause) => self.pause().await,
            Some(HoldAction::Resume) => self.resume().await,
            None => {
                debug!("Hold control inert");
                Ok(())
            }
        }
    }

    fn apply(&self, event: SessionEvent) {
        self.session_tx
            .send_modify(|session| *session = transition(session, event));
    }
}
