use crate::{AppResult, Command, LineSource, Resolved};

use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use dictaphone_core::{
    CoreError, PlaybackDevice, PlayerState, RateCycle, SessionController, SessionStatus,
    format_clock, progress,
};
use tracing::{error, info, instrument};

/// Interval between status line refreshes.
const TICK: Duration = Duration::from_millis(250);

/// Terminal front end around the recording session.
///
/// Owns the session controller and the playback device; stdin arrives
/// through the shared line source. One command is handled at a time, so
/// session intents are naturally serialized and observers never see a
/// half-applied transition.
pub struct App {
    pub(crate) controller: SessionController,
    pub(crate) player: Box<dyn PlaybackDevice>,
    pub(crate) lines: LineSource,
    pub(crate) rate: RateCycle,
    pub(crate) loaded_clip: Option<PathBuf>,
    pub(crate) pending_delete: bool,
}

impl App {
    /// Run the main command loop until quit or end of input.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Dictaphone ready");
        println!("{}", Command::reference());

        let mut ticker = tokio::time::interval(TICK);

        loop {
            tokio::select! {
                line = Self::next_line(&self.lines) => {
                    match line {
                        Some(line) => {
                            if !self.handle_line(line).await {
                                break;
                            }
                        }
                        None => {
                            info!("Input closed, shutting down");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => self.render_status(),
            }
        }

        // Don't lose an in-flight take on exit.
        if self.controller.session().status.is_active() {
            info!("Stopping the take in progress before exit");
            self.controller.stop().await?;
            if let Some(clip) = self.controller.session().clip {
                self.notify(&format!("Saved {}", clip.display()));
            }
        }
        let _ = self.player.pause().await;

        println!();
        info!("Dictaphone shut down");

        Ok(())
    }

    async fn next_line(lines: &LineSource) -> Option<String> {
        lines.lock().await.recv().await
    }

    /// Handle one line of input. Returns `false` to quit.
    pub(crate) async fn handle_line(&mut self, line: String) -> bool {
        if self.pending_delete {
            self.finish_delete(&line).await;
            return true;
        }

        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                self.notify(&format!(
                    "Unrecognized command {:?}. h for help.",
                    line.trim()
                ));
            }
            return true;
        };

        match command {
            Command::Record => {
                if let Err(e) = self.controller.record_or_stop().await {
                    self.report_error(&e);
                }
            }
            Command::Pause => {
                if let Err(e) = self.controller.pause_or_resume().await {
                    self.report_error(&e);
                }
            }
            Command::Play => self.toggle_playback().await,
            Command::Rate => self.cycle_rate().await,
            Command::Delete => self.begin_delete(),
            Command::Help => self.notify(Command::reference()),
            Command::Quit => return false,
        }

        true
    }

    /// Load the stopped take if it isn't loaded yet, then toggle
    /// between playing and paused.
    async fn toggle_playback(&mut self) {
        let session = self.controller.session();
        if session.status != SessionStatus::Stopped {
            self.notify("Nothing to play. Stop a recording first.");
            return;
        }
        let Some(clip) = session.clip else {
            self.notify("The last take was empty. Nothing to play.");
            return;
        };

        if self.loaded_clip.as_deref() != Some(clip.as_path()) {
            if let Err(e) = self.player.load(clip.clone()).await {
                self.report_error(&e);
                return;
            }
            // A freshly loaded clip always starts at normal speed.
            self.rate = RateCycle::new();
            self.loaded_clip = Some(clip);
        }

        let result = match self.player.state() {
            PlayerState::Playing => self.player.pause().await,
            _ => self.player.play().await,
        };
        if let Err(e) = result {
            self.report_error(&e);
        }
    }

    /// Advance the rate cycle, keeping the old rate if the device
    /// refuses the new one.
    async fn cycle_rate(&mut self) {
        if self.loaded_clip.is_none() {
            self.notify("Load a take with play before changing the rate.");
            return;
        }

        let next = self.rate.advance();
        if let Err(e) = self.player.set_rate(next.current()).await {
            self.report_error(&e);
            return;
        }

        self.rate = next;
        self.notify(&format!("Playback rate {}x", next.current()));
    }

    fn begin_delete(&mut self) {
        if self.controller.session().status != SessionStatus::Stopped {
            self.notify("Nothing to delete. Only a stopped take can be deleted.");
            return;
        }

        self.pending_delete = true;
        self.notify("Delete the current recording? [y/N]");
    }

    /// Resolve a pending delete confirmation with the next input line.
    async fn finish_delete(&mut self, line: &str) {
        self.pending_delete = false;
        let confirmed = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");

        if !confirmed {
            self.notify("Kept the recording.");
            return;
        }

        if self.loaded_clip.is_some() && self.loaded_clip == self.controller.session().clip {
            let _ = self.player.pause().await;
            self.loaded_clip = None;
        }

        if let Err(e) = self.controller.reset(&Resolved(true)).await {
            self.report_error(&e);
            return;
        }

        self.notify("Recording deleted.");
    }

    fn render_status(&self) {
        let session = self.controller.session();
        let line = match session.status {
            SessionStatus::Idle => "[IDLE] r to record, h for help".to_string(),
            SessionStatus::Recording => {
                format!("[REC {}]", format_clock(self.controller.elapsed()))
            }
            SessionStatus::Paused => {
                format!("[PAUSED {}]", format_clock(self.controller.elapsed()))
            }
            SessionStatus::Stopped => self.stopped_line(session.clip.as_deref()),
        };

        print!("\r{line:<72}");
        let _ = std::io::stdout().flush();
    }

    fn stopped_line(&self, clip: Option<&Path>) -> String {
        let Some(clip) = clip else {
            return "[STOPPED] empty take, r to record again".to_string();
        };

        let name = clip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| clip.display().to_string());

        if self.loaded_clip.as_deref() != Some(clip) {
            return format!("[STOPPED {name}] play to listen, d to delete");
        }

        let marker = match self.player.state() {
            PlayerState::Playing => "playing",
            PlayerState::Ended => "ended",
            PlayerState::Ready | PlayerState::Idle => "ready",
        };
        let pct = match progress(self.player.position(), self.player.duration()) {
            Some(ratio) => format!("{:.0}%", ratio * 100.0),
            None => "--".to_string(),
        };

        format!("[STOPPED {name}] {marker} {pct} @{}x", self.rate.current())
    }

    /// Print a message on its own line, clearing the status line first.
    fn notify(&self, message: &str) {
        print!("\r{:72}\r", "");
        println!("{message}");
    }

    fn report_error(&self, error: &CoreError) {
        error!(error = %error, "Command failed");
        self.notify(&format!("error: {error} (you can try the command again)"));
    }
}
