use std::time::Duration;

use tokio::time::Instant;

/// Stopwatch behind the recording clock.
///
/// Accumulates wall time across pause/resume so the clock shows time
/// actually spent recording, not time since the session began. Uses the
/// Tokio clock so tests can drive it deterministically.
#[derive(Debug)]
pub struct RecordingTimer {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl RecordingTimer {
    /// A stopped clock at zero.
    pub fn new() -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: None,
        }
    }

    /// Start a fresh clock, discarding any previous elapsed time.
    pub fn start(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    /// Freeze the clock, keeping the elapsed time.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    /// Continue a frozen clock. No-op while running.
    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Return the clock to zero, stopped.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }

    /// Time spent running so far.
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }
}

impl Default for RecordingTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a duration as a zero-padded `MM:SS` clock.
///
/// Minutes are not wrapped at an hour; an hour-long take reads `61:23`.
pub fn format_clock(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
