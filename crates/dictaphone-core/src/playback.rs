use std::time::Duration;

/// Rate multipliers the rate control cycles through. Index 1 is normal
/// speed and is where a fresh cycle starts.
pub const PLAYBACK_RATES: [f32; 3] = [0.5, 1.0, 2.0];

/// Cyclic selector over [`PLAYBACK_RATES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCycle {
    index: usize,
}

impl RateCycle {
    /// A fresh cycle at normal speed.
    pub fn new() -> Self {
        Self { index: 1 }
    }

    /// A cycle positioned at `index`, wrapped into range. Any number of
    /// advances from the start lands on `from_index(1 + advances)`.
    pub fn from_index(index: usize) -> Self {
        Self {
            index: index % PLAYBACK_RATES.len(),
        }
    }

    /// The selected rate multiplier.
    pub fn current(self) -> f32 {
        PLAYBACK_RATES[self.index]
    }

    /// Move to the next rate, wrapping after the fastest.
    pub fn advance(self) -> Self {
        Self {
            index: (self.index + 1) % PLAYBACK_RATES.len(),
        }
    }
}

impl Default for RateCycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Fraction of the clip played, if defined.
///
/// Undefined (`None`) before playback has moved off zero and for clips
/// with no duration; otherwise the ratio, capped at 1.0 so rounding in
/// the position can never overshoot the end.
pub fn progress(elapsed: Duration, total: Duration) -> Option<f64> {
    if elapsed.is_zero() || total.is_zero() {
        return None;
    }

    Some((elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0))
}
