use serde::{Deserialize, Serialize};

/// Game-time bookkeeping for a match.
///
/// The host advances game time with `advance`; the clock reports how many
/// whole-second timer ticks are due so the countdown keeps a fixed cadence
/// regardless of frame rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchClock {
    now: f32,
    tick_accumulator: f32,
    start: Option<f32>,
    end: Option<f32>,
}

impl MatchClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance game time by `delta` seconds and return the number of
    /// one-second ticks that became due.
    ///
    /// Non-finite and non-positive deltas are ignored.
    pub fn advance(&mut self, delta: f32) -> u32 {
        if !delta.is_finite() || delta <= 0.0 {
            return 0;
        }
        self.now += delta;
        self.tick_accumulator += delta;

        let ticks = self.tick_accumulator.floor();
        self.tick_accumulator -= ticks;
        // `as` saturates for floats above u32::MAX.
        ticks as u32
    }

    /// Current game time in seconds.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn mark_start(&mut self) {
        self.start = Some(self.now);
        self.end = None;
    }

    pub fn mark_end(&mut self) {
        if self.start.is_some() && self.end.is_none() {
            self.end = Some(self.now);
        }
    }

    /// Seconds the match has been (or was) in session. Zero before the coin flip.
    #[must_use]
    pub fn match_time_seconds(&self) -> f32 {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start,
            (Some(start), None) => self.now - start,
            _ => 0.0,
        }
    }
}

/// Format seconds as `H:MM:SS`.
///
/// ```
/// use tower_conquest::flow::format_match_time;
///
/// assert_eq!(format_match_time(3725.4), "1:02:05");
/// assert_eq!(format_match_time(59.9), "0:00:59");
/// ```
#[must_use]
pub fn format_match_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}
