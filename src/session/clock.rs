/// Elapsed-time source for interactive playback, in milliseconds.
///
/// Callers pass their own `now` so the clock works with any time base. Elapsed never decreases
/// while running, freezes while paused and does not count the paused span after a resume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackClock {
    running_since: Option<f64>,
    banked_ms: f64,
    high_water_ms: f64,
    started: bool,
}

impl PlaybackClock {
    /// Stopped clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from zero at `now_ms`.
    pub fn start(&mut self, now_ms: f64) {
        *self = Self {
            running_since: Some(now_ms),
            banked_ms: 0.0,
            high_water_ms: 0.0,
            started: true,
        };
    }

    /// Freeze elapsed at its value for `now_ms`.
    pub fn pause(&mut self, now_ms: f64) {
        if self.running_since.is_some() {
            self.banked_ms = self.elapsed(now_ms);
            self.running_since = None;
        }
    }

    /// Continue counting from `now_ms`.
    pub fn resume(&mut self, now_ms: f64) {
        if self.started && self.running_since.is_none() {
            self.running_since = Some(now_ms);
        }
    }

    /// Reset to the stopped state; the next start begins at zero.
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Whether the clock is counting.
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Whether the clock was started and not stopped.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Elapsed ms at `now_ms`; never less than any value returned before.
    pub fn elapsed(&mut self, now_ms: f64) -> f64 {
        let live = match self.running_since {
            Some(since) if now_ms.is_finite() => (now_ms - since).max(0.0),
            _ => 0.0,
        };
        self.high_water_ms = self.high_water_ms.max(self.banked_ms + live);
        self.high_water_ms
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/clock.rs"]
mod tests;
