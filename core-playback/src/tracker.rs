//! Tick-driven playback position estimate.

/// Position estimate for the loaded buffer.
///
/// The estimate advances by a fixed step per tick rather than following a
/// clock, and never leaves `[0, duration]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTracker {
    position: f64,
    duration: f64,
    step: f64,
    tolerance: f64,
}

impl TimeTracker {
    pub fn new(step: f64, tolerance: f64) -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            step,
            tolerance,
        }
    }

    /// Start tracking a new buffer at `offset`.
    pub fn reset(&mut self, offset: f64, duration: f64) {
        self.duration = duration.max(0.0);
        self.position = offset.clamp(0.0, self.duration);
    }

    /// Advance one tick and return the new position.
    pub fn tick(&mut self) -> f64 {
        self.position = (self.position + self.step).min(self.duration);
        self.position
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// `true` once the estimate is within tolerance of the end.
    pub fn is_complete(&self) -> bool {
        self.position >= self.duration - self.tolerance
    }
}
