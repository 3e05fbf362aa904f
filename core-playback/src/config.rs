//! # Playback Configuration
//!
//! Tunables for the playback engine and the session state enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Playback engine configuration.
///
/// Controls the position tick cadence, end-of-track detection, the initial
/// output volume and the optional load timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Period of the position tick while playing.
    ///
    /// Every tick advances the position estimate and emits `audioTimeUpdate`.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// Seconds added to the position estimate on each tick.
    ///
    /// The estimate is tick-driven, not clock-derived, so this normally equals
    /// `tick_interval` in seconds.
    ///
    /// Default: 0.5.
    #[serde(default = "default_tick_step")]
    pub tick_step: f64,

    /// A track counts as finished once `position >= duration - completion_tolerance`.
    ///
    /// Default: 1e-3 seconds.
    #[serde(default = "default_completion_tolerance")]
    pub completion_tolerance: f64,

    /// Volume applied before the first `set_volume` call, in percent.
    ///
    /// Default: 100.
    #[serde(default = "default_initial_volume_percent")]
    pub initial_volume_percent: f64,

    /// Device gain corresponding to 0% volume. Must be negative.
    ///
    /// Default: -1.0.
    #[serde(default = "default_min_gain")]
    pub min_gain: f64,

    /// Upper bound on a single fetch-and-decode.
    ///
    /// `None` waits for the loader indefinitely.
    ///
    /// Default: `None`.
    #[serde(default)]
    pub load_timeout: Option<Duration>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            tick_step: default_tick_step(),
            completion_tolerance: default_completion_tolerance(),
            initial_volume_percent: default_initial_volume_percent(),
            min_gain: default_min_gain(),
            load_timeout: None,
        }
    }
}

impl PlaybackConfig {
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn with_initial_volume(mut self, percent: f64) -> Self {
        self.initial_volume_percent = percent;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("tick_interval must be > 0".to_string());
        }

        if !self.tick_step.is_finite() || self.tick_step <= 0.0 {
            return Err("tick_step must be a positive number".to_string());
        }

        if !self.completion_tolerance.is_finite() || self.completion_tolerance < 0.0 {
            return Err("completion_tolerance must be >= 0".to_string());
        }

        if !(0.0..=100.0).contains(&self.initial_volume_percent) {
            return Err("initial_volume_percent must be between 0 and 100".to_string());
        }

        if !self.min_gain.is_finite() || self.min_gain >= 0.0 {
            return Err("min_gain must be a negative number".to_string());
        }

        if matches!(self.load_timeout, Some(t) if t.is_zero()) {
            return Err("load_timeout must be > 0 when set".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_tick_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_tick_step() -> f64 {
    0.5
}

fn default_completion_tolerance() -> f64 {
    1e-3
}

fn default_initial_volume_percent() -> f64 {
    100.0
}

fn default_min_gain() -> f64 {
    -1.0
}

// ============================================================================
// Playback State
// ============================================================================

/// State of the playback session.
///
/// ```text
/// Idle -> Loading -> Playing <-> Paused
///            ^          |          |
///            |          v          v
///            +------ Stopped <-----+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing has been played yet.
    Idle,
    /// Waiting for the loader to deliver the requested track.
    Loading,
    /// A device node is rendering.
    Playing,
    /// Rendering stopped; the offset is kept for resume.
    Paused,
    /// Rendering stopped; resume offset discarded.
    Stopped,
}

impl PlaybackState {
    /// Returns `true` while a device node is allocated.
    pub fn has_active_node(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
