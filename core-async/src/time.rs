//! Time-related abstractions.
//!
//! Re-exports Tokio's timer wheel primitives. With the `test-util` feature the
//! clock can be paused and advanced manually, which the playback tests rely on
//! to count ticks instead of measuring wall-clock time.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{interval, Duration};
//!
//! async fn example() {
//!     let mut ticker = interval(Duration::from_millis(500));
//!     ticker.tick().await; // completes immediately
//!     ticker.tick().await; // completes after 500ms
//! }
//! ```

pub use tokio::time::{
    error::Elapsed, interval, interval_at, sleep, sleep_until, timeout, Interval,
    MissedTickBehavior, Sleep, Timeout,
};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
pub use tokio::time::Instant;

#[cfg(feature = "test-util")]
pub use tokio::time::{advance, pause, resume};

/// Creates an interval whose first tick fires one full `period` from now.
///
/// Tokio's [`interval`] completes its first tick immediately; periodic loops
/// that must wait a whole period before their first callback use this
/// instead.
pub fn delayed_interval(period: Duration) -> Interval {
    interval_at(Instant::now() + period, period)
}

/// Converts fractional seconds to a [`Duration`], saturating negative and
/// non-finite inputs to zero.
pub fn duration_from_secs_f64(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}
