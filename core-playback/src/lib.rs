//! # Playback Module
//!
//! Single-track playback controller for the player core.
//!
//! ## Overview
//!
//! This crate handles:
//! - Loading tracks once through the host [`Loader`](bridge_traits::Loader) and caching
//!   the decoded buffers
//! - Driving the host [`AudioDevice`](bridge_traits::AudioDevice) through play/pause/seek/stop
//! - Tick-driven position tracking and end-of-track detection
//! - Volume to device gain mapping
//! - Publishing `audioTimeUpdate` / `audioEnded` on the event bus and to registered listeners
//!
//! The entry point is [`PlaybackEngine`].

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod gain;
pub mod tracker;

pub use cache::{BufferCache, CacheStats};
pub use config::{PlaybackConfig, PlaybackState};
pub use dispatcher::{EventDispatcher, Listener};
pub use engine::{PlayOutcome, PlayRequest, PlaybackEngine, PlaybackSnapshot};
pub use error::{PlaybackError, Result};
pub use gain::GainController;
pub use tracker::TimeTracker;
