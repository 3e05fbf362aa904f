//! Workspace facade crate.
//!
//! Host applications depend on `player-workspace` and get the bridge traits
//! they must implement, plus (with the default `playback` feature) the
//! runtime and the playback engine, without wiring each crate individually.

pub use bridge_traits;

#[cfg(feature = "playback")]
pub use core_playback;
#[cfg(feature = "playback")]
pub use core_runtime;

#[cfg(feature = "playback")]
pub use core_playback::{
    PlayOutcome, PlayRequest, PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackState,
};
#[cfg(feature = "playback")]
pub use core_runtime::{
    config::CoreConfig,
    events::{EventBus, PlaybackEvent, PlaybackEventKind},
};
