//! Mutable per-engine playback session.

use bridge_traits::{MediaId, NodeHandle};
use core_async::sync::CancellationToken;
use core_runtime::events::PlaybackEvent;

use crate::config::PlaybackState;
use crate::gain::GainController;
use crate::tracker::TimeTracker;

/// Everything the engine mutates, guarded by one lock.
///
/// Created once per engine and updated in place; only `stop` resets it.
#[derive(Debug)]
pub(crate) struct PlaybackSession {
    pub media_id: Option<MediaId>,
    pub state: PlaybackState,
    /// Device clock minus start offset, valid while `Playing`.
    pub started_at_clock: f64,
    /// Resume point, meaningful only while `Paused`.
    pub paused_at_offset: f64,
    pub tracker: TimeTracker,
    pub gain: GainController,
    /// Bumped on every `play`; completions carrying an older value are stale.
    pub generation: u64,
    pub node: Option<NodeHandle>,
    /// Cancels the tick loop and end watcher of the active node.
    pub cancel: Option<CancellationToken>,
}

impl PlaybackSession {
    pub fn new(tracker: TimeTracker, gain: GainController) -> Self {
        Self {
            media_id: None,
            state: PlaybackState::Idle,
            started_at_clock: 0.0,
            paused_at_offset: 0.0,
            tracker,
            gain,
            generation: 0,
            node: None,
            cancel: None,
        }
    }

    /// Offset to resume from when `id` is played again without an explicit
    /// offset.
    pub fn resume_offset_for(&self, id: &MediaId) -> Option<f64> {
        let same_track = self.media_id.as_ref() == Some(id);
        (self.state == PlaybackState::Paused && same_track).then_some(self.paused_at_offset)
    }

    /// `true` while `generation` is still the latest play request and its
    /// node is rendering.
    pub fn is_playing(&self, generation: u64) -> bool {
        self.generation == generation && self.state == PlaybackState::Playing
    }

    fn media_id_string(&self) -> String {
        self.media_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn time_update_event(&self) -> PlaybackEvent {
        PlaybackEvent::TimeUpdate {
            media_id: self.media_id_string(),
            position_ms: secs_to_ms(self.tracker.position()),
            duration_ms: secs_to_ms(self.tracker.duration()),
        }
    }

    pub fn ended_event(&self) -> PlaybackEvent {
        PlaybackEvent::AudioEnded {
            media_id: self.media_id_string(),
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            media_id: self.media_id.clone(),
            state: self.state,
            position: self.tracker.position(),
            duration: self.tracker.duration(),
            started_at_clock: self.started_at_clock,
            paused_at_offset: self.paused_at_offset,
            volume_percent: self.gain.percent(),
            gain: self.gain.gain(),
            generation: self.generation,
        }
    }
}

/// Point-in-time copy of the session, for diagnostics and UI sync.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub media_id: Option<MediaId>,
    pub state: PlaybackState,
    /// Tick-driven position estimate (seconds).
    pub position: f64,
    /// Length of the loaded buffer (seconds, 0 before the first load).
    pub duration: f64,
    pub started_at_clock: f64,
    pub paused_at_offset: f64,
    pub volume_percent: f64,
    pub gain: f64,
    pub generation: u64,
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0).round() as u64
}
