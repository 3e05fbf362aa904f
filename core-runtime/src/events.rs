//! # Event Bus System
//!
//! Process-wide publication of playback lifecycle events using
//! `tokio::sync::broadcast` (through `core_async::sync`).
//!
//! ## Overview
//!
//! - **PlaybackEvent**: the two lifecycle events the engine publishes
//!   (`audioTimeUpdate` on every tick, `audioEnded` once per finished track)
//! - **EventBus**: cloneable broadcast sender
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, PlaybackEvent};
//!
//! # core_async::runtime::block_on(async {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(PlaybackEvent::AudioEnded { media_id: "track-1".into() }).ok();
//! assert_eq!(rx.recv().await.unwrap().kind().as_str(), "audioEnded");
//! # });
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events (a slow UI
//!   dropping time updates). Non-fatal.
//! - **`RecvError::Closed`**: every sender was dropped; the engine is gone.
//!
//! Emitting with no subscribers returns `SendError`; publishers treat that as
//! "nobody is listening", not as a failure.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// At the default tick cadence this holds 50 seconds of time updates for a
/// stalled subscriber before it starts lagging.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Playback Events
// ============================================================================

/// Kind of a playback lifecycle event.
///
/// The string names are the keys UI code subscribes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    #[serde(rename = "audioTimeUpdate")]
    TimeUpdate,
    #[serde(rename = "audioEnded")]
    AudioEnded,
}

impl PlaybackEventKind {
    pub const ALL: [PlaybackEventKind; 2] =
        [PlaybackEventKind::TimeUpdate, PlaybackEventKind::AudioEnded];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackEventKind::TimeUpdate => "audioTimeUpdate",
            PlaybackEventKind::AudioEnded => "audioEnded",
        }
    }
}

impl fmt::Display for PlaybackEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackEventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audioTimeUpdate" | "time-update" => Ok(PlaybackEventKind::TimeUpdate),
            "audioEnded" | "audio-ended" => Ok(PlaybackEventKind::AudioEnded),
            other => Err(crate::Error::Config(format!("Unknown playback event kind: {}", other))),
        }
    }
}

/// Events published by the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Playback position advanced (emitted on start and on every tick).
    #[serde(rename = "audioTimeUpdate")]
    TimeUpdate {
        media_id: String,
        /// Position estimate (milliseconds).
        position_ms: u64,
        /// Length of the loaded buffer (milliseconds).
        duration_ms: u64,
    },
    /// The track played to its end.
    #[serde(rename = "audioEnded")]
    AudioEnded { media_id: String },
}

impl PlaybackEvent {
    pub fn kind(&self) -> PlaybackEventKind {
        match self {
            PlaybackEvent::TimeUpdate { .. } => PlaybackEventKind::TimeUpdate,
            PlaybackEvent::AudioEnded { .. } => PlaybackEventKind::AudioEnded,
        }
    }

    pub fn media_id(&self) -> &str {
        match self {
            PlaybackEvent::TimeUpdate { media_id, .. } => media_id,
            PlaybackEvent::AudioEnded { media_id } => media_id,
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlaybackEvent::TimeUpdate { .. } => "Playback position updated",
            PlaybackEvent::AudioEnded { .. } => "Track ended",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to playback events.
///
/// Cloning the bus clones the sender; every clone publishes to the same set
/// of subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none.
    pub fn emit(&self, event: PlaybackEvent) -> Result<usize, SendError<PlaybackEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&PlaybackEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, PlaybackEventKind};
///
/// let bus = EventBus::default();
/// let ended_only = EventStream::new(bus.subscribe()).only(PlaybackEventKind::AudioEnded);
/// ```
pub struct EventStream {
    receiver: Receiver<PlaybackEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<PlaybackEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only yield events matching `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlaybackEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only yield events of one kind.
    pub fn only(self, kind: PlaybackEventKind) -> Self {
        self.filter(move |event| event.kind() == kind)
    }

    fn accepts(&self, event: &PlaybackEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<PlaybackEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<PlaybackEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
