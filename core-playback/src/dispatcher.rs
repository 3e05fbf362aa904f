//! # Event Dispatcher
//!
//! Delivers playback lifecycle events to two audiences:
//!
//! - the process-wide [`EventBus`] (UI components subscribe there)
//! - callbacks registered directly on the engine with
//!   [`add_listener`](EventDispatcher::add_listener)
//!
//! Every dispatch publishes on the bus first and then calls the registered
//! listeners for the event's kind in registration order. A batch (the final
//! time update plus `audioEnded`) is fully published before any listener
//! runs, so a listener reacting to the first event cannot slip its own events
//! in between. Listeners run on the
//! dispatching task with no engine lock held, so they may call back into the
//! engine.

use core_runtime::events::{EventBus, PlaybackEvent, PlaybackEventKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Callback invoked with each dispatched event of the registered kind.
pub type Listener = Arc<dyn Fn(&PlaybackEvent) + Send + Sync>;

pub struct EventDispatcher {
    bus: EventBus,
    listeners: Mutex<HashMap<PlaybackEventKind, Vec<Listener>>>,
}

impl EventDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            listeners: Mutex::new(HashMap::new()),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Append a listener for `kind`.
    pub fn add_listener<F>(&self, kind: PlaybackEventKind, listener: F)
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .entry(kind)
            .or_default()
            .push(Arc::new(listener));
    }

    /// Remove every listener registered for `kind`. Returns how many were removed.
    pub fn remove_listener(&self, kind: PlaybackEventKind) -> usize {
        self.listeners
            .lock()
            .remove(&kind)
            .map_or(0, |removed| removed.len())
    }

    pub fn listener_count(&self, kind: PlaybackEventKind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Publish `event` on the bus, then call the listeners for its kind.
    ///
    /// Must not be called while holding the session lock.
    pub fn dispatch(&self, event: PlaybackEvent) {
        self.dispatch_all([event]);
    }

    /// Publish every event on the bus, then call the listeners of each event
    /// in order.
    pub fn dispatch_all(&self, events: impl IntoIterator<Item = PlaybackEvent>) {
        let events: Vec<PlaybackEvent> = events.into_iter().collect();

        for event in &events {
            if self.bus.emit(event.clone()).is_err() {
                trace!(event = %event.kind(), "No bus subscribers");
            }
        }

        for event in &events {
            for listener in self.snapshot(event.kind()) {
                listener(event);
            }
        }
    }

    // Cloned so listeners can (un)register without deadlocking.
    fn snapshot(&self, kind: PlaybackEventKind) -> Vec<Listener> {
        self.listeners
            .lock()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("EventDispatcher")
            .field("bus", &self.bus)
            .field(
                "listeners",
                &listeners
                    .iter()
                    .map(|(kind, list)| (kind.as_str(), list.len()))
                    .collect::<HashMap<_, _>>(),
            )
            .finish()
    }
}
