//! # Playback Engine
//!
//! Single-track playback state machine.
//!
//! ## Overview
//!
//! ```text
//! Idle --play--> Loading --buffer ready--> Playing --pause--> Paused
//!                   ^                        |  ^               |
//!                   |                        |  +-----play------+
//!                   +------play------ Stopped <--stop / end------+
//! ```
//!
//! `play` consults the [`BufferCache`](crate::cache::BufferCache); on a miss
//! it spawns a load task. Every `play` bumps the session generation, and a
//! completion (load, tick, device end signal) only acts when its captured
//! generation is still current. That is the only guard against overlapping
//! requests: `play(A)` followed by `play(B)` always ends up playing `B`,
//! whichever load finishes first.
//!
//! While playing, a tick task advances the position estimate every
//! `tick_interval` and publishes `audioTimeUpdate`; once the estimate reaches
//! the end of the buffer the session stops and `audioEnded` is published
//! exactly once.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlaybackEngine};
//!
//! let engine = PlaybackEngine::new(core_config, PlaybackConfig::default())?;
//! engine.play("https://cdn.example/track.mp3", None)?.await?;
//! engine.set_volume(40.0)?;
//! engine.pause()?;
//! engine.play("https://cdn.example/track.mp3", None)?.await?; // resumes
//! ```

mod request;
mod session;

pub use request::{PlayOutcome, PlayRequest};
pub use session::PlaybackSnapshot;

use bridge_traits::{AudioDevice, CredentialProvider, DecodedBuffer, Loader, MediaId, NodeHandle};
use core_async::sync::CancellationToken;
use core_async::time::{delayed_interval, timeout, Interval};
use core_runtime::config::CoreConfig;
use core_runtime::events::{PlaybackEvent, PlaybackEventKind, Receiver};
use core_runtime::logging::redact_media_id;
use futures::future::{select, Either};
use futures::pin_mut;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{BufferCache, CacheStats};
use crate::config::{PlaybackConfig, PlaybackState};
use crate::dispatcher::EventDispatcher;
use crate::error::{PlaybackError, Result};
use crate::gain::GainController;
use crate::tracker::TimeTracker;
use session::PlaybackSession;

/// Single-track playback controller.
///
/// Must be driven from inside an async runtime: loads, ticks and end-of-track
/// detection run on spawned tasks. Dropping the engine stops playback.
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    device: Arc<dyn AudioDevice>,
    loader: Arc<dyn Loader>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    cache: BufferCache,
    dispatcher: EventDispatcher,
    config: PlaybackConfig,
    session: Mutex<PlaybackSession>,
}

/// A node that just started rendering; its background tasks are launched
/// after the session lock is released.
struct Started {
    generation: u64,
    node: NodeHandle,
    cancel: CancellationToken,
    update: PlaybackEvent,
}

enum TickOutcome {
    Continue(PlaybackEvent),
    Finished {
        update: PlaybackEvent,
        ended: PlaybackEvent,
    },
    Halt,
}

impl PlaybackEngine {
    /// Create an engine over the collaborators in `core`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::Config`] if `config` or the device gain range is invalid
    /// - [`PlaybackError::AudioDeviceError`] if the initial gain is rejected
    pub fn new(core: CoreConfig, config: PlaybackConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|msg| PlaybackError::Config(core_runtime::Error::Config(msg)))?;
        core.validate()?;

        let gain = GainController::new(
            core.device.gain_range(),
            config.min_gain,
            config.initial_volume_percent,
        )
        .map_err(|err| PlaybackError::Config(core_runtime::Error::Config(err.to_string())))?;
        core.device
            .set_gain(gain.gain())
            .map_err(PlaybackError::from_device)?;

        let tracker = TimeTracker::new(config.tick_step, config.completion_tolerance);

        Ok(Self {
            inner: Arc::new(EngineInner {
                device: core.device,
                loader: core.loader,
                credentials: core.credentials,
                cache: BufferCache::new(),
                dispatcher: EventDispatcher::new(core.event_bus),
                config,
                session: Mutex::new(PlaybackSession::new(tracker, gain)),
            }),
        })
    }

    /// Play `id`, restarting from `offset` seconds.
    ///
    /// Any current playback is stopped first. Without an explicit positive
    /// offset, `id` resumes from the paused position only when the session is
    /// paused on that same media id; any other id, or a session that is not
    /// paused, starts from 0. Offsets past the end are clamped to the buffer
    /// duration.
    ///
    /// # Errors
    ///
    /// Synchronously: [`PlaybackError::InvalidArgument`] for a negative or
    /// non-finite offset. Load, decode and device failures are delivered
    /// through the returned [`PlayRequest`].
    pub fn play(&self, id: impl Into<MediaId>, offset: Option<f64>) -> Result<PlayRequest> {
        self.inner.play(id.into(), offset)
    }

    /// Pause playback, remembering the device-clock position for resume.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::InvalidState`] unless currently playing.
    pub fn pause(&self) -> Result<()> {
        self.inner.pause()
    }

    /// Stop playback and discard the resume position. Safe in every state.
    pub fn stop(&self) {
        let mut session = self.inner.session.lock();
        self.inner.stop_locked(&mut session);
    }

    /// Restart the current track at `seconds`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::InvalidArgument`] for a negative or non-finite target
    /// - [`PlaybackError::InvalidState`] unless currently playing
    pub fn seek(&self, seconds: f64) -> Result<PlayRequest> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlaybackError::InvalidArgument(format!(
                "seek target must be a finite, non-negative number of seconds, got {}",
                seconds
            )));
        }

        let id = {
            let session = self.inner.session.lock();
            match (&session.media_id, session.state) {
                (Some(id), PlaybackState::Playing) => id.clone(),
                (_, state) => {
                    return Err(PlaybackError::InvalidState {
                        operation: "seek",
                        state,
                    })
                }
            }
        };

        self.inner.play(id, Some(seconds))
    }

    /// Set the output volume in percent (0 to 100).
    ///
    /// The stored volume only changes once the device has accepted the new
    /// gain; on error [`volume`](Self::volume) still reports the previous value.
    pub fn set_volume(&self, percent: f64) -> Result<()> {
        let mut session = self.inner.session.lock();
        let mut next = session.gain.clone();
        let gain = next.set_volume(percent)?;
        self.inner
            .device
            .set_gain(gain)
            .map_err(PlaybackError::from_device)?;
        session.gain = next;
        Ok(())
    }

    /// Current device gain (not the percent).
    pub fn volume(&self) -> f64 {
        self.inner.session.lock().gain.gain()
    }

    pub fn volume_percent(&self) -> f64 {
        self.inner.session.lock().gain.percent()
    }

    /// Tick-driven position estimate in seconds.
    pub fn current_time(&self) -> f64 {
        self.inner.session.lock().tracker.position()
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.session.lock().state
    }

    pub fn current_media_id(&self) -> Option<MediaId> {
        self.inner.session.lock().media_id.clone()
    }

    /// Duration of the most recently started buffer (0 before the first start).
    pub fn duration(&self) -> f64 {
        self.inner.session.lock().tracker.duration()
    }

    pub fn load_generation(&self) -> u64 {
        self.inner.session.lock().generation
    }

    pub fn is_cached(&self, id: &MediaId) -> bool {
        self.inner.cache.contains(id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.session.lock().snapshot()
    }

    /// Register a callback for one event kind. Callbacks run after the event
    /// is published on the bus, in registration order.
    pub fn add_listener<F>(&self, kind: PlaybackEventKind, listener: F)
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        self.inner.dispatcher.add_listener(kind, listener);
    }

    /// Remove every callback registered for `kind`.
    pub fn remove_listener(&self, kind: PlaybackEventKind) -> usize {
        self.inner.dispatcher.remove_listener(kind)
    }

    /// Subscribe to the engine's event bus.
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        self.inner.dispatcher.bus().subscribe()
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        let mut session = self.inner.session.lock();
        self.inner.stop_locked(&mut session);
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("session", &self.snapshot())
            .field("cache", &self.cache_stats())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl EngineInner {
    fn play(self: &Arc<Self>, id: MediaId, offset: Option<f64>) -> Result<PlayRequest> {
        if let Some(offset) = offset {
            if !offset.is_finite() || offset < 0.0 {
                return Err(PlaybackError::InvalidArgument(format!(
                    "offset must be a finite, non-negative number of seconds, got {}",
                    offset
                )));
            }
        }
        if !core_async::runtime::in_runtime() {
            return Err(PlaybackError::Internal(
                "play must be called from inside an async runtime".to_string(),
            ));
        }
        let requested = offset.unwrap_or(0.0);

        let mut session = self.session.lock();
        let resume = session.resume_offset_for(&id);
        self.stop_locked(&mut session);

        session.generation += 1;
        session.media_id = Some(id.clone());
        let generation = session.generation;

        match self.cache.get(&id) {
            Some(buffer) => {
                debug!(media_id = %redact_media_id(id.as_str()), generation, "Cache hit");
                let started = self.start_locked(&mut session, buffer, requested, resume);
                drop(session);

                let outcome = started.map(|started| {
                    self.launch(started);
                    PlayOutcome::Started
                });
                Ok(PlayRequest::ready(generation, outcome))
            }
            None => {
                session.state = PlaybackState::Loading;
                drop(session);

                info!(media_id = %redact_media_id(id.as_str()), generation, "Loading media");
                let handle = core_async::spawn(Arc::clone(self).load_and_start(
                    id, generation, requested, resume,
                ));
                Ok(PlayRequest::pending(generation, handle))
            }
        }
    }

    fn pause(&self) -> Result<()> {
        let mut session = self.session.lock();
        if session.state != PlaybackState::Playing {
            return Err(PlaybackError::InvalidState {
                operation: "pause",
                state: session.state,
            });
        }

        let position =
            (self.device.now() - session.started_at_clock).clamp(0.0, session.tracker.duration());
        self.release_node_locked(&mut session);
        session.started_at_clock = 0.0;
        session.paused_at_offset = position;
        session.state = PlaybackState::Paused;

        debug!(position, generation = session.generation, "Paused");
        Ok(())
    }

    /// Cancel background tasks and release the active node.
    fn release_node_locked(&self, session: &mut PlaybackSession) {
        if let Some(cancel) = session.cancel.take() {
            cancel.cancel();
        }
        if let Some(node) = session.node.take() {
            if let Err(err) = self.device.stop(node) {
                warn!(node = node.id(), error = %err, "Failed to stop playback node");
            }
            if let Err(err) = self.device.disconnect(node) {
                warn!(node = node.id(), error = %err, "Failed to disconnect playback node");
            }
        }
    }

    fn stop_locked(&self, session: &mut PlaybackSession) {
        self.release_node_locked(session);
        session.paused_at_offset = 0.0;
        session.started_at_clock = 0.0;
        session.state = PlaybackState::Stopped;
    }

    /// Create, configure and start a node for `buffer`.
    fn start_locked(
        &self,
        session: &mut PlaybackSession,
        buffer: Arc<DecodedBuffer>,
        requested: f64,
        resume: Option<f64>,
    ) -> Result<Started> {
        let duration = buffer.duration_secs();
        let offset = effective_offset(requested, resume, duration);

        let node = match self.device.create_playback_node(buffer) {
            Ok(node) => node,
            Err(err) => {
                session.state = PlaybackState::Stopped;
                return Err(PlaybackError::from_device(err));
            }
        };

        let started = self
            .device
            .set_gain(session.gain.gain())
            .and_then(|_| self.device.start(node, offset));
        if let Err(err) = started {
            if let Err(err) = self.device.disconnect(node) {
                warn!(node = node.id(), error = %err, "Failed to release unstarted node");
            }
            session.state = PlaybackState::Stopped;
            return Err(PlaybackError::from_device(err));
        }

        let cancel = CancellationToken::new();
        session.node = Some(node);
        session.cancel = Some(cancel.clone());
        session.tracker.reset(offset, duration);
        session.started_at_clock = self.device.now() - offset;
        session.paused_at_offset = 0.0;
        session.state = PlaybackState::Playing;

        info!(
            generation = session.generation,
            node = node.id(),
            offset,
            duration,
            "Playback started"
        );

        Ok(Started {
            generation: session.generation,
            node,
            cancel,
            update: session.time_update_event(),
        })
    }

    /// Publish the initial time update and spawn the tick loop and end watcher.
    fn launch(self: &Arc<Self>, started: Started) {
        let Started {
            generation,
            node,
            cancel,
            update,
        } = started;

        self.dispatcher.dispatch(update);
        core_async::spawn(Arc::clone(self).run_ticker(generation, cancel.clone()));
        core_async::spawn(Arc::clone(self).watch_end(generation, node, cancel));
    }

    #[instrument(
        skip(self, id, requested, resume),
        fields(media_id = %redact_media_id(id.as_str()))
    )]
    async fn load_and_start(
        self: Arc<Self>,
        id: MediaId,
        generation: u64,
        requested: f64,
        resume: Option<f64>,
    ) -> Result<PlayOutcome> {
        let token = self.bearer_token().await;
        let buffer = match self.fetch(&id, token.as_deref()).await {
            Ok(buffer) => Arc::new(buffer),
            Err(err) => return self.fail_load(generation, err),
        };

        self.cache.insert(id, Arc::clone(&buffer));

        match self.start_if_current(generation, buffer, requested, resume)? {
            Some(started) => {
                self.launch(started);
                Ok(PlayOutcome::Started)
            }
            None => {
                debug!("Load finished after being superseded; buffer cached only");
                Ok(PlayOutcome::Stale)
            }
        }
    }

    async fn bearer_token(&self) -> Option<String> {
        let provider = self.credentials.as_ref()?;
        match provider.bearer_token().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Credential lookup failed; loading without a token");
                None
            }
        }
    }

    async fn fetch(&self, id: &MediaId, token: Option<&str>) -> Result<DecodedBuffer> {
        let load = self.loader.load(id, token);
        let loaded = match self.config.load_timeout {
            Some(limit) => timeout(limit, load).await.map_err(|_| {
                PlaybackError::LoadError(format!("load timed out after {:?}", limit))
            })?,
            None => load.await,
        };
        loaded.map_err(PlaybackError::from_load)
    }

    fn fail_load(&self, generation: u64, err: PlaybackError) -> Result<PlayOutcome> {
        let mut session = self.session.lock();
        if session.generation != generation {
            debug!(error = %err, "Discarding failure of superseded load");
            return Ok(PlayOutcome::Stale);
        }
        if session.state == PlaybackState::Loading {
            session.state = PlaybackState::Stopped;
        }
        drop(session);

        warn!(error = %err, "Load failed");
        Err(err)
    }

    fn start_if_current(
        &self,
        generation: u64,
        buffer: Arc<DecodedBuffer>,
        requested: f64,
        resume: Option<f64>,
    ) -> Result<Option<Started>> {
        let mut session = self.session.lock();
        if session.generation != generation || session.state != PlaybackState::Loading {
            return Ok(None);
        }
        self.start_locked(&mut session, buffer, requested, resume)
            .map(Some)
    }

    async fn run_ticker(self: Arc<Self>, generation: u64, cancel: CancellationToken) {
        let mut interval = delayed_interval(self.config.tick_interval);

        while next_tick(&mut interval, &cancel).await {
            match self.on_tick(generation) {
                TickOutcome::Continue(update) => self.dispatcher.dispatch(update),
                TickOutcome::Finished { update, ended } => {
                    info!(generation, "Track ended");
                    self.dispatcher.dispatch_all([update, ended]);
                    break;
                }
                TickOutcome::Halt => break,
            }
        }
    }

    fn on_tick(&self, generation: u64) -> TickOutcome {
        let mut session = self.session.lock();
        if !session.is_playing(generation) {
            return TickOutcome::Halt;
        }

        session.tracker.tick();
        let update = session.time_update_event();
        if !session.tracker.is_complete() {
            return TickOutcome::Continue(update);
        }

        let ended = session.ended_event();
        self.stop_locked(&mut session);
        TickOutcome::Finished { update, ended }
    }

    async fn watch_end(
        self: Arc<Self>,
        generation: u64,
        node: NodeHandle,
        cancel: CancellationToken,
    ) {
        let ended = self.device.wait_ended(node);
        let cancelled = cancel.cancelled();
        pin_mut!(ended, cancelled);

        if let Either::Right(_) = select(ended, cancelled).await {
            return;
        }

        if let Some(event) = self.on_device_ended(generation) {
            info!(generation, "Track ended (device signal)");
            self.dispatcher.dispatch(event);
        }
    }

    fn on_device_ended(&self, generation: u64) -> Option<PlaybackEvent> {
        let mut session = self.session.lock();
        if !session.is_playing(generation) {
            return None;
        }
        if !session.tracker.is_complete() {
            debug!(
                generation,
                position = session.tracker.position(),
                "Device ended ahead of the position estimate; waiting for ticks"
            );
            return None;
        }

        let ended = session.ended_event();
        self.stop_locked(&mut session);
        Some(ended)
    }
}

/// Wait for the next tick. Returns `false` once `cancel` fires.
async fn next_tick(interval: &mut Interval, cancel: &CancellationToken) -> bool {
    let tick = interval.tick();
    let cancelled = cancel.cancelled();
    pin_mut!(tick, cancelled);
    matches!(select(tick, cancelled).await, Either::Left(_))
}

/// Explicit offset if positive, else the resume point, else 0; clamped to the
/// buffer.
fn effective_offset(requested: f64, resume: Option<f64>, duration: f64) -> f64 {
    let offset = if requested > 0.0 {
        requested
    } else {
        resume.unwrap_or(0.0)
    };
    offset.clamp(0.0, duration.max(0.0))
}
