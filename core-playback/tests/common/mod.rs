//! Hand-written collaborators shared by the engine integration tests.
#![allow(dead_code)]

use bridge_traits::{
    AudioDevice, BridgeError, CredentialProvider, DecodedBuffer, GainRange, Loader, MediaId,
    NodeHandle, Result as BridgeResult,
};
use core_async::sync::{oneshot, Notify};
use core_playback::{PlaybackConfig, PlaybackEngine};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, PlaybackEvent, PlaybackEventKind, Receiver};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock AudioDevice
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub node: NodeHandle,
    pub duration: f64,
    pub offset: Option<f64>,
    pub stopped: bool,
    pub disconnected: bool,
}

impl NodeRecord {
    pub fn is_rendering(&self) -> bool {
        self.offset.is_some() && !self.stopped
    }
}

#[derive(Default)]
struct DeviceState {
    clock: f64,
    next_id: u64,
    nodes: Vec<NodeRecord>,
    gains: Vec<f64>,
    fail_next_start: bool,
    fail_next_gain: bool,
    ended: HashMap<u64, Arc<Notify>>,
}

/// Audio device with a manually driven clock.
///
/// Like a real output graph, stopping a node also fires its end signal.
pub struct MockDevice {
    range: GainRange,
    state: Mutex<DeviceState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::with_range(GainRange::new(-3.4e38, 3.4e38))
    }

    pub fn with_range(range: GainRange) -> Self {
        Self {
            range,
            state: Mutex::new(DeviceState {
                clock: 100.0,
                ..Default::default()
            }),
        }
    }

    pub fn advance_clock(&self, secs: f64) {
        self.state.lock().unwrap().clock += secs;
    }

    pub fn nodes(&self) -> Vec<NodeRecord> {
        self.state.lock().unwrap().nodes.clone()
    }

    pub fn last_node(&self) -> NodeRecord {
        self.nodes().last().cloned().expect("no node created")
    }

    pub fn rendering_nodes(&self) -> Vec<NodeRecord> {
        self.nodes().into_iter().filter(NodeRecord::is_rendering).collect()
    }

    pub fn gains(&self) -> Vec<f64> {
        self.state.lock().unwrap().gains.clone()
    }

    pub fn fail_next_start(&self) {
        self.state.lock().unwrap().fail_next_start = true;
    }

    /// Reject the next `set_gain` call.
    pub fn fail_next_gain(&self) {
        self.state.lock().unwrap().fail_next_gain = true;
    }

    /// Fire the end-of-playback signal of `node`.
    pub fn finish(&self, node: NodeHandle) {
        self.notifier(node).notify_one();
    }

    fn notifier(&self, node: NodeHandle) -> Arc<Notify> {
        let mut state = self.state.lock().unwrap();
        Arc::clone(state.ended.entry(node.id()).or_default())
    }

    fn with_node(&self, node: NodeHandle, f: impl FnOnce(&mut NodeRecord)) -> BridgeResult<()> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .nodes
            .iter_mut()
            .find(|record| record.node == node)
            .ok_or_else(|| BridgeError::Device(format!("unknown node {}", node.id())))?;
        f(record);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AudioDevice for MockDevice {
    fn now(&self) -> f64 {
        self.state.lock().unwrap().clock
    }

    fn create_playback_node(&self, buffer: Arc<DecodedBuffer>) -> BridgeResult<NodeHandle> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let node = NodeHandle::new(state.next_id);
        state.nodes.push(NodeRecord {
            node,
            duration: buffer.duration_secs(),
            offset: None,
            stopped: false,
            disconnected: false,
        });
        Ok(node)
    }

    fn start(&self, node: NodeHandle, offset_secs: f64) -> BridgeResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            if std::mem::take(&mut state.fail_next_start) {
                return Err(BridgeError::Device("output unavailable".to_string()));
            }
        }
        self.with_node(node, |record| record.offset = Some(offset_secs))
    }

    fn stop(&self, node: NodeHandle) -> BridgeResult<()> {
        self.with_node(node, |record| record.stopped = true)?;
        self.finish(node);
        Ok(())
    }

    fn disconnect(&self, node: NodeHandle) -> BridgeResult<()> {
        self.with_node(node, |record| record.disconnected = true)
    }

    fn gain_range(&self) -> GainRange {
        self.range
    }

    fn set_gain(&self, value: f64) -> BridgeResult<()> {
        let mut state = self.state.lock().unwrap();
        if std::mem::take(&mut state.fail_next_gain) {
            return Err(BridgeError::Device("gain stage unavailable".to_string()));
        }
        state.gains.push(value);
        Ok(())
    }

    async fn wait_ended(&self, node: NodeHandle) {
        self.notifier(node).notified().await;
    }
}

// ============================================================================
// Mock Loader
// ============================================================================

pub type LoadResult = BridgeResult<DecodedBuffer>;

#[derive(Default)]
struct LoaderState {
    tracks: HashMap<String, f64>,
    failures: HashMap<String, String>,
    gates: HashMap<String, oneshot::Receiver<LoadResult>>,
    calls: Vec<(String, Option<String>)>,
}

/// Loader serving scripted tracks.
///
/// Gated ids block until the test sends the result, which is how the tests
/// control completion order.
#[derive(Default)]
pub struct MockLoader {
    state: Mutex<LoaderState>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(self, id: &str, duration_secs: f64) -> Self {
        self.state
            .lock()
            .unwrap()
            .tracks
            .insert(id.to_string(), duration_secs);
        self
    }

    /// Network failure for `id`; `decode:` prefixed messages fail decoding instead.
    pub fn with_failure(self, id: &str, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(id.to_string(), message.to_string());
        self
    }

    /// Block the next load of `id` until the returned sender fires.
    pub fn gate(&self, id: &str) -> oneshot::Sender<LoadResult> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().gates.insert(id.to_string(), rx);
        tx
    }

    pub fn call_count(&self, id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(called, _)| called == id)
            .count()
    }

    pub fn tokens(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Loader for MockLoader {
    async fn load(&self, id: &MediaId, auth_token: Option<&str>) -> LoadResult {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state
                .calls
                .push((id.to_string(), auth_token.map(str::to_string)));
            state.gates.remove(id.as_str())
        };

        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(BridgeError::OperationFailed("gate dropped".to_string())));
        }

        let state = self.state.lock().unwrap();
        if let Some(message) = state.failures.get(id.as_str()) {
            return Err(match message.strip_prefix("decode:") {
                Some(detail) => BridgeError::Decode(detail.to_string()),
                None => BridgeError::Network(message.clone()),
            });
        }
        state
            .tracks
            .get(id.as_str())
            .map(|secs| DecodedBuffer::with_duration(*secs))
            .ok_or_else(|| BridgeError::NotAvailable(format!("no such track: {}", id)))
    }
}

/// Credential provider whose lookup always fails.
pub struct BrokenCredentials;

#[async_trait::async_trait]
impl CredentialProvider for BrokenCredentials {
    async fn bearer_token(&self) -> BridgeResult<Option<String>> {
        Err(BridgeError::OperationFailed("keychain locked".to_string()))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub engine: PlaybackEngine,
    pub device: Arc<MockDevice>,
    pub loader: Arc<MockLoader>,
    pub events: Receiver<PlaybackEvent>,
}

pub fn harness(loader: MockLoader) -> Harness {
    build(loader, MockDevice::new(), PlaybackConfig::default(), None)
}

pub fn build(
    loader: MockLoader,
    device: MockDevice,
    config: PlaybackConfig,
    credentials: Option<Arc<dyn CredentialProvider>>,
) -> Harness {
    let device = Arc::new(device);
    let loader = Arc::new(loader);
    let bus = EventBus::default();
    let events = bus.subscribe();

    let mut builder = CoreConfig::builder()
        .audio_device(device.clone())
        .loader(loader.clone())
        .event_bus(bus);
    if let Some(credentials) = credentials {
        builder = builder.credentials(credentials);
    }

    let engine = PlaybackEngine::new(builder.build().unwrap(), config).unwrap();
    Harness {
        engine,
        device,
        loader,
        events,
    }
}

pub fn buffer(secs: f64) -> LoadResult {
    Ok(DecodedBuffer::with_duration(secs))
}

/// Everything published on the bus so far.
pub fn drain(events: &mut Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn count(events: &[PlaybackEvent], kind: PlaybackEventKind) -> usize {
    events.iter().filter(|event| event.kind() == kind).count()
}

/// Positions (ms) of the time updates in `events`.
pub fn positions(events: &[PlaybackEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::TimeUpdate { position_ms, .. } => Some(*position_ms),
            _ => None,
        })
        .collect()
}
