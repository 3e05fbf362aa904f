//! Playback bridge traits and supporting audio types.
//!
//! The core playback engine never fetches bytes, decodes audio or touches an
//! output device itself. Host applications provide a [`Loader`] that turns a
//! [`MediaId`] into a ready-to-render [`DecodedBuffer`], and an
//! [`AudioDevice`] that renders buffers through short-lived playback nodes
//! and exposes a monotonic clock.

use crate::{error::Result, platform::PlatformSendSync};
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of a playable track.
///
/// Usually a URL or a provider-specific file id. The engine only uses it as a
/// cache key and hands it back to the [`Loader`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(String);

impl MediaId {
    /// Create a media identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MediaId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for MediaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Immutable decoded audio, ready to be handed to an [`AudioDevice`].
///
/// Samples are interleaved PCM in the range `[-1.0, 1.0]`. The duration is
/// fixed at construction and is always finite and non-negative.
#[derive(Debug, Clone)]
pub struct DecodedBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
    channels: u16,
    duration_secs: f64,
}

impl DecodedBuffer {
    /// Create a buffer from interleaved samples. The duration is derived from
    /// the frame count and sample rate.
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32, channels: u16) -> Self {
        let samples = samples.into();
        let duration_secs = if sample_rate == 0 || channels == 0 {
            0.0
        } else {
            let frames = samples.len() / channels as usize;
            frames as f64 / sample_rate as f64
        };

        Self {
            samples,
            sample_rate,
            channels,
            duration_secs,
        }
    }

    /// Create a sample-less buffer that only carries a duration.
    ///
    /// Useful for devices that keep their own copy of the decoded data and for
    /// tests. Negative or non-finite durations are clamped to zero.
    pub fn with_duration(duration_secs: f64) -> Self {
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };

        Self {
            samples: Arc::from(Vec::new()),
            sample_rate: 0,
            channels: 0,
            duration_secs,
        }
    }

    /// Interleaved PCM samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in hertz (0 for duration-only buffers).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels (0 for duration-only buffers).
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

/// Handle to a single-use playback node created by an [`AudioDevice`].
///
/// A node plays one buffer once; restarting playback always means creating
/// a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// Wrap a device-assigned node id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Device-assigned node id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Gain range accepted by a device's output gain stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRange {
    pub min: f64,
    pub max: f64,
}

impl GainRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Audio output capability.
///
/// Implementations own the actual rendering graph. Node operations are
/// synchronous (they only schedule work on the audio thread); the end of
/// playback is observed through [`AudioDevice::wait_ended`].
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioDevice: PlatformSendSync {
    /// Monotonic device clock in seconds.
    fn now(&self) -> f64;

    /// Allocate a playback node for `buffer`. The node is not started.
    fn create_playback_node(&self, buffer: Arc<DecodedBuffer>) -> Result<NodeHandle>;

    /// Start rendering `node` immediately from `offset_secs` into its buffer.
    fn start(&self, node: NodeHandle, offset_secs: f64) -> Result<()>;

    /// Stop rendering `node`. Stopping an already stopped node is not an error.
    fn stop(&self, node: NodeHandle) -> Result<()>;

    /// Detach `node` from the output graph and release it.
    fn disconnect(&self, node: NodeHandle) -> Result<()>;

    /// Range accepted by [`AudioDevice::set_gain`].
    fn gain_range(&self) -> GainRange;

    /// Apply an output gain value.
    fn set_gain(&self, value: f64) -> Result<()>;

    /// Resolve once `node` has finished rendering its buffer or has been
    /// stopped or disconnected.
    async fn wait_ended(&self, node: NodeHandle);
}

/// Fetch-and-decode capability.
///
/// One call retrieves the bytes for `id` (attaching `auth_token` as a bearer
/// credential when present) and decodes them. Implementations report
/// transport failures as [`BridgeError::Network`](crate::BridgeError::Network)
/// and malformed payloads as [`BridgeError::Decode`](crate::BridgeError::Decode).
/// No retries are expected at this layer.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Loader: PlatformSendSync {
    async fn load(&self, id: &MediaId, auth_token: Option<&str>) -> Result<DecodedBuffer>;
}
