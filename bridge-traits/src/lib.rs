//! # Host Bridge Traits
//!
//! Capabilities the playback core requires from its host.
//!
//! ## Overview
//!
//! The core owns the playback state machine; everything that touches the
//! outside world is injected through the traits below so each platform
//! (desktop, web, mobile) can supply its own implementation.
//!
//! ## Traits
//!
//! - [`Loader`](playback::Loader) - Fetch and decode a track into a [`DecodedBuffer`]
//! - [`AudioDevice`](playback::AudioDevice) - Render buffers, device clock, output gain
//! - [`CredentialProvider`](auth::CredentialProvider) - Bearer token for media requests
//! - [`LoggerSink`](log_sink::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! let device = builder.device
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "AudioDevice".to_string(),
//!         message: "No audio output provided. Inject a platform AudioDevice.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Loaders should
//! distinguish transport failures (`Network`) from malformed payloads
//! (`Decode`); the engine surfaces them to callers as different errors.
//!
//! ## Thread Safety
//!
//! On native targets every trait requires `Send + Sync` (via
//! [`PlatformSendSync`](platform::PlatformSendSync)) because the engine calls
//! them from spawned tasks.

pub mod auth;
pub mod error;
pub mod log_sink;
pub mod platform;
pub mod playback;

pub use error::{BridgeError, Result};

// Re-export commonly used types
pub use auth::{CredentialProvider, StaticCredentials};
pub use log_sink::{LogEntry, LogLevel, LoggerSink};
pub use playback::{AudioDevice, DecodedBuffer, GainRange, Loader, MediaId, NodeHandle};
