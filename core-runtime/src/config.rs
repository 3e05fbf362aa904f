//! # Core Configuration Module
//!
//! Collaborator wiring for the playback core.
//!
//! ## Overview
//!
//! [`CoreConfigBuilder`] collects the host capabilities the engine runs on and
//! fails fast when a required one is missing, so a misconfigured host finds
//! out at startup rather than on the first `play`.
//!
//! ## Required Capabilities
//!
//! - `AudioDevice` - renders buffers and supplies the playback clock
//! - `Loader` - fetches and decodes media
//!
//! ## Optional Capabilities
//!
//! - `CredentialProvider` - bearer token attached to loads (none: anonymous loads)
//! - `EventBus` - lifecycle event bus (none: a fresh [`EventBus::default()`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .audio_device(Arc::new(MyDevice::new()))
//!     .loader(Arc::new(MyLoader::new()))
//!     .credentials(Arc::new(StaticCredentials::new(token)))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{AudioDevice, CredentialProvider, Loader};
use std::fmt;
use std::sync::Arc;

/// Host capabilities for one playback engine.
#[derive(Clone)]
pub struct CoreConfig {
    /// Audio output (required)
    pub device: Arc<dyn AudioDevice>,

    /// Fetch-and-decode (required)
    pub loader: Arc<dyn Loader>,

    /// Bearer token source for loads (optional)
    pub credentials: Option<Arc<dyn CredentialProvider>>,

    /// Lifecycle event bus shared with UI subscribers
    pub event_bus: EventBus,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("device", &"AudioDevice { ... }")
            .field("loader", &"Loader { ... }")
            .field(
                "credentials",
                &self
                    .credentials
                    .as_ref()
                    .map(|_| "CredentialProvider { ... }"),
            )
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Check values reported by the injected capabilities.
    ///
    /// [`CoreConfigBuilder::build`] runs this too.
    pub fn validate(&self) -> Result<()> {
        let range = self.device.gain_range();
        if !range.min.is_finite() || !range.max.is_finite() {
            return Err(Error::Config(format!(
                "AudioDevice reported a non-finite gain range [{}, {}]",
                range.min, range.max
            )));
        }
        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    device: Option<Arc<dyn AudioDevice>>,
    loader: Option<Arc<dyn Loader>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    event_bus: Option<EventBus>,
}

impl CoreConfigBuilder {
    pub fn audio_device(mut self, device: Arc<dyn AudioDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Publish on an existing bus instead of a private one.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Assemble the configuration.
    ///
    /// # Errors
    ///
    /// [`Error::CapabilityMissing`] naming the first required capability that
    /// was not provided.
    pub fn build(self) -> Result<CoreConfig> {
        let device = self.device.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioDevice".to_string(),
            message: "An audio output is required to render playback. \
                      Provide one with CoreConfigBuilder::audio_device()."
                .to_string(),
        })?;

        let loader = self.loader.ok_or_else(|| Error::CapabilityMissing {
            capability: "Loader".to_string(),
            message: "A loader is required to fetch and decode media. \
                      Provide one with CoreConfigBuilder::loader()."
                .to_string(),
        })?;

        let config = CoreConfig {
            device,
            loader,
            credentials: self.credentials,
            event_bus: self.event_bus.unwrap_or_default(),
        };
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{
        BridgeError, DecodedBuffer, GainRange, MediaId, NodeHandle, Result as BridgeResult,
        StaticCredentials,
    };

    struct NullDevice {
        range: GainRange,
    }

    impl Default for NullDevice {
        fn default() -> Self {
            Self {
                range: GainRange::new(-1.0, 1.0),
            }
        }
    }

    #[async_trait]
    impl AudioDevice for NullDevice {
        fn now(&self) -> f64 {
            0.0
        }

        fn create_playback_node(&self, _buffer: Arc<DecodedBuffer>) -> BridgeResult<NodeHandle> {
            Ok(NodeHandle::new(1))
        }

        fn start(&self, _node: NodeHandle, _offset_secs: f64) -> BridgeResult<()> {
            Ok(())
        }

        fn stop(&self, _node: NodeHandle) -> BridgeResult<()> {
            Ok(())
        }

        fn disconnect(&self, _node: NodeHandle) -> BridgeResult<()> {
            Ok(())
        }

        fn gain_range(&self) -> GainRange {
            self.range
        }

        fn set_gain(&self, _value: f64) -> BridgeResult<()> {
            Ok(())
        }

        async fn wait_ended(&self, _node: NodeHandle) {}
    }

    struct FailingLoader;

    #[async_trait]
    impl Loader for FailingLoader {
        async fn load(
            &self,
            id: &MediaId,
            _auth_token: Option<&str>,
        ) -> BridgeResult<DecodedBuffer> {
            Err(BridgeError::NotAvailable(id.to_string()))
        }
    }

    #[test]
    fn test_build_with_required_capabilities() {
        let config = CoreConfig::builder()
            .audio_device(Arc::new(NullDevice::default()))
            .loader(Arc::new(FailingLoader))
            .build()
            .unwrap();

        assert!(config.credentials.is_none());
        assert_eq!(config.event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_missing_device_fails_fast() {
        let err = CoreConfig::builder()
            .loader(Arc::new(FailingLoader))
            .build()
            .unwrap_err();

        match err {
            Error::CapabilityMissing { capability, .. } => assert_eq!(capability, "AudioDevice"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_loader_fails_fast() {
        let err = CoreConfig::builder()
            .audio_device(Arc::new(NullDevice::default()))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            Error::CapabilityMissing { ref capability, .. } if capability == "Loader"
        ));
        assert!(err.to_string().contains("CoreConfigBuilder::loader()"));
    }

    #[test]
    fn test_shared_event_bus_and_credentials() {
        let bus = EventBus::new(8);
        let _ui = bus.subscribe();

        let config = CoreConfig::builder()
            .audio_device(Arc::new(NullDevice::default()))
            .loader(Arc::new(FailingLoader))
            .credentials(Arc::new(StaticCredentials::new(Some("token".to_string()))))
            .event_bus(bus.clone())
            .build()
            .unwrap();

        assert!(config.credentials.is_some());
        assert_eq!(config.event_bus.subscriber_count(), 1);

        let debug = format!("{:?}", config);
        assert!(debug.contains("CredentialProvider { ... }"));
        assert!(!debug.contains("token"));
    }

    #[test]
    fn test_non_finite_gain_range_rejected() {
        let device = NullDevice {
            range: GainRange::new(-1.0, f64::INFINITY),
        };
        let err = CoreConfig::builder()
            .audio_device(Arc::new(device))
            .loader(Arc::new(FailingLoader))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }
}
