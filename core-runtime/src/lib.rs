//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the playback core:
//! - Logging and tracing setup
//! - Collaborator configuration with fail-fast validation
//! - Playback event bus
//!
//! ## Overview
//!
//! The playback engine in `core-playback` is built from a [`CoreConfig`]
//! that names its host capabilities, logs through `tracing`, and publishes
//! lifecycle events on an [`EventBus`](events::EventBus) that any number of
//! UI subscribers can listen to.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
