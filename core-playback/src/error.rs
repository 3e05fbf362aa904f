//! # Playback Error Types
//!
//! Errors surfaced by the playback engine. Argument and state errors are
//! returned synchronously from the control methods; load and decode errors
//! arrive through the [`PlayRequest`](crate::engine::PlayRequest).

use bridge_traits::BridgeError;
use thiserror::Error;

use crate::config::PlaybackState;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// Offset, seek target or volume outside the accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the current session state.
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: PlaybackState,
    },

    // ========================================================================
    // Load Errors
    // ========================================================================
    /// Fetching the track failed (transport, auth rejection, timeout).
    #[error("Failed to load media: {0}")]
    LoadError(String),

    /// The fetched bytes could not be decoded.
    #[error("Failed to decode media: {0}")]
    DecodeError(String),

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// The audio device rejected a node or gain operation.
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Map a loader failure. Decode failures keep their own variant; every
    /// other bridge error is a load failure.
    pub fn from_load(err: BridgeError) -> Self {
        match err {
            BridgeError::Decode(msg) => PlaybackError::DecodeError(msg),
            other => PlaybackError::LoadError(other.to_string()),
        }
    }

    /// Map an audio device failure.
    pub fn from_device(err: BridgeError) -> Self {
        match err {
            BridgeError::Device(msg) => PlaybackError::AudioDeviceError(msg),
            other => PlaybackError::AudioDeviceError(other.to_string()),
        }
    }

    /// Returns `true` if the track could not be made ready to play.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadError(_) | PlaybackError::DecodeError(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_mapping() {
        let err = PlaybackError::from_load(BridgeError::Network("HTTP 503".into()));
        assert!(matches!(err, PlaybackError::LoadError(ref msg) if msg.contains("HTTP 503")));
        assert!(err.is_load_failure());

        let err = PlaybackError::from_load(BridgeError::Decode("bad header".into()));
        assert!(matches!(err, PlaybackError::DecodeError(ref msg) if msg == "bad header"));
        assert!(err.is_load_failure());

        let err = PlaybackError::from_load(BridgeError::OperationFailed("cancelled".into()));
        assert!(matches!(err, PlaybackError::LoadError(_)));
    }

    #[test]
    fn test_device_error_mapping() {
        let err = PlaybackError::from_device(BridgeError::Device("node limit".into()));
        assert_eq!(err.to_string(), "Audio device error: node limit");
        assert!(!err.is_load_failure());
    }

    #[test]
    fn test_invalid_state_message() {
        let err = PlaybackError::InvalidState {
            operation: "pause",
            state: PlaybackState::Stopped,
        };
        assert_eq!(err.to_string(), "Cannot pause while stopped");
    }
}
