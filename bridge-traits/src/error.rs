use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Fetching the media bytes failed (connection, HTTP status, auth rejection).
    #[error("Network request failed: {0}")]
    Network(String),

    /// The fetched bytes could not be decoded into audio samples.
    #[error("Audio decode failed: {0}")]
    Decode(String),

    /// The audio device rejected a node operation.
    #[error("Audio device error: {0}")]
    Device(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
