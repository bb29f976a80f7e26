//! Error types for the dashboard client

use thermolog_core::RowParseError;
use thermolog_protocol::CodecError;

/// Errors that can occur while talking to the device
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid device response: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid row: {0}")]
    Row(#[from] RowParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
