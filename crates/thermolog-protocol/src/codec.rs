//! JSON codec for device readings.
//!
//! The device sends readings as JSON: an array for `/initial-data` and one
//! object per WebSocket text frame on `/ws`.

use crate::messages::ReadingMessage;
use thermolog_core::Reading;
use thiserror::Error;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("Invalid reading JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Received binary frame instead of text.
    #[error("Expected text frame, received binary")]
    BinaryFrame,
}

/// Decode one pushed reading.
pub fn decode_push_message(text: &str) -> Result<Reading, CodecError> {
    let msg: ReadingMessage = serde_json::from_str(text)?;
    Ok(msg.into())
}

/// Decode the `/initial-data` batch, preserving its order.
///
/// The device answers `{}` when its log file is missing; that is not an
/// array and fails to decode.
pub fn decode_initial_data(text: &str) -> Result<Vec<Reading>, CodecError> {
    let batch: Vec<ReadingMessage> = serde_json::from_str(text)?;
    Ok(batch.into_iter().map(Reading::from).collect())
}

/// Encode a reading as the device pushes it.
pub fn encode_reading(reading: &Reading) -> Result<String, CodecError> {
    serde_json::to_string(&ReadingMessage::from(reading)).map_err(CodecError::from)
}

/// Encode a batch as `/initial-data` returns it.
pub fn encode_initial_data(readings: &[Reading]) -> Result<String, CodecError> {
    let batch: Vec<ReadingMessage> = readings.iter().map(ReadingMessage::from).collect();
    serde_json::to_string(&batch).map_err(CodecError::from)
}
