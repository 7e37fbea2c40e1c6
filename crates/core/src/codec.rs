//! Pure functions for encoding values to and from the text payload of a record.
//!
//! Values are stored as JSON text, so the `json` table stays human-readable and
//! easy to inspect with the `sqlite3` shell.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a stored value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value to JSON text.
    #[error("Failed to encode value: {0}")]
    Encode(String),
    /// Failed to decode JSON text to a value.
    #[error("Failed to decode value: {0}")]
    Decode(String),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Encodes any serializable value to its JSON text form.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes JSON text back to a dynamically typed value.
pub fn decode_value(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Decodes JSON text into a concrete type.
pub fn decode_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
}
