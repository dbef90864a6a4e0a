//! Pure functions for serializing/deserializing DTOs to/from cache bytes.
//!
//! JSON is used for cache storage so cached values stay human-readable
//! when inspecting the backend directly.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a DTO to JSON bytes for cache storage.
pub fn serialize_dto<T: Serialize>(dto: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(dto).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes back into a DTO.
pub fn deserialize_dto<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}
