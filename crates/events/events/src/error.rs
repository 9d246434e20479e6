//! Event error types.

use thiserror::Error;

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;

/// Error type for schema resolution and event publishing.
#[derive(Debug, Error)]
pub enum EventError {
    /// Event serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// No schema source produced a usable schema.
    #[error("Schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// The bus rejected the event or the transport failed.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// Registry bookkeeping failed.
    #[error("Registry error: {0}")]
    Registry(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::SerializationError(err.to_string())
    }
}
