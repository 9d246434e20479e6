//! Error types for the validation gateway.
//!
//! Each variant maps to one failure stage of the pipeline and to the
//! status code reported to the caller.

use thiserror::Error;
use wru_validator_events::EventError;

/// Errors the gateway reports to its caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    // ==================== Client Errors ====================
    /// The request, or its `body`, is not valid JSON.
    #[error("Malformed JSON in event: {message}")]
    MalformedInput { message: String },

    /// Extraction produced no usable payload mapping.
    #[error("No payload found in event")]
    NoPayload,

    /// The payload does not satisfy the schema.
    #[error("Payload validation failed")]
    SchemaViolation { errors: Vec<String> },

    // ==================== Infrastructure Errors ====================
    /// No schema source produced a schema.
    #[error("Failed to load validation schema")]
    SchemaUnavailable { reason: String },

    /// The bus refused the event or could not be reached.
    #[error("Failed to send event to event bus")]
    PublishFailed { reason: String },

    /// Anything else; details stay in the logs.
    #[error("Internal server error")]
    Internal { message: String },
}

impl GatewayError {
    /// Creates a new malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the caller sent something wrong.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. } | Self::NoPayload | Self::SchemaViolation { .. }
        )
    }

    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

/// A Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput {
            message: err.to_string(),
        }
    }
}

impl From<EventError> for GatewayError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::SchemaUnavailable(reason) => Self::SchemaUnavailable { reason },
            EventError::PublishFailed(reason) => Self::PublishFailed { reason },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GatewayError::NoPayload.to_string(), "No payload found in event");
        assert_eq!(
            GatewayError::malformed("expected value").to_string(),
            "Malformed JSON in event: expected value"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::NoPayload.status_code(), 400);
        assert_eq!(GatewayError::SchemaViolation { errors: vec![] }.status_code(), 400);
        assert_eq!(
            GatewayError::SchemaUnavailable { reason: "x".into() }.status_code(),
            500
        );
        assert_eq!(GatewayError::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_event_errors_map_to_stages() {
        let err: GatewayError = EventError::PublishFailed("boom".into()).into();
        assert!(matches!(err, GatewayError::PublishFailed { ref reason } if reason == "boom"));

        let err: GatewayError = EventError::SchemaUnavailable("gone".into()).into();
        assert!(matches!(err, GatewayError::SchemaUnavailable { .. }));

        let err: GatewayError = EventError::Internal("?".into()).into();
        assert!(!err.is_client_error());
    }
}
