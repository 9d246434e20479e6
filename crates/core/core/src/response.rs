//! Uniform responses returned to whichever front door invoked the gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::GatewayError;

/// Response envelope with status code, headers and JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: ResponseBody,
}

/// Body of a gateway response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl GatewayResponse {
    fn new(status_code: u16, body: ResponseBody) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// A 200 response for a forwarded event.
    pub fn forwarded(event_id: impl Into<String>) -> Self {
        Self::new(
            200,
            ResponseBody {
                success: true,
                message: Some("Event validated and forwarded successfully".to_string()),
                event_id: Some(event_id.into()),
                ..ResponseBody::default()
            },
        )
    }

    /// An error response with optional details.
    pub fn error(status_code: u16, error: impl Into<String>, details: Option<Value>) -> Self {
        Self::new(
            status_code,
            ResponseBody {
                success: false,
                error: Some(error.into()),
                details,
                ..ResponseBody::default()
            },
        )
    }

    pub fn is_success(&self) -> bool {
        self.body.success
    }
}

impl From<&GatewayError> for GatewayResponse {
    fn from(err: &GatewayError) -> Self {
        let details = match err {
            GatewayError::SchemaViolation { errors } => Some(Value::from(errors.clone())),
            GatewayError::PublishFailed { reason } => Some(Value::from(reason.clone())),
            _ => None,
        };
        GatewayResponse::error(err.status_code(), err.to_string(), details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forwarded_response_shape() {
        let value = serde_json::to_value(GatewayResponse::forwarded("evt-1")).unwrap();

        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert_eq!(
            value["body"],
            json!({
                "success": true,
                "message": "Event validated and forwarded successfully",
                "event_id": "evt-1"
            })
        );
    }

    #[test]
    fn test_violation_details_are_attached() {
        let err = GatewayError::SchemaViolation {
            errors: vec!["detail -> status: bad".to_string()],
        };
        let response = GatewayResponse::from(&err);

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body.error.as_deref(), Some("Payload validation failed"));
        assert_eq!(response.body.details, Some(json!(["detail -> status: bad"])));
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = GatewayResponse::from(&GatewayError::internal("stack trace here"));

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.error.as_deref(), Some("Internal server error"));
        assert!(response.body.details.is_none());
    }
}
