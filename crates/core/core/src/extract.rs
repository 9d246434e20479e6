//! Payload extraction from the shapes upstream callers send.

use serde_json::{Map, Value};

use crate::error::{GatewayError, GatewayResult};

/// The business-data mapping of one workflow run update.
pub type Payload = Map<String, Value>;

/// One way of finding the payload inside a request.
pub struct ExtractionRule {
    /// Name used in logs.
    pub name: &'static str,
    /// Whether this rule applies to the request.
    pub matches: fn(&Map<String, Value>) -> bool,
    /// Pulls the candidate payload out of a matching request.
    pub extract: fn(&Map<String, Value>) -> GatewayResult<Value>,
}

/// Extraction rules in priority order. The whole request is the payload
/// when none match.
pub const EXTRACTION_RULES: [ExtractionRule; 4] = [
    ExtractionRule {
        name: "payload",
        matches: |request| request.contains_key("payload"),
        extract: |request| Ok(request["payload"].clone()),
    },
    ExtractionRule {
        name: "body",
        matches: |request| request.contains_key("body"),
        extract: |request| match &request["body"] {
            Value::String(body) => serde_json::from_str(body).map_err(GatewayError::from),
            other => Ok(other.clone()),
        },
    },
    ExtractionRule {
        name: "bus envelope",
        matches: |request| request.contains_key("detail") && request.contains_key("detail-type"),
        extract: |request| Ok(request["detail"].clone()),
    },
    ExtractionRule {
        name: "bus entry",
        matches: |request| request.contains_key("Detail") && request.contains_key("DetailType"),
        extract: |request| Ok(request["Detail"].clone()),
    },
];

/// Normalizes a raw request into a payload mapping.
///
/// A string request is parsed as JSON first. Fails with `MalformedInput`
/// on unparseable JSON and `NoPayload` when the result is not a non-empty
/// mapping.
pub fn extract(request: &Value) -> GatewayResult<Payload> {
    let parsed;
    let request = match request {
        Value::String(raw) => {
            parsed = serde_json::from_str::<Value>(raw).map_err(|e| {
                tracing::error!("Failed to parse JSON request: {}", e);
                GatewayError::from(e)
            })?;
            &parsed
        }
        other => other,
    };

    let Some(mapping) = request.as_object() else {
        tracing::warn!("Request is not a JSON object");
        return Err(GatewayError::NoPayload);
    };

    let candidate = match EXTRACTION_RULES.iter().find(|rule| (rule.matches)(mapping)) {
        Some(rule) => {
            tracing::info!("Payload found by '{}' rule", rule.name);
            (rule.extract)(mapping).inspect_err(|e| {
                tracing::error!("Failed to parse JSON payload: {}", e);
            })?
        }
        None => {
            tracing::info!("Using entire event as payload");
            request.clone()
        }
    };

    match candidate {
        Value::Object(payload) if !payload.is_empty() => Ok(payload),
        _ => Err(GatewayError::NoPayload),
    }
}
