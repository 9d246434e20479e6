//! Outbound event records and bus responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source stamped on every republished event.
pub const EVENT_SOURCE: &str = "orcabus.executionhandler";

/// Detail type stamped on every republished event.
pub const DETAIL_TYPE: &str = "WorkflowRunUpdate";

/// Key in the payload whose value is copied onto the record's resources.
pub const RESOURCES_KEY: &str = "resources";

/// A single entry handed to the bus transport.
///
/// `source` and `detail_type` are fixed by [`OutboundEvent::from_payload`]
/// so every republished event shares one contract, whatever the inbound
/// shape was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundEvent {
    /// Event source.
    pub source: String,
    /// Event detail type.
    pub detail_type: String,
    /// JSON-serialized payload.
    pub detail: String,
    /// Target bus.
    pub event_bus_name: String,
    /// Resources copied verbatim from the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
}

impl OutboundEvent {
    /// Builds the record for a validated payload.
    pub fn from_payload(
        payload: &Map<String, Value>,
        event_bus_name: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            source: EVENT_SOURCE.to_string(),
            detail_type: DETAIL_TYPE.to_string(),
            detail: serde_json::to_string(payload)?,
            event_bus_name: event_bus_name.into(),
            resources: payload.get(RESOURCES_KEY).cloned(),
        })
    }

    /// Deserializes the detail back into a JSON value.
    pub fn detail_value(&self) -> Option<Value> {
        serde_json::from_str(&self.detail).ok()
    }
}

/// Per-entry outcome reported by the bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResultEntry {
    /// Identifier assigned to an accepted entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Error code of a rejected entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error message of a rejected entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PutEventsResultEntry {
    /// An accepted entry.
    pub fn accepted(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            ..Self::default()
        }
    }

    /// A rejected entry.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event_id: None,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }

    /// Whether the bus reported an error for this entry.
    pub fn is_failure(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Response of a put-events call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResponse {
    /// Number of entries the bus refused.
    pub failed_entry_count: usize,
    /// One result per submitted entry, in submission order.
    pub entries: Vec<PutEventsResultEntry>,
}

impl PutEventsResponse {
    /// Builds a response from entry outcomes, counting failures.
    pub fn from_entries(entries: Vec<PutEventsResultEntry>) -> Self {
        let failed_entry_count = entries.iter().filter(|e| e.is_failure()).count();
        Self {
            failed_entry_count,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_uses_fixed_source_and_type() {
        let record = OutboundEvent::from_payload(
            &payload(json!({"source": "somewhere.else", "status": "RUNNING"})),
            "orcabus",
        )
        .unwrap();

        assert_eq!(record.source, EVENT_SOURCE);
        assert_eq!(record.detail_type, DETAIL_TYPE);
        assert_eq!(record.event_bus_name, "orcabus");
        assert_eq!(
            record.detail_value(),
            Some(json!({"source": "somewhere.else", "status": "RUNNING"}))
        );
        assert!(record.resources.is_none());
    }

    #[test]
    fn test_resources_copied_verbatim() {
        let record = OutboundEvent::from_payload(
            &payload(json!({"resources": "not-a-list", "status": "RUNNING"})),
            "default",
        )
        .unwrap();

        assert_eq!(record.resources, Some(json!("not-a-list")));
    }

    #[test]
    fn test_record_serializes_with_bus_field_names() {
        let record = OutboundEvent::from_payload(
            &payload(json!({"resources": ["arn:x"], "status": "RUNNING"})),
            "default",
        )
        .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Source"], EVENT_SOURCE);
        assert_eq!(value["DetailType"], DETAIL_TYPE);
        assert_eq!(value["EventBusName"], "default");
        assert_eq!(value["Resources"], json!(["arn:x"]));
    }

    #[test]
    fn test_response_counts_failures() {
        let response = PutEventsResponse::from_entries(vec![
            PutEventsResultEntry::accepted("a"),
            PutEventsResultEntry::rejected("X", "boom"),
        ]);
        assert_eq!(response.failed_entry_count, 1);
    }
}
