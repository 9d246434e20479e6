use serde_json::{json, Value};

/// Workflow run statuses accepted by the built-in schema.
pub const WORKFLOW_RUN_STATUSES: [&str; 5] = ["PENDING", "RUNNING", "SUCCEEDED", "FAILED", "CANCELLED"];

/// Built-in schema for `WorkflowRunUpdate` envelopes, the last resort of
/// schema resolution.
pub fn default_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "WorkflowRunUpdate Event Schema",
        "type": "object",
        "properties": {
            "version": {"type": "string"},
            "id": {"type": "string"},
            "detail-type": {"type": "string"},
            "source": {"type": "string"},
            "account": {"type": "string"},
            "time": {"type": "string", "format": "date-time"},
            "region": {"type": "string"},
            "detail": {
                "type": "object",
                "properties": {
                    "workflowRunId": {"type": "string"},
                    "status": {"type": "string", "enum": WORKFLOW_RUN_STATUSES},
                    "timestamp": {"type": "string", "format": "date-time"}
                },
                "required": ["workflowRunId", "status"],
                "additionalProperties": true
            }
        },
        "required": ["version", "id", "detail-type", "source", "detail"],
        "additionalProperties": true
    })
}
