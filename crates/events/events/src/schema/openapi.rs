//! Pulls a JSON Schema out of an OpenAPI 3 document.

use serde_json::Value;

/// Draft-07 meta-schema URI injected into extracted schemas.
pub const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Component names tried, in order, before falling back to the first schema.
pub const PREFERRED_SCHEMA_KEYS: [&str; 3] = ["Event", "WorkflowRunUpdate", "AWSEvent"];

/// Extracts the event schema from an OpenAPI document.
///
/// Looks under `components.schemas`, picking the first preferred key
/// present, otherwise the first schema in document order. Returns `None`
/// when there is nothing to pick.
pub fn extract_schema(openapi: &Value) -> Option<Value> {
    let schemas = openapi
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)?;

    for key in PREFERRED_SCHEMA_KEYS {
        if let Some(schema) = schemas.get(key) {
            tracing::info!("Using OpenAPI schema component: {}", key);
            return Some(to_json_schema(schema.clone()));
        }
    }

    match schemas.iter().next() {
        Some((name, schema)) => {
            tracing::info!("Using first available schema: {}", name);
            Some(to_json_schema(schema.clone()))
        }
        None => {
            tracing::error!("No schemas found in OpenAPI specification");
            None
        }
    }
}

/// Marks an OpenAPI schema fragment as draft-07 JSON Schema.
///
/// OpenAPI schema objects are used as-is otherwise.
pub fn to_json_schema(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.entry("$schema")
            .or_insert_with(|| Value::String(DRAFT_07_URI.to_string()));
    }
    schema
}
