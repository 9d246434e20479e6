use async_trait::async_trait;
use jsonschema::{Draft, JSONSchema};
use serde_json::{Map, Value};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Source placed on the validation envelope.
pub const VALIDATION_SOURCE: &str = "orcabus.event.validation";

/// Detail type placed on the validation envelope.
pub const VALIDATION_DETAIL_TYPE: &str = "WorkflowRunUpdate";

/// Version placed on the validation envelope.
pub const VALIDATION_VERSION: &str = "0";

/// Trait for validating payloads against schemas
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    /// Validate a payload against a schema, collecting every violation
    async fn validate(&self, payload: &Map<String, Value>, schema: &Value) -> ValidationResult;
}

/// Result of schema validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Errors rendered as `"<path>: <message>"`, in reporting order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// A single violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Location in the envelope; `None` when validation itself broke.
    pub path: Option<Vec<String>>,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path),
            message: message.into(),
        }
    }

    /// The validation run could not complete.
    pub fn process_failure(reason: impl fmt::Display) -> Self {
        Self {
            path: None,
            message: format!("Validation process failed: {}", reason),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            None => f.write_str(&self.message),
            Some(path) if path.is_empty() => write!(f, "root: {}", self.message),
            Some(path) => write!(f, "{}: {}", path.join(" -> "), self.message),
        }
    }
}

/// Builds the envelope a payload is validated as.
///
/// A payload that already carries `detail` and `detail-type` is its own
/// envelope. Anything else becomes the `detail` of a synthetic envelope
/// whose top-level fields are filled by the gateway.
pub fn canonical_envelope(payload: &Map<String, Value>) -> Value {
    if payload.contains_key("detail") && payload.contains_key("detail-type") {
        return Value::Object(payload.clone());
    }

    let mut envelope = Map::new();
    envelope.insert("version".to_string(), Value::from(VALIDATION_VERSION));
    envelope.insert("id".to_string(), Value::from(uuid::Uuid::new_v4().to_string()));
    envelope.insert("source".to_string(), Value::from(VALIDATION_SOURCE));
    envelope.insert("detail-type".to_string(), Value::from(VALIDATION_DETAIL_TYPE));
    envelope.insert("detail".to_string(), Value::Object(payload.clone()));
    Value::Object(envelope)
}

/// Splits a JSON pointer such as `/detail/status` into its segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Draft-07 validator backed by the `jsonschema` crate.
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self
    }

    fn check(envelope: &Value, schema: &Value) -> ValidationResult {
        let compiled = match JSONSchema::options().with_draft(Draft::Draft7).compile(schema) {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::error!("Schema validation error: {}", e);
                return ValidationResult::invalid(vec![ValidationError::process_failure(e)]);
            }
        };

        let errors: Vec<ValidationError> = match compiled.validate(envelope) {
            Ok(()) => Vec::new(),
            Err(violations) => violations
                .map(|v| ValidationError::new(pointer_segments(&v.instance_path.to_string()), v.to_string()))
                .collect(),
        };

        if errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(errors)
        }
    }
}

impl Default for JsonSchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaValidator for JsonSchemaValidator {
    async fn validate(&self, payload: &Map<String, Value>, schema: &Value) -> ValidationResult {
        let envelope = canonical_envelope(payload);

        let result = panic::catch_unwind(AssertUnwindSafe(|| Self::check(&envelope, schema)))
            .unwrap_or_else(|_| {
                tracing::error!("Schema validation panicked");
                ValidationResult::invalid(vec![ValidationError::process_failure("validator panicked")])
            });

        if result.is_valid() {
            tracing::info!("Payload validation successful");
        } else {
            tracing::info!("Payload validation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default::default_schema;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_valid_envelope_payload() {
        let validator = JsonSchemaValidator::new();

        let result = validator
            .validate(
                &payload(json!({
                    "version": "1",
                    "id": "x",
                    "detail-type": "WorkflowRunUpdate",
                    "source": "orcabus.wfm",
                    "detail": {"workflowRunId": "wfr.01", "status": "RUNNING"}
                })),
                &default_schema(),
            )
            .await;

        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_bare_payload_is_wrapped() {
        let validator = JsonSchemaValidator::new();

        let result = validator
            .validate(
                &payload(json!({"workflowRunId": "wfr.01", "status": "SUCCEEDED"})),
                &default_schema(),
            )
            .await;

        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_invalid_status_reports_path() {
        let validator = JsonSchemaValidator::new();

        let result = validator
            .validate(
                &payload(json!({"workflowRunId": "wfr.01", "status": "UNKNOWN"})),
                &default_schema(),
            )
            .await;

        assert!(!result.is_valid());
        let messages = result.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("detail -> status: "));
        assert!(messages[0].contains("UNKNOWN"));
    }

    #[tokio::test]
    async fn test_all_violations_are_collected() {
        let validator = JsonSchemaValidator::new();

        let result = validator
            .validate(
                &payload(json!({
                    "version": "1",
                    "detail-type": "WorkflowRunUpdate",
                    "source": "orcabus.wfm",
                    "detail": {"workflowRunId": "wfr.01", "status": "UNKNOWN"}
                })),
                &default_schema(),
            )
            .await;

        let messages = result.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().any(|m| m.starts_with("root: ") && m.contains("\"id\"")));
        assert!(messages.iter().any(|m| m.starts_with("detail -> status: ")));
    }

    #[tokio::test]
    async fn test_broken_schema_is_a_validation_failure() {
        let validator = JsonSchemaValidator::new();

        let result = validator
            .validate(
                &payload(json!({"workflowRunId": "wfr.01", "status": "RUNNING"})),
                &json!({"type": "not-a-type"}),
            )
            .await;

        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 1);
        assert!(result.messages()[0].starts_with("Validation process failed: "));
    }

    #[test]
    fn test_wrapped_detail_is_unmodified() {
        let bare = payload(json!({"workflowRunId": "wfr.01", "status": "RUNNING", "extra": [1, 2]}));

        let envelope = canonical_envelope(&bare);

        assert_eq!(envelope["detail"], Value::Object(bare));
        assert_eq!(envelope["source"], VALIDATION_SOURCE);
        assert_eq!(envelope["detail-type"], VALIDATION_DETAIL_TYPE);
    }

    #[tokio::test]
    async fn test_envelope_fields_are_limited() {
        let envelope = canonical_envelope(&payload(json!({"workflowRunId": "wfr.01"})));

        let mut keys: Vec<&str> = envelope.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["detail", "detail-type", "id", "source", "version"]);

        // A registry schema that forbids extra top-level fields still passes
        let strict = json!({
            "type": "object",
            "properties": {
                "version": {"type": "string"},
                "id": {"type": "string"},
                "source": {"type": "string"},
                "detail-type": {"type": "string"},
                "detail": {"type": "object"}
            },
            "additionalProperties": false
        });
        let result = JsonSchemaValidator::new()
            .validate(&payload(json!({"workflowRunId": "wfr.01"})), &strict)
            .await;
        assert!(result.is_valid(), "{:?}", result.messages());
    }

    #[test]
    fn test_pointer_segments() {
        assert!(pointer_segments("").is_empty());
        assert_eq!(pointer_segments("/detail/status"), vec!["detail", "status"]);
        assert_eq!(pointer_segments("/a~1b/0"), vec!["a/b", "0"]);
    }

    #[test]
    fn test_error_rendering() {
        assert_eq!(ValidationError::new(vec![], "bad").to_string(), "root: bad");
        assert_eq!(
            ValidationError::new(vec!["detail".into(), "status".into()], "bad").to_string(),
            "detail -> status: bad"
        );
    }
}
