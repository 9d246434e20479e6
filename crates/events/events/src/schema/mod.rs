//! Schema resolution and validation
//!
//! Provides the schema side of the gateway:
//! - Registry lookup (JSON Schema or OpenAPI documents)
//! - Ordered fallback through inline, file and built-in schemas
//! - Draft-07 validation with every violation reported

mod default;
mod openapi;
mod registry;
mod resolver;
mod source;
mod validator;

pub use default::{default_schema, WORKFLOW_RUN_STATUSES};
pub use openapi::{extract_schema as extract_openapi_schema, to_json_schema, DRAFT_07_URI, PREFERRED_SCHEMA_KEYS};
pub use registry::{MemorySchemaRegistry, RegistryError, RegistrySchema, RegistryStats, SchemaRegistry, SchemaType};
pub use resolver::{SchemaResolver, SchemaSettings};
pub use source::{DefaultSource, FileSource, InlineSource, RegistrySource, SchemaSource, SourceOutcome};
pub use validator::{
    canonical_envelope, JsonSchemaValidator, SchemaValidator, ValidationError, ValidationResult,
    VALIDATION_DETAIL_TYPE, VALIDATION_SOURCE, VALIDATION_VERSION,
};
