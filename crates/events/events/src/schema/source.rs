//! Places a validation schema can come from.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use super::default::default_schema;
use super::openapi;
use super::registry::{RegistryError, SchemaRegistry, SchemaType};
use crate::{EventError, EventResult};

/// Outcome of asking one source for a schema.
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    /// The source produced a schema.
    Loaded(Value),
    /// The source had nothing usable; resolution moves on.
    Skipped(String),
}

/// A source of validation schemas.
///
/// Expected misses are reported as [`SourceOutcome::Skipped`]. An `Err`
/// means something unexpected went wrong and aborts resolution.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Loads the schema, or reports why this source has none.
    async fn load(&self) -> EventResult<SourceOutcome>;
}

/// Named schema from a schema registry.
pub struct RegistrySource {
    registry: Arc<dyn SchemaRegistry>,
    schema_name: String,
    registry_name: String,
}

impl RegistrySource {
    /// Looks up `schema_name` in `registry_name`.
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        schema_name: impl Into<String>,
        registry_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            schema_name: schema_name.into(),
            registry_name: registry_name.into(),
        }
    }
}

#[async_trait]
impl SchemaSource for RegistrySource {
    fn name(&self) -> &str {
        "registry"
    }

    async fn load(&self) -> EventResult<SourceOutcome> {
        tracing::info!(
            "Loading schema '{}' from registry '{}'",
            self.schema_name,
            self.registry_name
        );

        let schema = match self
            .registry
            .describe_schema(&self.schema_name, &self.registry_name)
            .await
        {
            Ok(schema) => schema,
            Err(err) => {
                match &err {
                    RegistryError::NotFound { .. } => tracing::error!("Schema lookup failed: {}", err),
                    RegistryError::Forbidden { .. } => tracing::error!("Schema lookup denied: {}", err),
                    RegistryError::Api { .. } => tracing::error!("{}", err),
                }
                return Ok(SourceOutcome::Skipped(err.to_string()));
            }
        };

        let Some(content) = schema.content.as_deref().filter(|c| !c.is_empty()) else {
            tracing::error!("No content found for schema '{}'", self.schema_name);
            return Ok(SourceOutcome::Skipped("schema has no content".to_string()));
        };

        let parsed: Value = match serde_json::from_str(content) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Failed to parse schema content as JSON: {}", e);
                return Ok(SourceOutcome::Skipped(format!("invalid schema content: {}", e)));
            }
        };

        match schema.schema_type {
            SchemaType::JsonSchemaDraft4 | SchemaType::JsonSchemaDraft7 => Ok(SourceOutcome::Loaded(parsed)),
            SchemaType::OpenApi3 => match openapi::extract_schema(&parsed) {
                Some(extracted) => Ok(SourceOutcome::Loaded(extracted)),
                None => Ok(SourceOutcome::Skipped(
                    "no schemas in OpenAPI document".to_string(),
                )),
            },
            SchemaType::Other(other) => {
                tracing::error!("Unsupported schema type: {}", other);
                Ok(SourceOutcome::Skipped(format!("unsupported schema type {}", other)))
            }
        }
    }
}

/// Raw JSON Schema supplied through configuration.
pub struct InlineSource {
    raw: Option<String>,
}

impl InlineSource {
    /// Uses `raw` as a JSON Schema when it is set.
    pub fn new(raw: Option<String>) -> Self {
        Self { raw }
    }
}

#[async_trait]
impl SchemaSource for InlineSource {
    fn name(&self) -> &str {
        "inline"
    }

    async fn load(&self) -> EventResult<SourceOutcome> {
        let Some(raw) = self.raw.as_deref() else {
            return Ok(SourceOutcome::Skipped("no inline schema configured".to_string()));
        };

        tracing::info!("Using schema from environment variable");
        match serde_json::from_str(raw) {
            Ok(schema) => Ok(SourceOutcome::Loaded(schema)),
            Err(e) => {
                tracing::error!("Invalid JSON in inline schema: {}", e);
                Ok(SourceOutcome::Skipped(format!("invalid inline schema: {}", e)))
            }
        }
    }
}

/// JSON Schema read from a file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Reads the schema from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SchemaSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> EventResult<SourceOutcome> {
        tracing::info!("Attempting to load schema from file: {}", self.path.display());

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Schema file not found: {}", self.path.display());
                return Ok(SourceOutcome::Skipped("schema file not found".to_string()));
            }
            Err(e) => {
                return Err(EventError::SchemaUnavailable(format!(
                    "cannot read schema file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        match serde_json::from_str(&content) {
            Ok(schema) => Ok(SourceOutcome::Loaded(schema)),
            Err(e) => {
                tracing::error!("Invalid JSON in schema file {}: {}", self.path.display(), e);
                Ok(SourceOutcome::Skipped(format!("invalid schema file: {}", e)))
            }
        }
    }
}

/// The built-in `WorkflowRunUpdate` schema. Never misses.
pub struct DefaultSource;

#[async_trait]
impl SchemaSource for DefaultSource {
    fn name(&self) -> &str {
        "default"
    }

    async fn load(&self) -> EventResult<SourceOutcome> {
        tracing::warn!("Using default schema as fallback");
        Ok(SourceOutcome::Loaded(default_schema()))
    }
}
