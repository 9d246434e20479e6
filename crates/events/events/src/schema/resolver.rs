use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use super::registry::SchemaRegistry;
use super::source::{DefaultSource, FileSource, InlineSource, RegistrySource, SchemaSource, SourceOutcome};
use crate::{EventError, EventResult};

/// Where the standard source chain looks for a schema.
#[derive(Debug, Clone)]
pub struct SchemaSettings {
    pub schema_name: String,
    pub registry_name: String,
    pub inline_schema: Option<String>,
    pub schema_file_path: PathBuf,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            schema_name: "orcabus.workflowmanager@WorkflowRunUpdate".to_string(),
            registry_name: "discovered-schemas".to_string(),
            inline_schema: None,
            schema_file_path: PathBuf::from("schema.json"),
        }
    }
}

/// Resolves a schema by trying sources in order until one yields.
pub struct SchemaResolver {
    sources: Vec<Box<dyn SchemaSource>>,
}

impl SchemaResolver {
    /// Creates a resolver with no sources.
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    /// The standard chain: registry, inline override, file, built-in default.
    pub fn standard(registry: Arc<dyn SchemaRegistry>, settings: SchemaSettings) -> Self {
        Self::new()
            .with_source(RegistrySource::new(
                registry,
                settings.schema_name,
                settings.registry_name,
            ))
            .with_source(InlineSource::new(settings.inline_schema))
            .with_source(FileSource::new(settings.schema_file_path))
            .with_source(DefaultSource)
    }

    /// Appends a source to the end of the chain.
    pub fn with_source(mut self, source: impl SchemaSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Returns the first schema any source yields.
    ///
    /// Fails with [`EventError::SchemaUnavailable`] when a source errors
    /// unexpectedly or every source is skipped.
    pub async fn resolve(&self) -> EventResult<Value> {
        for source in &self.sources {
            match source.load().await {
                Ok(SourceOutcome::Loaded(schema)) => {
                    tracing::info!("Schema loaded from {} source", source.name());
                    return Ok(schema);
                }
                Ok(SourceOutcome::Skipped(reason)) => {
                    tracing::warn!("Schema source {} skipped ({}), trying fallback", source.name(), reason);
                }
                Err(e) => {
                    tracing::error!("Error loading schema from {} source: {}", source.name(), e);
                    return Err(match e {
                        EventError::SchemaUnavailable(_) => e,
                        other => EventError::SchemaUnavailable(other.to_string()),
                    });
                }
            }
        }

        Err(EventError::SchemaUnavailable(
            "no schema source produced a schema".to_string(),
        ))
    }
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::new()
    }
}
