use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{EventError, EventResult};

/// Declared format of a registry schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaType {
    JsonSchemaDraft4,
    JsonSchemaDraft7,
    OpenApi3,
    /// A format this gateway cannot use.
    Other(String),
}

impl SchemaType {
    pub fn as_str(&self) -> &str {
        match self {
            SchemaType::JsonSchemaDraft4 => "JSONSchemaDraft4",
            SchemaType::JsonSchemaDraft7 => "JSONSchemaDraft7",
            SchemaType::OpenApi3 => "OpenApi3",
            SchemaType::Other(other) => other,
        }
    }
}

impl Default for SchemaType {
    fn default() -> Self {
        SchemaType::JsonSchemaDraft4
    }
}

impl From<String> for SchemaType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "JSONSchemaDraft4" => SchemaType::JsonSchemaDraft4,
            "JSONSchemaDraft7" => SchemaType::JsonSchemaDraft7,
            "OpenApi3" => SchemaType::OpenApi3,
            _ => SchemaType::Other(value),
        }
    }
}

impl From<SchemaType> for String {
    fn from(value: SchemaType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema as returned by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySchema {
    pub schema_name: String,
    pub registry_name: String,
    pub version: u32,
    /// Raw schema document. Registries may omit it.
    pub content: Option<String>,
    #[serde(default)]
    pub schema_type: SchemaType,
    pub last_modified: DateTime<Utc>,
}

/// Failure of a registry lookup.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("schema '{schema_name}' not found in registry '{registry_name}'")]
    NotFound {
        schema_name: String,
        registry_name: String,
    },

    #[error("access denied to schema '{schema_name}' in registry '{registry_name}'")]
    Forbidden {
        schema_name: String,
        registry_name: String,
    },

    #[error("schema registry API error ({code}): {message}")]
    Api { code: String, message: String },
}

/// Looks up named schemas in a schema registry.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Returns the latest version of `schema_name` in `registry_name`.
    async fn describe_schema(
        &self,
        schema_name: &str,
        registry_name: &str,
    ) -> Result<RegistrySchema, RegistryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SchemaKey {
    registry_name: String,
    schema_name: String,
}

impl SchemaKey {
    fn new(registry_name: &str, schema_name: &str) -> Self {
        Self {
            registry_name: registry_name.to_string(),
            schema_name: schema_name.to_string(),
        }
    }
}

/// In-memory schema registry keeping every registered version.
pub struct MemorySchemaRegistry {
    schemas: Arc<RwLock<HashMap<SchemaKey, Vec<RegistrySchema>>>>,
    denied: Arc<RwLock<HashSet<SchemaKey>>>,
}

impl MemorySchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
            denied: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Registers a new version of a schema and returns its version number.
    pub async fn register(
        &self,
        registry_name: &str,
        schema_name: &str,
        schema_type: SchemaType,
        content: impl Into<String>,
    ) -> u32 {
        let key = SchemaKey::new(registry_name, schema_name);
        let mut schemas = self.schemas.write().await;
        let versions = schemas.entry(key).or_default();
        let version = versions.last().map(|s| s.version + 1).unwrap_or(1);

        versions.push(RegistrySchema {
            schema_name: schema_name.to_string(),
            registry_name: registry_name.to_string(),
            version,
            content: Some(content.into()),
            schema_type,
            last_modified: Utc::now(),
        });

        tracing::info!(
            "Registered schema {} version {} in registry {}",
            schema_name,
            version,
            registry_name
        );

        version
    }

    /// Registers a schema entry as-is, e.g. one without content.
    pub async fn register_raw(&self, schema: RegistrySchema) {
        let key = SchemaKey::new(&schema.registry_name, &schema.schema_name);
        let mut schemas = self.schemas.write().await;
        schemas.entry(key).or_default().push(schema);
    }

    /// Denies access to a schema; lookups report `Forbidden`.
    pub async fn deny(&self, registry_name: &str, schema_name: &str) {
        let mut denied = self.denied.write().await;
        denied.insert(SchemaKey::new(registry_name, schema_name));
    }

    /// Lists all versions of a schema, oldest first.
    pub async fn list_versions(&self, registry_name: &str, schema_name: &str) -> Vec<RegistrySchema> {
        let schemas = self.schemas.read().await;
        let mut versions = schemas
            .get(&SchemaKey::new(registry_name, schema_name))
            .cloned()
            .unwrap_or_default();
        versions.sort_by_key(|s| s.version);
        versions
    }

    /// Removes a schema and all its versions.
    pub async fn unregister(&self, registry_name: &str, schema_name: &str) -> EventResult<()> {
        let mut schemas = self.schemas.write().await;

        if schemas.remove(&SchemaKey::new(registry_name, schema_name)).is_some() {
            tracing::info!("Unregistered schema {} from registry {}", schema_name, registry_name);
            Ok(())
        } else {
            Err(EventError::Registry(format!(
                "Schema {} not found in registry {}",
                schema_name, registry_name
            )))
        }
    }

    /// Counts schemas per registry.
    pub async fn stats(&self) -> RegistryStats {
        let schemas = self.schemas.read().await;

        let mut by_registry = HashMap::new();
        for key in schemas.keys() {
            *by_registry.entry(key.registry_name.clone()).or_insert(0) += 1;
        }

        RegistryStats {
            total_schemas: schemas.len(),
            by_registry,
        }
    }
}

impl Default for MemorySchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaRegistry for MemorySchemaRegistry {
    async fn describe_schema(
        &self,
        schema_name: &str,
        registry_name: &str,
    ) -> Result<RegistrySchema, RegistryError> {
        let key = SchemaKey::new(registry_name, schema_name);

        if self.denied.read().await.contains(&key) {
            return Err(RegistryError::Forbidden {
                schema_name: schema_name.to_string(),
                registry_name: registry_name.to_string(),
            });
        }

        let schemas = self.schemas.read().await;
        schemas
            .get(&key)
            .and_then(|versions| versions.iter().max_by_key(|s| s.version))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                schema_name: schema_name.to_string(),
                registry_name: registry_name.to_string(),
            })
    }
}

/// Statistics about the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_schemas: usize,
    pub by_registry: HashMap<String, usize>,
}
