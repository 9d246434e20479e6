//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use wru_validator_core::events::schema::SchemaSettings;

/// Gateway configuration.
///
/// Resolved from defaults, then an optional TOML file, then environment
/// variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bus validated events are republished to.
    pub event_bus_name: String,
    /// Schema looked up in the registry.
    pub schema_name: String,
    /// Registry holding the schema.
    pub schema_registry_name: String,
    /// Raw JSON Schema used when the registry has none.
    pub validation_schema: Option<String>,
    /// Schema file used when neither registry nor override yield one.
    pub schema_file_path: PathBuf,
    /// Log level.
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            event_bus_name: "default".to_string(),
            schema_name: "orcabus.workflowmanager@WorkflowRunUpdate".to_string(),
            schema_registry_name: "discovered-schemas".to_string(),
            validation_schema: None,
            schema_file_path: PathBuf::from("schema.json"),
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overrides fields from `lookup`; unset or empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("EVENT_BUS_NAME") {
            self.event_bus_name = v;
        }
        if let Some(v) = get("SCHEMA_NAME") {
            self.schema_name = v;
        }
        if let Some(v) = get("SCHEMA_REGISTRY_NAME") {
            self.schema_registry_name = v;
        }
        if let Some(v) = get("VALIDATION_SCHEMA") {
            self.validation_schema = Some(v);
        }
        if let Some(v) = get("SCHEMA_FILE_PATH") {
            self.schema_file_path = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v;
        }
    }

    /// Where the schema resolver should look.
    pub fn schema_settings(&self) -> SchemaSettings {
        SchemaSettings {
            schema_name: self.schema_name.clone(),
            registry_name: self.schema_registry_name.clone(),
            inline_schema: self.validation_schema.clone(),
            schema_file_path: self.schema_file_path.clone(),
        }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &str) -> Result<GatewayConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_config(&content)
}

/// Parses configuration from TOML text. Missing keys keep their defaults.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: toml::Value =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    // Settings may sit at the top level or under a [gateway] table
    let table = config.get("gateway").cloned().unwrap_or(config);

    toml::Value::try_into(table).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.event_bus_name, "default");
        assert_eq!(config.schema_name, "orcabus.workflowmanager@WorkflowRunUpdate");
        assert_eq!(config.schema_registry_name, "discovered-schemas");
        assert_eq!(config.schema_file_path, PathBuf::from("schema.json"));
        assert!(config.validation_schema.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("EVENT_BUS_NAME", "orcabus"),
            ("VALIDATION_SCHEMA", r#"{"type": "object"}"#),
            ("SCHEMA_FILE_PATH", "/opt/schema.json"),
            ("SCHEMA_NAME", ""),
        ]
        .into_iter()
        .collect();

        let mut config = GatewayConfig::default();
        config.apply_env_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.event_bus_name, "orcabus");
        assert_eq!(config.validation_schema.as_deref(), Some(r#"{"type": "object"}"#));
        assert_eq!(config.schema_file_path, PathBuf::from("/opt/schema.json"));
        assert_eq!(config.schema_name, "orcabus.workflowmanager@WorkflowRunUpdate");
    }

    #[test]
    fn test_from_env_layers_over_defaults() {
        let mut expected = GatewayConfig::default();
        expected.apply_env();

        assert_eq!(GatewayConfig::from_env(), expected);
    }

    #[test]
    fn test_parse_toml_config() {
        let config = parse_config(
            r#"
            [gateway]
            event_bus_name = "orcabus"
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.event_bus_name, "orcabus");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.schema_registry_name, "discovered-schemas");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        assert!(matches!(parse_config("event_bus_name = "), Err(ConfigError::ParseError(_))));
        assert!(matches!(
            load_config("/nonexistent/wru-validator.toml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_schema_settings() {
        let config = GatewayConfig {
            validation_schema: Some("{}".to_string()),
            ..GatewayConfig::default()
        };
        let settings = config.schema_settings();
        assert_eq!(settings.registry_name, "discovered-schemas");
        assert_eq!(settings.inline_schema.as_deref(), Some("{}"));
    }
}
