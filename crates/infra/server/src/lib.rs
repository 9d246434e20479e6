//! # WRU Validator Server
//!
//! Wires the validation gateway to its configuration and transports, and
//! runs it against requests read from an input stream.

mod config;

pub use config::{load_config, parse_config, ConfigError, GatewayConfig};

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use wru_validator_core::events::schema::{JsonSchemaValidator, SchemaRegistry, SchemaResolver};
use wru_validator_core::events::{EventBusTransport, EventPublisher};
use wru_validator_core::{GatewayResponse, ValidationGateway};

/// Builds a gateway from configuration and transport handles.
pub fn build_gateway(
    config: &GatewayConfig,
    registry: Arc<dyn SchemaRegistry>,
    bus: Arc<dyn EventBusTransport>,
) -> ValidationGateway {
    ValidationGateway::new(
        SchemaResolver::standard(registry, config.schema_settings()),
        Arc::new(JsonSchemaValidator::new()),
        EventPublisher::new(bus, config.event_bus_name.clone()),
    )
}

/// A configured gateway serving one request per invocation.
pub struct GatewayServer {
    /// Server configuration.
    pub config: GatewayConfig,
    gateway: ValidationGateway,
}

impl GatewayServer {
    /// Creates a server with the given transports.
    pub fn new(config: GatewayConfig, registry: Arc<dyn SchemaRegistry>, bus: Arc<dyn EventBusTransport>) -> Self {
        let gateway = build_gateway(&config, registry, bus);
        Self { config, gateway }
    }

    /// Handles a raw request. Text that is not JSON is passed on as a
    /// string so the gateway reports it as malformed.
    pub async fn handle_raw(&self, raw: &str) -> GatewayResponse {
        let request = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        self.gateway.handle(&request).await
    }

    /// Reads one request from `input` and writes the JSON response to `output`.
    pub async fn run<R, W>(&self, mut input: R, mut output: W) -> Result<GatewayResponse, std::io::Error>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("Using event bus {}", self.config.event_bus_name);

        let mut raw = String::new();
        input.read_to_string(&mut raw).await?;

        let response = self.handle_raw(raw.trim()).await;

        let mut rendered = serde_json::to_vec(&response)?;
        rendered.push(b'\n');
        output.write_all(&rendered).await?;
        output.flush().await?;

        Ok(response)
    }
}
