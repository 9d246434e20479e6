//! WRU validator binary.
//!
//! Reads one request from stdin and prints the gateway response.

use std::str::FromStr;
use std::sync::Arc;

use wru_validator_core::events::schema::MemorySchemaRegistry;
use wru_validator_core::events::MemoryEventBus;
use wru_validator_server::{load_config, GatewayConfig, GatewayServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration: defaults, optional TOML file, then environment
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let mut config = load_config(&path)?;
            config.apply_env();
            config
        }
        None => GatewayConfig::from_env(),
    };

    // Initialize tracing
    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let server = GatewayServer::new(
        config,
        Arc::new(MemorySchemaRegistry::new()),
        Arc::new(MemoryEventBus::new()),
    );
    server.run(tokio::io::stdin(), tokio::io::stdout()).await?;

    Ok(())
}
