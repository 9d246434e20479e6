//! The request pipeline: extract, resolve schema, validate, publish.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use wru_validator_events::schema::{SchemaResolver, SchemaValidator};
use wru_validator_events::EventPublisher;

use crate::error::GatewayError;
use crate::extract::extract;
use crate::response::GatewayResponse;

/// Pipeline stages, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Extracted,
    SchemaLoaded,
    Validated,
    Published,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Extracted => "extracted",
            Stage::SchemaLoaded => "schema_loaded",
            Stage::Validated => "validated",
            Stage::Published => "published",
        };
        f.write_str(name)
    }
}

/// A request that stopped before reaching `stage`.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: GatewayError,
}

impl StageFailure {
    fn at(stage: Stage) -> impl FnOnce(GatewayError) -> Self {
        move |error| Self { stage, error }
    }
}

/// Validates workflow run updates and republishes them onto the bus.
///
/// Transports live inside the resolver and publisher; the gateway holds
/// no other state, so one instance serves every invocation of a process.
pub struct ValidationGateway {
    resolver: SchemaResolver,
    validator: Arc<dyn SchemaValidator>,
    publisher: EventPublisher,
}

impl ValidationGateway {
    /// Creates a gateway from its resolver, validator and publisher.
    pub fn new(resolver: SchemaResolver, validator: Arc<dyn SchemaValidator>, publisher: EventPublisher) -> Self {
        Self {
            resolver,
            validator,
            publisher,
        }
    }

    /// Handles one request. Always returns a well-formed response, even
    /// when a transport panics mid-pipeline.
    pub async fn handle(&self, request: &Value) -> GatewayResponse {
        tracing::info!("Processing event: {}", request);

        let outcome = AssertUnwindSafe(self.run(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(StageFailure {
                    stage: Stage::Start,
                    error: GatewayError::internal(panic_message(panic.as_ref())),
                })
            });

        match outcome {
            Ok(event_id) => {
                tracing::info!("Successfully processed and forwarded event: {}", event_id);
                GatewayResponse::forwarded(event_id)
            }
            Err(StageFailure { stage, error }) => {
                match &error {
                    GatewayError::SchemaViolation { errors } => {
                        tracing::warn!("Validation failed: {:?}", errors)
                    }
                    GatewayError::PublishFailed { reason } => {
                        tracing::error!("Event bus send failed: {}", reason)
                    }
                    GatewayError::SchemaUnavailable { reason } => {
                        tracing::error!("Schema resolution failed: {}", reason)
                    }
                    GatewayError::Internal { message } => {
                        tracing::error!("Unhandled error processing event: {}", message)
                    }
                    other => tracing::warn!("Rejected request before {}: {}", stage, other),
                }
                GatewayResponse::from(&error)
            }
        }
    }

    /// Runs the pipeline and returns the bus-assigned event id.
    pub async fn run(&self, request: &Value) -> Result<String, StageFailure> {
        tracing::info!("Extracting payload from event");
        let payload = extract(request).map_err(StageFailure::at(Stage::Extracted))?;

        tracing::info!("Loading validation schema");
        let schema = self
            .resolver
            .resolve()
            .await
            .map_err(|e| StageFailure::at(Stage::SchemaLoaded)(e.into()))?;

        tracing::info!("Validating payload against schema");
        let result = self.validator.validate(&payload, &schema).await;
        if !result.is_valid() {
            return Err(StageFailure {
                stage: Stage::Validated,
                error: GatewayError::SchemaViolation {
                    errors: result.messages(),
                },
            });
        }

        tracing::info!("Forwarding validated payload to {}", self.publisher.event_bus_name());
        self.publisher
            .publish(&payload)
            .await
            .map_err(|e| StageFailure::at(Stage::Published)(e.into()))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "pipeline panicked".to_string()
    }
}
