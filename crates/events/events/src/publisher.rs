//! Republishes validated payloads onto the event bus.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::bus::{BusError, EventBusTransport};
use crate::error::{EventError, EventResult};
use crate::event::OutboundEvent;

/// Builds outbound records and sends them through a bus transport.
pub struct EventPublisher {
    transport: Arc<dyn EventBusTransport>,
    event_bus_name: String,
}

impl EventPublisher {
    /// Creates a publisher targeting `event_bus_name`.
    pub fn new(transport: Arc<dyn EventBusTransport>, event_bus_name: impl Into<String>) -> Self {
        Self {
            transport,
            event_bus_name: event_bus_name.into(),
        }
    }

    /// The bus this publisher sends to.
    pub fn event_bus_name(&self) -> &str {
        &self.event_bus_name
    }

    /// Publishes one payload and returns the identifier the bus assigned.
    ///
    /// Every failure, including transport errors, comes back as
    /// [`EventError::PublishFailed`].
    pub async fn publish(&self, payload: &Map<String, Value>) -> EventResult<String> {
        tracing::info!("Using event bus: {}", self.event_bus_name);

        let entry = OutboundEvent::from_payload(payload, &self.event_bus_name).map_err(|e| {
            EventError::PublishFailed(format!("Unexpected error sending to event bus: {}", e))
        })?;

        tracing::info!("Emitting event: {:?}", entry);

        let response = match self.transport.put_events(vec![entry]).await {
            Ok(response) => response,
            Err(BusError::Api { code, message }) => {
                tracing::error!("Event bus API error ({}): {}", code, message);
                return Err(EventError::PublishFailed(format!("Event bus error: {}", message)));
            }
            Err(BusError::Unavailable(message)) => {
                tracing::error!("Event bus unavailable: {}", message);
                return Err(EventError::PublishFailed(format!("Event bus error: {}", message)));
            }
        };

        if response.failed_entry_count > 0 {
            let errors: Vec<&str> = response
                .entries
                .iter()
                .filter(|entry| entry.is_failure())
                .map(|entry| entry.error_message.as_deref().unwrap_or("Unknown error"))
                .collect();
            return Err(EventError::PublishFailed(format!(
                "put_events failed: {}",
                errors.join(", ")
            )));
        }

        let event_id = response
            .entries
            .first()
            .and_then(|entry| entry.event_id.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(event_id)
    }
}
