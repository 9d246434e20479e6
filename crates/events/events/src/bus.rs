//! Event bus transport and an in-memory bus.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::event::{OutboundEvent, PutEventsResponse, PutEventsResultEntry};

/// Transport-level failure of a put-events call.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// The bus API returned an error for the whole call.
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// The bus could not be reached.
    #[error("{0}")]
    Unavailable(String),
}

/// Sends entries to an event bus.
///
/// Implementations are built once per process and shared read-only
/// between invocations.
#[async_trait]
pub trait EventBusTransport: Send + Sync {
    /// Puts a batch of entries and reports a per-entry outcome.
    async fn put_events(&self, entries: Vec<OutboundEvent>) -> Result<PutEventsResponse, BusError>;
}

/// An accepted entry kept in the bus history.
#[derive(Debug, Clone)]
pub struct DeliveredEvent {
    /// Identifier assigned by the bus.
    pub event_id: String,
    /// The accepted record.
    pub record: OutboundEvent,
    /// When the bus accepted it.
    pub received_at: DateTime<Utc>,
}

/// In-memory event bus, used for local runs and tests.
pub struct MemoryEventBus {
    /// Accepted events, oldest first.
    history: RwLock<Vec<DeliveredEvent>>,
    /// Maximum history size.
    max_history: usize,
    /// Buses that reject every entry, with the error to report.
    rejections: RwLock<HashMap<String, (String, String)>>,
}

impl MemoryEventBus {
    /// Creates a new bus.
    pub fn new() -> Self {
        Self::with_history_size(1000)
    }

    /// Creates a bus with a custom history size.
    pub fn with_history_size(max_history: usize) -> Self {
        Self {
            history: RwLock::new(Vec::new()),
            max_history,
            rejections: RwLock::new(HashMap::new()),
        }
    }

    /// Makes every entry addressed to `bus_name` fail with the given error.
    pub async fn reject_bus(
        &self,
        bus_name: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        let mut rejections = self.rejections.write().await;
        rejections.insert(bus_name.into(), (code.into(), message.into()));
    }

    /// Gets recent events from history, newest first.
    pub async fn recent_events(&self, count: usize) -> Vec<DeliveredEvent> {
        let history = self.history.read().await;
        history.iter().rev().take(count).cloned().collect()
    }

    /// Gets the accepted events addressed to a bus.
    pub async fn events_on_bus(&self, bus_name: &str) -> Vec<DeliveredEvent> {
        let history = self.history.read().await;
        history
            .iter()
            .filter(|e| e.record.event_bus_name == bus_name)
            .cloned()
            .collect()
    }

    /// Clears event history.
    pub async fn clear_history(&self) {
        let mut history = self.history.write().await;
        history.clear();
    }

    async fn store_in_history(&self, event: DeliveredEvent) {
        let mut history = self.history.write().await;
        history.push(event);
        if history.len() > self.max_history {
            history.remove(0);
        }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBusTransport for MemoryEventBus {
    async fn put_events(&self, entries: Vec<OutboundEvent>) -> Result<PutEventsResponse, BusError> {
        let mut results = Vec::with_capacity(entries.len());

        for record in entries {
            let rejection = {
                let rejections = self.rejections.read().await;
                rejections.get(&record.event_bus_name).cloned()
            };

            if let Some((code, message)) = rejection {
                tracing::warn!("Bus '{}' rejected entry: {}", record.event_bus_name, message);
                results.push(PutEventsResultEntry::rejected(code, message));
                continue;
            }

            let event_id = uuid::Uuid::new_v4().to_string();
            self.store_in_history(DeliveredEvent {
                event_id: event_id.clone(),
                record,
                received_at: Utc::now(),
            })
            .await;
            results.push(PutEventsResultEntry::accepted(event_id));
        }

        Ok(PutEventsResponse::from_entries(results))
    }
}
