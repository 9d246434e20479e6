//! # WRU Validator Events
//!
//! Event plumbing for the workflow-run-update validation gateway:
//! - Schema registry lookup with ordered fallback sources
//! - Draft-07 validation of the canonical event envelope
//! - Outbound event records with a fixed source and detail type
//! - Bus transport trait, in-memory bus, and the publisher
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wru_validator_events::{EventPublisher, MemoryEventBus};
//! use wru_validator_events::schema::{MemorySchemaRegistry, SchemaResolver, SchemaSettings};
//!
//! let resolver = SchemaResolver::standard(
//!     Arc::new(MemorySchemaRegistry::new()),
//!     SchemaSettings::default(),
//! );
//! let schema = resolver.resolve().await?;
//!
//! let publisher = EventPublisher::new(Arc::new(MemoryEventBus::new()), "default");
//! let event_id = publisher.publish(&payload).await?;
//! ```

mod bus;
mod error;
mod event;
mod publisher;
pub mod schema;

pub use bus::{BusError, DeliveredEvent, EventBusTransport, MemoryEventBus};
pub use error::{EventError, EventResult};
pub use event::{OutboundEvent, PutEventsResponse, PutEventsResultEntry, DETAIL_TYPE, EVENT_SOURCE, RESOURCES_KEY};
pub use publisher::EventPublisher;
