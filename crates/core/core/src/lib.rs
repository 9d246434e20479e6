//! # WRU Validator Core
//!
//! The validation gateway for workflow run updates. It takes a request in
//! any of the supported upstream shapes, extracts the payload, resolves a
//! schema, validates the payload, and republishes it onto the event bus
//! under a fixed source and detail type.

pub mod error;
pub mod extract;
pub mod gateway;
pub mod response;

pub use error::{GatewayError, GatewayResult};
pub use extract::{extract, ExtractionRule, Payload, EXTRACTION_RULES};
pub use gateway::{Stage, StageFailure, ValidationGateway};
pub use response::{GatewayResponse, ResponseBody};

// Re-export the event plumbing the gateway is assembled from
pub use wru_validator_events as events;
