//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound transport port.

mod in_memory_transport;

pub use in_memory_transport::{
    DeliveryOutcome, InFlightMessage, InMemoryEndpoint, InMemoryNetwork, PricingModel,
};
