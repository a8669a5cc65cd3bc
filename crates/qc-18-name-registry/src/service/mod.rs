//! # Service Layer
//!
//! Wires the ledger, codec and fee aggregation to the transport port.

pub mod fee_aggregator;
mod registry_service;

pub use fee_aggregator::{aggregate_fees, resolve_routes, Route};
pub use registry_service::NameRegistryService;
