//! # Domain Module
//!
//! Core domain types for the Cross-Chain Name Registry.

pub mod config;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ledger;
pub mod value_objects;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use ledger::*;
pub use value_objects::*;
