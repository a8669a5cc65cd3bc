//! # Algorithms Module
//!
//! Pure building blocks of the synchronisation protocol.

pub mod codec;
pub mod fee_split;

pub use codec::{decode_payload, encode_payload, NameSyncPayload, MAX_PAYLOAD_BYTES};
pub use fee_split::split_evenly;
