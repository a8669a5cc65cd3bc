//! # Wire Codec
//!
//! Fixed encoding of the `(owner, name)` fact carried between domains:
//!
//! ```text
//! [ owner: 20 bytes ][ name length: u64 LE ][ name: UTF-8 bytes ]
//! ```
//!
//! Decoding is strict: truncated input, invalid UTF-8, trailing bytes and
//! payloads over [`MAX_PAYLOAD_BYTES`] are all rejected.

use crate::domain::{Address, RegistryError};
use bincode::Options;
use serde::{Deserialize, Serialize};

/// Hard upper bound on an encoded payload.
pub const MAX_PAYLOAD_BYTES: usize = 4096;

/// Owner width on the wire.
pub const OWNER_BYTES: usize = 20;

/// Name length prefix width on the wire.
pub const LENGTH_PREFIX_BYTES: usize = 8;

/// One name-ownership fact bound for a remote domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSyncPayload {
    /// Owner identity.
    pub owner: Address,
    /// Claimed name.
    pub name: String,
}

impl NameSyncPayload {
    /// Create a payload.
    pub fn new(owner: Address, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }

    /// Exact encoded size.
    pub fn encoded_len(&self) -> usize {
        OWNER_BYTES + LENGTH_PREFIX_BYTES + self.name.len()
    }
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
        .with_limit(MAX_PAYLOAD_BYTES as u64)
}

/// Encode a payload.
pub fn encode_payload(payload: &NameSyncPayload) -> Result<Vec<u8>, RegistryError> {
    wire_options()
        .serialize(payload)
        .map_err(|e| RegistryError::Encode(e.to_string()))
}

/// Decode a payload received from a remote domain.
pub fn decode_payload(bytes: &[u8]) -> Result<NameSyncPayload, RegistryError> {
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(RegistryError::Decode(format!(
            "payload of {} bytes exceeds {MAX_PAYLOAD_BYTES}",
            bytes.len()
        )));
    }
    wire_options()
        .deserialize(bytes)
        .map_err(|e| RegistryError::Decode(e.to_string()))
}
