//! # Domain Invariants
//!
//! Business rules for the name ledger.

use super::errors::{Address, RegistryError};
use std::collections::HashMap;

/// Default maximum name length in bytes.
pub const MAX_NAME_LENGTH: usize = 32;

/// Invariant: name validity.
///
/// A name must be non-empty and at most `max_len` bytes of UTF-8 before it
/// may enter the ledger through a local call.
pub fn invariant_valid_name(name: &str, max_len: usize) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    if name.len() > max_len {
        return Err(RegistryError::NameTooLong {
            len: name.len(),
            max: max_len,
        });
    }
    Ok(())
}

/// Invariant: the two ledger maps are exact inverses.
pub fn invariant_maps_inverse(
    owner_to_name: &HashMap<Address, String>,
    name_to_owner: &HashMap<String, Address>,
) -> bool {
    owner_to_name.len() == name_to_owner.len()
        && owner_to_name
            .iter()
            .all(|(owner, name)| name_to_owner.get(name) == Some(owner))
}
