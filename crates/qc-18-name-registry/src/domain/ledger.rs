//! # Name Ledger
//!
//! Authoritative owner <-> name state for one domain.
//!
//! Both maps live behind one mutation API so they can never drift apart:
//! every `&mut self` method leaves them exact inverses before returning.

use super::errors::{Address, RegistryError};
use super::invariants::{invariant_maps_inverse, invariant_valid_name, MAX_NAME_LENGTH};
use std::collections::HashMap;

/// Result of a successful local claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Owner had no name before.
    Claimed,
    /// Owner already held exactly this name.
    Unchanged,
    /// Owner's previous name was freed.
    Replaced {
        /// The name that was released
        previous: String,
    },
}

impl ClaimOutcome {
    /// Name released by this claim, if any.
    pub fn previous(&self) -> Option<&str> {
        match self {
            Self::Replaced { previous } => Some(previous),
            _ => None,
        }
    }
}

/// Result of applying an inbound update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedUpdate {
    /// Name the owner held before, if any.
    pub previous_name: Option<String>,
    /// Local owner displaced from the name, if any.
    pub evicted: Option<Address>,
}

/// Per-domain name ledger.
#[derive(Clone, Debug)]
pub struct NameLedger {
    owner_to_name: HashMap<Address, String>,
    name_to_owner: HashMap<String, Address>,
    max_name_length: usize,
}

impl Default for NameLedger {
    fn default() -> Self {
        Self::new(MAX_NAME_LENGTH)
    }
}

impl NameLedger {
    /// Create an empty ledger accepting names up to `max_name_length` bytes.
    pub fn new(max_name_length: usize) -> Self {
        Self {
            owner_to_name: HashMap::new(),
            name_to_owner: HashMap::new(),
            max_name_length,
        }
    }

    /// Configured maximum name length in bytes.
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Check validity only.
    pub fn validate_name(&self, name: &str) -> Result<(), RegistryError> {
        invariant_valid_name(name, self.max_name_length)
    }

    /// Check that `owner` may take `name` without mutating anything.
    pub fn check_available(&self, owner: &Address, name: &str) -> Result<(), RegistryError> {
        match self.name_to_owner.get(name) {
            Some(holder) if holder != owner => Err(RegistryError::AlreadyClaimed {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Claim `name` for `owner`.
    ///
    /// Re-claiming the name the owner already holds succeeds without change.
    pub fn claim(&mut self, owner: Address, name: &str) -> Result<ClaimOutcome, RegistryError> {
        self.validate_name(name)?;
        self.check_available(&owner, name)?;

        let outcome = match self.release_if_owned(&owner) {
            None => ClaimOutcome::Claimed,
            Some(previous) if previous == name => ClaimOutcome::Unchanged,
            Some(previous) => ClaimOutcome::Replaced { previous },
        };
        self.install(owner, name.to_string());
        Ok(outcome)
    }

    /// Install `name` for `owner` without validity or conflict checks.
    ///
    /// Used for updates arriving from trusted remote domains. A different
    /// local holder of `name` loses it entirely, so both maps stay inverse.
    pub fn apply_unconditionally(&mut self, owner: Address, name: String) -> AppliedUpdate {
        let previous_name = self.release_if_owned(&owner);
        let evicted = self.name_to_owner.remove(&name);
        if let Some(evicted) = evicted {
            self.owner_to_name.remove(&evicted);
        }
        self.install(owner, name);
        AppliedUpdate {
            previous_name,
            evicted,
        }
    }

    /// Name held by `owner`.
    pub fn name_of(&self, owner: &Address) -> Option<&str> {
        self.owner_to_name.get(owner).map(String::as_str)
    }

    /// Owner of `name`.
    pub fn owner_of(&self, name: &str) -> Option<Address> {
        self.name_to_owner.get(name).copied()
    }

    /// Number of claimed names.
    pub fn len(&self) -> usize {
        self.owner_to_name.len()
    }

    /// True when nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.owner_to_name.is_empty()
    }

    /// Iterate over (owner, name) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &str)> {
        self.owner_to_name
            .iter()
            .map(|(owner, name)| (owner, name.as_str()))
    }

    /// Verify that both maps are exact inverses.
    pub fn check_invariants(&self) -> bool {
        invariant_maps_inverse(&self.owner_to_name, &self.name_to_owner)
    }

    /// Drop the reverse entry for the owner's current name.
    ///
    /// The forward entry is left for `install` to overwrite; callers must
    /// install before returning.
    fn release_if_owned(&mut self, owner: &Address) -> Option<String> {
        let current = self.owner_to_name.get(owner)?.clone();
        self.name_to_owner.remove(&current);
        Some(current)
    }

    fn install(&mut self, owner: Address, name: String) {
        self.name_to_owner.insert(name.clone(), owner);
        self.owner_to_name.insert(owner, name);
    }
}
