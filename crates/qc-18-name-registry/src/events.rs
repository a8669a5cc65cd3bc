//! Registry events for off-chain indexing.
//!
//! Events never affect behaviour; publishing with no subscribers is fine.

use crate::domain::{Address, DomainId};
use serde::{Deserialize, Serialize};

/// Event emitted by a registry instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A local claim succeeded.
    NameClaimed {
        /// Claiming owner
        owner: Address,
        /// Claimed name
        name: String,
    },
    /// A local update succeeded.
    NameUpdated {
        /// Updating owner
        owner: Address,
        /// Name before the update
        old_name: String,
        /// Name after the update
        new_name: String,
    },
    /// A fan-out handed messages to the transport.
    MessagesDispatched {
        /// Owner in the payload
        owner: Address,
        /// Name in the payload
        name: String,
        /// Destinations that accepted a message
        destinations: Vec<DomainId>,
    },
    /// An inbound update was applied.
    NameReceived {
        /// Origin domain
        origin: DomainId,
        /// Owner in the payload
        owner: Address,
        /// Name in the payload
        name: String,
        /// Local owner displaced from the name
        evicted: Option<Address>,
    },
}

impl RegistryEvent {
    /// Topic string used for filtering.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::NameClaimed { .. } => "name.claimed",
            Self::NameUpdated { .. } => "name.updated",
            Self::MessagesDispatched { .. } => "name.dispatched",
            Self::NameReceived { .. } => "name.received",
        }
    }
}
