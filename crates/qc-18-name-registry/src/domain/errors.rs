//! # Domain Errors
//!
//! Error types for the Cross-Chain Name Registry.
//!
//! Every variant of [`RegistryError`] except [`RegistryError::Transport`] is
//! raised before the ledger is touched, so a failed call leaves state as it was.

use super::value_objects::DomainId;
use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Address type (20-byte owner identity).
pub type Address = [u8; 20];

/// Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Name is the empty string.
    #[error("Name is empty")]
    EmptyName,

    /// Name exceeds the configured byte length.
    #[error("Name too long: {len} bytes (max {max})")]
    NameTooLong {
        /// Length of the rejected name in bytes
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Update attempted by an owner that holds no name.
    #[error("Caller has no existing name to update")]
    NoExistingName,

    /// Destination and options lists differ in length.
    #[error("Arity mismatch: {destinations} destinations, {options} options")]
    ArityMismatch {
        /// Number of destinations supplied
        destinations: usize,
        /// Number of options blobs supplied
        options: usize,
    },

    /// Name is owned by a different party.
    #[error("Name already claimed: {name}")]
    AlreadyClaimed {
        /// The contested name
        name: String,
    },

    /// Supplied funds do not cover the quoted total.
    #[error("Insufficient funds: supplied {supplied}, required {required}")]
    InsufficientFunds {
        /// Funds attached to the call
        supplied: u128,
        /// Quoted native total
        required: u128,
    },

    /// Destination domain has no wired peer registry.
    #[error("No peer wired for {0}")]
    NoPeer(DomainId),

    /// Fee arithmetic overflowed.
    #[error("Fee total overflowed")]
    FeeOverflow,

    /// Outbound payload could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Inbound payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Transport collaborator failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Coarse error classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or oversized name.
    Validation,
    /// Name held by someone else, or update without a name.
    Conflict,
    /// Destinations/options length mismatch.
    Arity,
    /// Funds below the quoted total (including unpriceable destinations).
    Funding,
    /// Malformed inbound payload.
    Decode,
    /// Failure inside the transport collaborator.
    Transport,
}

impl RegistryError {
    /// Map this error to its class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } | Self::Encode(_) => {
                ErrorKind::Validation
            }
            Self::NoExistingName | Self::AlreadyClaimed { .. } => ErrorKind::Conflict,
            Self::ArityMismatch { .. } => ErrorKind::Arity,
            Self::InsufficientFunds { .. } | Self::NoPeer(_) | Self::FeeOverflow => {
                ErrorKind::Funding
            }
            Self::Decode(_) => ErrorKind::Decode,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }
}

/// Errors raised by a transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Destination cannot be reached.
    #[error("Destination unreachable: {0}")]
    Unreachable(DomainId),

    /// Fee attached to a send is below the price of that send.
    #[error("Insufficient fee: paid {paid}, required {required}")]
    InsufficientFee {
        /// Native fee attached
        paid: u128,
        /// Native fee required
        required: u128,
    },

    /// Transport refused the message.
    #[error("Message rejected: {0}")]
    Rejected(String),
}
