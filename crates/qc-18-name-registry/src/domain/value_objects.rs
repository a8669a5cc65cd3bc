//! # Domain Value Objects
//!
//! Immutable value types shared by the registry and its transport.

use super::errors::{Hash, RegistryError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one domain (chain/replica).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainId(pub u32);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain:{}", self.0)
    }
}

/// Fee for one delivery, or a sum of several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingFee {
    /// Fee payable in the native currency.
    pub native_fee: u128,
    /// Fee payable in the secondary token.
    pub secondary_fee: u128,
}

impl MessagingFee {
    /// Create a fee pair.
    pub fn new(native_fee: u128, secondary_fee: u128) -> Self {
        Self {
            native_fee,
            secondary_fee,
        }
    }

    /// Native-only fee.
    pub fn native(native_fee: u128) -> Self {
        Self::new(native_fee, 0)
    }

    /// Component-wise checked addition.
    pub fn checked_add(self, other: MessagingFee) -> Result<MessagingFee, RegistryError> {
        Ok(Self {
            native_fee: self
                .native_fee
                .checked_add(other.native_fee)
                .ok_or(RegistryError::FeeOverflow)?,
            secondary_fee: self
                .secondary_fee
                .checked_add(other.secondary_fee)
                .ok_or(RegistryError::FeeOverflow)?,
        })
    }
}

/// Options header for the type-3 executor format.
const OPTIONS_TYPE_3: u16 = 3;
/// Worker id of the executor.
const EXECUTOR_WORKER_ID: u8 = 1;
/// Executor option carrying destination gas (and optional value).
const OPTION_TYPE_LZ_RECEIVE: u8 = 1;

/// Opaque execution options for one destination.
///
/// The registry never looks inside; transports decide what the bytes mean.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions(pub Vec<u8>);

impl ExecutionOptions {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build executor options requesting `gas` for the destination handler.
    pub fn lz_receive(gas: u128) -> Self {
        Self::lz_receive_with_value(gas, 0)
    }

    /// Build executor options requesting `gas` and forwarding `value`.
    pub fn lz_receive_with_value(gas: u128, value: u128) -> Self {
        let mut option = gas.to_be_bytes().to_vec();
        if value != 0 {
            option.extend_from_slice(&value.to_be_bytes());
        }

        let mut bytes = OPTIONS_TYPE_3.to_be_bytes().to_vec();
        bytes.push(EXECUTOR_WORKER_ID);
        // Size covers the option type byte plus the option body.
        bytes.extend_from_slice(&((option.len() + 1) as u16).to_be_bytes());
        bytes.push(OPTION_TYPE_LZ_RECEIVE);
        bytes.extend_from_slice(&option);
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no options were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total destination gas requested through executor options.
    ///
    /// Returns `None` when the blob is not in the type-3 format or is malformed.
    pub fn lz_receive_gas(&self) -> Option<u128> {
        let bytes = self.0.as_slice();
        if bytes.len() < 2 || u16::from_be_bytes([bytes[0], bytes[1]]) != OPTIONS_TYPE_3 {
            return None;
        }

        let mut cursor = 2;
        let mut total: u128 = 0;
        while cursor < bytes.len() {
            let header = bytes.get(cursor..cursor + 3)?;
            let worker = header[0];
            let size = u16::from_be_bytes([header[1], header[2]]) as usize;
            cursor += 3;
            let body = bytes.get(cursor..cursor + size)?;
            cursor += size;

            if worker != EXECUTOR_WORKER_ID {
                continue;
            }
            let (option_type, option) = body.split_first()?;
            if *option_type == OPTION_TYPE_LZ_RECEIVE {
                let gas: [u8; 16] = option.get(..16)?.try_into().ok()?;
                total = total.checked_add(u128::from_be_bytes(gas))?;
            }
        }
        Some(total)
    }
}

/// Proof of dispatch for one destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Tracking identifier assigned by the transport.
    pub guid: Hash,
    /// Sequence number scoped to (source, destination).
    pub nonce: u64,
    /// Fee actually charged.
    pub fee: MessagingFee,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_display() {
        assert_eq!(DomainId(40161).to_string(), "domain:40161");
    }

    #[test]
    fn test_fee_checked_add() {
        let total = MessagingFee::new(10, 1)
            .checked_add(MessagingFee::new(5, 2))
            .unwrap();
        assert_eq!(total, MessagingFee::new(15, 3));
    }

    #[test]
    fn test_fee_overflow() {
        let result = MessagingFee::native(u128::MAX).checked_add(MessagingFee::native(1));
        assert_eq!(result, Err(RegistryError::FeeOverflow));
    }

    #[test]
    fn test_lz_receive_layout() {
        let options = ExecutionOptions::lz_receive(200_000);
        let bytes = options.as_bytes();
        assert_eq!(&bytes[..2], &[0x00, 0x03]);
        assert_eq!(bytes[2], 0x01);
        assert_eq!(&bytes[3..5], &[0x00, 17]);
        assert_eq!(bytes[5], 0x01);
        assert_eq!(bytes.len(), 22);
        assert_eq!(options.lz_receive_gas(), Some(200_000));
    }

    #[test]
    fn test_lz_receive_with_value() {
        let options = ExecutionOptions::lz_receive_with_value(50_000, 7);
        assert_eq!(options.len(), 38);
        assert_eq!(options.lz_receive_gas(), Some(50_000));
    }

    #[test]
    fn test_gas_summed_across_options() {
        let mut bytes = ExecutionOptions::lz_receive(100).0;
        bytes.extend_from_slice(&ExecutionOptions::lz_receive(23).0[2..]);
        assert_eq!(ExecutionOptions(bytes).lz_receive_gas(), Some(123));
    }

    #[test]
    fn test_opaque_options_have_no_gas() {
        assert_eq!(ExecutionOptions::default().lz_receive_gas(), None);
        assert_eq!(ExecutionOptions::from_bytes(vec![0xde, 0xad]).lz_receive_gas(), None);
    }

    #[test]
    fn test_truncated_options_have_no_gas() {
        let mut bytes = ExecutionOptions::lz_receive(100).0;
        bytes.truncate(10);
        assert_eq!(ExecutionOptions(bytes).lz_receive_gas(), None);
    }
}
