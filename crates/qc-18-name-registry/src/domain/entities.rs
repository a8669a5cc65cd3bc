//! # Domain Entities
//!
//! Results produced by a cross-domain fan-out.

use super::errors::TransportError;
use super::value_objects::{DeliveryReceipt, DomainId, MessagingFee};
use serde::{Deserialize, Serialize};

/// A send that failed after the local ledger had already committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedDispatch {
    /// Destination that did not accept the message.
    pub destination: DomainId,
    /// Fee share that was offered for it.
    pub fee_share: u128,
    /// Transport failure.
    pub error: TransportError,
}

/// Per-destination outcome of a successful send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedMessage {
    /// Destination domain.
    pub destination: DomainId,
    /// Receipt returned by the transport.
    pub receipt: DeliveryReceipt,
}

/// Outcome of `claim_and_sync` / `update_and_sync`.
///
/// The local ledger is always updated when a report is returned. Failed
/// sends are not retried; callers re-issue an update naming only
/// [`SyncReport::failed_destinations`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Successful sends, in destination order.
    pub dispatched: Vec<DispatchedMessage>,
    /// Sends that failed.
    pub failures: Vec<FailedDispatch>,
}

impl SyncReport {
    /// True when every destination accepted its message.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Receipts of successful sends.
    pub fn receipts(&self) -> Vec<DeliveryReceipt> {
        self.dispatched.iter().map(|d| d.receipt.clone()).collect()
    }

    /// Destinations to retry.
    pub fn failed_destinations(&self) -> Vec<DomainId> {
        self.failures.iter().map(|f| f.destination).collect()
    }

    /// Sum of fees charged by the transport.
    pub fn total_charged(&self) -> MessagingFee {
        self.dispatched.iter().fold(MessagingFee::default(), |acc, d| {
            MessagingFee::new(
                acc.native_fee.saturating_add(d.receipt.fee.native_fee),
                acc.secondary_fee.saturating_add(d.receipt.fee.secondary_fee),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatched(domain: u32, fee: u128) -> DispatchedMessage {
        DispatchedMessage {
            destination: DomainId(domain),
            receipt: DeliveryReceipt {
                guid: [domain as u8; 32],
                nonce: 1,
                fee: MessagingFee::native(fee),
            },
        }
    }

    #[test]
    fn test_empty_report_is_complete() {
        let report = SyncReport::default();
        assert!(report.is_complete());
        assert!(report.receipts().is_empty());
        assert_eq!(report.total_charged(), MessagingFee::default());
    }

    #[test]
    fn test_failed_destinations() {
        let report = SyncReport {
            dispatched: vec![dispatched(1, 10)],
            failures: vec![FailedDispatch {
                destination: DomainId(2),
                fee_share: 10,
                error: TransportError::Unreachable(DomainId(2)),
            }],
        };
        assert!(!report.is_complete());
        assert_eq!(report.failed_destinations(), vec![DomainId(2)]);
    }

    #[test]
    fn test_total_charged() {
        let report = SyncReport {
            dispatched: vec![dispatched(1, 10), dispatched(2, 15)],
            failures: vec![],
        };
        assert_eq!(report.total_charged(), MessagingFee::native(25));
        assert_eq!(report.receipts().len(), 2);
    }
}
