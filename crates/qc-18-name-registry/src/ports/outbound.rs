//! # Outbound Ports
//!
//! The transport collaborator the registry depends on: prices a delivery and
//! carries an opaque payload to a remote domain.

use crate::domain::{
    Address, DeliveryReceipt, DomainId, ExecutionOptions, Hash, MessagingFee, TransportError,
};
use async_trait::async_trait;

/// One outbound send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendRequest {
    /// Destination domain.
    pub destination: DomainId,
    /// Peer registry on the destination domain.
    pub receiver: Hash,
    /// Encoded payload.
    pub payload: Vec<u8>,
    /// Execution options for the destination.
    pub options: ExecutionOptions,
    /// Fee allocated to this send.
    pub fee: MessagingFee,
    /// Where the transport returns any excess fee.
    pub refund_to: Address,
}

/// Message transport - outbound port.
///
/// Implementations deliver each accepted payload to the destination exactly
/// once, eventually, with no ordering guarantee between payloads.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Price one delivery. Must not change any state.
    async fn quote(
        &self,
        destination: DomainId,
        payload: &[u8],
        options: &ExecutionOptions,
        pay_in_secondary_token: bool,
    ) -> Result<MessagingFee, TransportError>;

    /// Dispatch one delivery.
    async fn send(&self, request: SendRequest) -> Result<DeliveryReceipt, TransportError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock transport with flat pricing that records every send.
#[derive(Default)]
pub struct MockTransport {
    /// Native fee per send.
    pub fee_per_send: u128,
    /// Additional native fee per payload byte.
    pub fee_per_byte: u128,
    /// Secondary-token fee per send when requested.
    pub secondary_fee_per_send: u128,
    /// Destinations whose sends fail. Quotes for them still succeed.
    pub failing: std::collections::HashSet<DomainId>,
    /// Sends accepted so far.
    pub sent: parking_lot::Mutex<Vec<SendRequest>>,
}

impl MockTransport {
    /// Mock charging `fee_per_send` for every message.
    pub fn flat(fee_per_send: u128) -> Self {
        Self {
            fee_per_send,
            ..Default::default()
        }
    }

    /// Number of accepted sends.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    fn price(&self, payload: &[u8], pay_in_secondary_token: bool) -> MessagingFee {
        let native = self.fee_per_send + self.fee_per_byte * payload.len() as u128;
        let secondary = if pay_in_secondary_token {
            self.secondary_fee_per_send
        } else {
            0
        };
        MessagingFee::new(native, secondary)
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn quote(
        &self,
        _destination: DomainId,
        payload: &[u8],
        _options: &ExecutionOptions,
        pay_in_secondary_token: bool,
    ) -> Result<MessagingFee, TransportError> {
        Ok(self.price(payload, pay_in_secondary_token))
    }

    async fn send(&self, request: SendRequest) -> Result<DeliveryReceipt, TransportError> {
        if self.failing.contains(&request.destination) {
            return Err(TransportError::Unreachable(request.destination));
        }
        let required = self.price(&request.payload, false).native_fee;
        if request.fee.native_fee < required {
            return Err(TransportError::InsufficientFee {
                paid: request.fee.native_fee,
                required,
            });
        }

        let mut sent = self.sent.lock();
        let nonce = sent
            .iter()
            .filter(|r| r.destination == request.destination)
            .count() as u64
            + 1;
        let mut guid = [0u8; 32];
        guid[..4].copy_from_slice(&request.destination.0.to_be_bytes());
        guid[24..].copy_from_slice(&nonce.to_be_bytes());
        let fee = request.fee;
        sent.push(request);

        Ok(DeliveryReceipt { guid, nonce, fee })
    }
}
