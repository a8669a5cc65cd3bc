//! In-Memory Transport Adapter
//!
//! Implements `MessageTransport` over a simulated network shared by several
//! domains. Messages queue until a test or demo delivers them, so delivery
//! order is under the caller's control.

use crate::domain::{
    Address, DeliveryReceipt, DomainId, ExecutionOptions, Hash, MessagingFee, RegistryError,
    TransportError,
};
use crate::ports::inbound::MessageReceiver;
use crate::ports::outbound::{MessageTransport, SendRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Basis-point denominator for the secondary-token ratio.
const BPS: u128 = 10_000;

/// Price of delivering one message to a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingModel {
    /// Flat native fee per message.
    pub base_fee: u128,
    /// Native fee per payload byte.
    pub per_byte_fee: u128,
    /// Native fee per unit of destination gas requested in the options.
    pub gas_price: u128,
    /// Secondary-token fee as basis points of the native fee.
    pub secondary_bps: u128,
}

impl Default for PricingModel {
    fn default() -> Self {
        Self {
            base_fee: 1_000,
            per_byte_fee: 10,
            gas_price: 0,
            secondary_bps: 0,
        }
    }
}

impl PricingModel {
    /// Flat native fee, nothing else.
    pub fn flat(base_fee: u128) -> Self {
        Self {
            base_fee,
            per_byte_fee: 0,
            gas_price: 0,
            secondary_bps: 0,
        }
    }

    /// Price `payload` under `options`.
    pub fn price(
        &self,
        payload: &[u8],
        options: &ExecutionOptions,
        pay_in_secondary_token: bool,
    ) -> Result<MessagingFee, TransportError> {
        let overflow = || TransportError::Rejected("fee overflow".into());
        let gas = options.lz_receive_gas().unwrap_or(0);

        let native = self
            .per_byte_fee
            .checked_mul(payload.len() as u128)
            .and_then(|bytes| bytes.checked_add(self.base_fee))
            .and_then(|fee| fee.checked_add(self.gas_price.checked_mul(gas)?))
            .ok_or_else(overflow)?;
        let secondary = if pay_in_secondary_token {
            native.checked_mul(self.secondary_bps).ok_or_else(overflow)? / BPS
        } else {
            0
        };
        Ok(MessagingFee::new(native, secondary))
    }
}

/// A message accepted by the network and not yet delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InFlightMessage {
    /// Globally unique message id.
    pub guid: Hash,
    /// Per (origin, destination) sequence number.
    pub nonce: u64,
    /// Sending domain.
    pub origin: DomainId,
    /// Application that sent it.
    pub sender: Hash,
    /// Receiving domain.
    pub destination: DomainId,
    /// Application it is addressed to.
    pub receiver: Hash,
    /// Opaque payload.
    pub payload: Vec<u8>,
}

/// Result of delivering one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Receiver accepted and applied the payload.
    Applied,
    /// Receiver rejected the payload.
    Failed(RegistryError),
    /// Receiver does not trust the origin; payload was not handed over.
    UntrustedOrigin,
    /// No live application is registered at the destination address.
    NoReceiver,
}

struct Registration {
    address: Hash,
    receiver: Weak<dyn MessageReceiver>,
}

#[derive(Default)]
struct NetworkState {
    receivers: HashMap<DomainId, Registration>,
    pricing: HashMap<DomainId, PricingModel>,
    default_pricing: PricingModel,
    nonces: HashMap<(DomainId, DomainId), u64>,
    in_flight: VecDeque<InFlightMessage>,
    unreachable: HashSet<DomainId>,
    refunds: HashMap<Address, u128>,
}

impl NetworkState {
    fn pricing_for(&self, destination: DomainId) -> PricingModel {
        self.pricing
            .get(&destination)
            .copied()
            .unwrap_or(self.default_pricing)
    }

    fn next_nonce(&mut self, origin: DomainId, destination: DomainId) -> u64 {
        let nonce = self.nonces.entry((origin, destination)).or_insert(0);
        *nonce += 1;
        *nonce
    }
}

/// Simulated message network connecting several domains.
#[derive(Default)]
pub struct InMemoryNetwork {
    state: Mutex<NetworkState>,
}

/// Derive a message id.
fn generate_guid(nonce: u64, origin: DomainId, sender: &Hash, destination: DomainId) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(nonce.to_be_bytes());
    hasher.update(origin.0.to_be_bytes());
    hasher.update(sender);
    hasher.update(destination.0.to_be_bytes());

    let result = hasher.finalize();
    let mut guid = [0u8; 32];
    guid.copy_from_slice(&result);
    guid
}

impl InMemoryNetwork {
    /// Create a network priced with [`PricingModel::default`].
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a network with the given default pricing.
    pub fn with_pricing(pricing: PricingModel) -> Arc<Self> {
        let network = Self::default();
        network.state.lock().default_pricing = pricing;
        Arc::new(network)
    }

    /// Endpoint for the application at `address` on `local`.
    pub fn endpoint(self: &Arc<Self>, local: DomainId, address: Hash) -> InMemoryEndpoint {
        InMemoryEndpoint {
            network: Arc::clone(self),
            local,
            address,
        }
    }

    /// Register the application receiving messages on `domain`.
    ///
    /// Holds only a weak reference.
    pub fn register<R: MessageReceiver + 'static>(
        &self,
        domain: DomainId,
        address: Hash,
        receiver: &Arc<R>,
    ) {
        let receiver: Arc<dyn MessageReceiver> = Arc::clone(receiver) as Arc<dyn MessageReceiver>;
        self.state.lock().receivers.insert(
            domain,
            Registration {
                address,
                receiver: Arc::downgrade(&receiver),
            },
        );
        info!("[qc-18] Registered receiver on {}", domain);
    }

    /// Override pricing for one destination.
    pub fn set_pricing(&self, destination: DomainId, pricing: PricingModel) {
        self.state.lock().pricing.insert(destination, pricing);
    }

    /// Make sends to `destination` fail (or succeed again).
    pub fn set_unreachable(&self, destination: DomainId, unreachable: bool) {
        let mut state = self.state.lock();
        if unreachable {
            state.unreachable.insert(destination);
        } else {
            state.unreachable.remove(&destination);
        }
    }

    /// Number of undelivered messages.
    pub fn pending(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Copies of the undelivered messages, oldest first.
    pub fn in_flight(&self) -> Vec<InFlightMessage> {
        self.state.lock().in_flight.iter().cloned().collect()
    }

    /// Excess fees returned to `address` so far.
    pub fn refunded_to(&self, address: &Address) -> u128 {
        self.state.lock().refunds.get(address).copied().unwrap_or(0)
    }

    /// Queue a raw payload without pricing or reachability checks.
    pub fn inject_raw(
        &self,
        origin: DomainId,
        sender: Hash,
        destination: DomainId,
        receiver: Hash,
        payload: Vec<u8>,
    ) -> Hash {
        let mut state = self.state.lock();
        let nonce = state.next_nonce(origin, destination);
        let guid = generate_guid(nonce, origin, &sender, destination);
        state.in_flight.push_back(InFlightMessage {
            guid,
            nonce,
            origin,
            sender,
            destination,
            receiver,
            payload,
        });
        guid
    }

    /// Deliver the oldest pending message.
    pub fn deliver_next(&self) -> Option<DeliveryOutcome> {
        let message = self.state.lock().in_flight.pop_front()?;
        Some(self.dispatch(message))
    }

    /// Deliver the pending message with `guid`, regardless of queue position.
    pub fn deliver(&self, guid: &Hash) -> Option<DeliveryOutcome> {
        let message = {
            let mut state = self.state.lock();
            let index = state.in_flight.iter().position(|m| &m.guid == guid)?;
            state.in_flight.remove(index)?
        };
        Some(self.dispatch(message))
    }

    /// Deliver everything pending, oldest first.
    pub fn deliver_all(&self) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.deliver_next() {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Hand `message` to its receiver. Called with the state lock released.
    fn dispatch(&self, message: InFlightMessage) -> DeliveryOutcome {
        let receiver = {
            let state = self.state.lock();
            state
                .receivers
                .get(&message.destination)
                .filter(|r| r.address == message.receiver)
                .and_then(|r| r.receiver.upgrade())
        };
        let Some(receiver) = receiver else {
            warn!(
                "[qc-18] No receiver for message {} on {}",
                hex::encode(&message.guid[..8]),
                message.destination
            );
            return DeliveryOutcome::NoReceiver;
        };

        if !receiver.is_trusted_origin(message.origin, &message.sender) {
            warn!(
                "[qc-18] Refusing message {} from untrusted {}",
                hex::encode(&message.guid[..8]),
                message.origin
            );
            return DeliveryOutcome::UntrustedOrigin;
        }

        debug!(
            "[qc-18] Delivering {} -> {} nonce={}",
            message.origin, message.destination, message.nonce
        );
        match receiver.on_message(message.origin, &message.payload) {
            Ok(()) => DeliveryOutcome::Applied,
            Err(e) => DeliveryOutcome::Failed(e),
        }
    }
}

/// One application's handle onto an [`InMemoryNetwork`].
#[derive(Clone)]
pub struct InMemoryEndpoint {
    network: Arc<InMemoryNetwork>,
    local: DomainId,
    address: Hash,
}

impl InMemoryEndpoint {
    /// Domain this endpoint sends from.
    pub fn local_domain(&self) -> DomainId {
        self.local
    }

    /// Sender address stamped on outgoing messages.
    pub fn address(&self) -> Hash {
        self.address
    }

    /// Shared network.
    pub fn network(&self) -> &Arc<InMemoryNetwork> {
        &self.network
    }
}

#[async_trait]
impl MessageTransport for InMemoryEndpoint {
    async fn quote(
        &self,
        destination: DomainId,
        payload: &[u8],
        options: &ExecutionOptions,
        pay_in_secondary_token: bool,
    ) -> Result<MessagingFee, TransportError> {
        self.network
            .state
            .lock()
            .pricing_for(destination)
            .price(payload, options, pay_in_secondary_token)
    }

    async fn send(&self, request: SendRequest) -> Result<DeliveryReceipt, TransportError> {
        let mut state = self.network.state.lock();
        if state.unreachable.contains(&request.destination) {
            return Err(TransportError::Unreachable(request.destination));
        }

        let required = state
            .pricing_for(request.destination)
            .price(&request.payload, &request.options, false)?
            .native_fee;
        let paid = request.fee.native_fee;
        if paid < required {
            return Err(TransportError::InsufficientFee { paid, required });
        }

        let excess = paid - required;
        if excess > 0 {
            let refund = state.refunds.entry(request.refund_to).or_insert(0);
            *refund = refund.saturating_add(excess);
        }

        let nonce = state.next_nonce(self.local, request.destination);
        let guid = generate_guid(nonce, self.local, &self.address, request.destination);
        state.in_flight.push_back(InFlightMessage {
            guid,
            nonce,
            origin: self.local,
            sender: self.address,
            destination: request.destination,
            receiver: request.receiver,
            payload: request.payload,
        });

        Ok(DeliveryReceipt {
            guid,
            nonce,
            fee: MessagingFee::native(required),
        })
    }
}
