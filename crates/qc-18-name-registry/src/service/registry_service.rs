//! Name Registry Service
//!
//! Orchestrates the ledger, the fee aggregator and the transport port.
//!
//! Outbound requests are checked in a fixed order and the first failure
//! wins: name validity, existing name (update only), arity, availability,
//! funds. Nothing is mutated until all checks pass. The ledger commit then
//! happens before any send, and a send failing afterwards is reported in the
//! [`SyncReport`] instead of undoing the commit.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::algorithms::{decode_payload, encode_payload, split_evenly, NameSyncPayload};
use crate::domain::{
    Address, ClaimOutcome, DispatchedMessage, DomainId, ExecutionOptions, FailedDispatch, Hash,
    MessagingFee, NameLedger, RegistryConfig, RegistryError, SyncReport,
};
use crate::events::RegistryEvent;
use crate::metrics::Metrics;
use crate::ports::{MessageReceiver, MessageTransport, NameRegistryApi, SendRequest};
use crate::service::fee_aggregator::{aggregate_fees, check_arity, resolve_routes, Route};

/// Which public entry point is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SyncKind {
    Claim,
    Update,
}

/// Name Registry Service implementation
///
/// One instance per domain. Owns that domain's ledger exclusively.
pub struct NameRegistryService<T: MessageTransport> {
    config: RegistryConfig,
    transport: Arc<T>,
    ledger: RwLock<NameLedger>,
    peers: RwLock<HashMap<DomainId, Hash>>,
    events: broadcast::Sender<RegistryEvent>,
    metrics: Arc<Metrics>,
}

impl<T: MessageTransport> NameRegistryService<T> {
    /// Create a service for `config.local_domain` using `transport`.
    pub fn new(config: RegistryConfig, transport: Arc<T>) -> Self {
        let (events, _) = broadcast::channel(config.event_channel_capacity);
        Self {
            ledger: RwLock::new(NameLedger::new(config.max_name_length)),
            config,
            transport,
            peers: RwLock::new(HashMap::new()),
            events,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Domain this instance serves.
    pub fn local_domain(&self) -> DomainId {
        self.config.local_domain
    }

    /// Active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Wire `peer` as the trusted registry on `domain`.
    pub fn set_peer(&self, domain: DomainId, peer: Hash) {
        info!(
            "[qc-18] Wiring peer {} for {}",
            hex::encode(&peer[..4]),
            domain
        );
        self.peers.write().insert(domain, peer);
    }

    /// Peer wired for `domain`.
    pub fn peer(&self, domain: DomainId) -> Option<Hash> {
        self.peers.read().get(&domain).copied()
    }

    /// Subscribe to registry events.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Copy of the current ledger.
    pub fn ledger_snapshot(&self) -> NameLedger {
        self.ledger.read().clone()
    }

    /// True when the ledger maps are exact inverses.
    pub fn check_invariants(&self) -> bool {
        self.ledger.read().check_invariants()
    }

    fn publish(&self, event: RegistryEvent) {
        // Err only means nobody is subscribed.
        let _ = self.events.send(event);
    }

    /// Steps 1-4 of the outbound checks; read-only.
    fn precheck(
        &self,
        kind: SyncKind,
        caller: &Address,
        name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
    ) -> Result<(), RegistryError> {
        let ledger = self.ledger.read();
        ledger.validate_name(name)?;
        if kind == SyncKind::Update && ledger.name_of(caller).is_none() {
            return Err(RegistryError::NoExistingName);
        }
        check_arity(destinations, options)?;
        ledger.check_available(caller, name)
    }

    /// Routes and quoted total for exactly the payload that will be sent.
    async fn price(
        &self,
        payload: &[u8],
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        pay_in_secondary_token: bool,
    ) -> Result<(Vec<Route>, MessagingFee), RegistryError> {
        // Resolve before awaiting: the peer guard must not cross an await.
        let routes = resolve_routes(&self.peers.read(), destinations, options)?;
        let total = aggregate_fees(
            self.transport.as_ref(),
            &routes,
            payload,
            pay_in_secondary_token,
        )
        .await?;
        Ok((routes, total))
    }

    /// Commit the mutation under one write lock.
    ///
    /// Re-checks conflicts, since another call may have committed while
    /// this one was awaiting its quote.
    fn commit(
        &self,
        kind: SyncKind,
        caller: Address,
        name: &str,
    ) -> Result<RegistryEvent, RegistryError> {
        let mut ledger = self.ledger.write();
        if kind == SyncKind::Update && ledger.name_of(&caller).is_none() {
            return Err(RegistryError::NoExistingName);
        }
        let outcome = ledger.claim(caller, name)?;
        drop(ledger);

        let event = match kind {
            SyncKind::Claim => RegistryEvent::NameClaimed {
                owner: caller,
                name: name.to_string(),
            },
            SyncKind::Update => RegistryEvent::NameUpdated {
                owner: caller,
                old_name: match outcome {
                    ClaimOutcome::Replaced { previous } => previous,
                    _ => name.to_string(),
                },
                new_name: name.to_string(),
            },
        };
        Ok(event)
    }

    /// Send one message per route, splitting `funds` evenly.
    async fn fan_out(
        &self,
        caller: Address,
        payload: Vec<u8>,
        routes: Vec<Route>,
        funds: u128,
    ) -> SyncReport {
        let shares = split_evenly(funds, routes.len());
        let mut report = SyncReport::default();

        for (route, share) in routes.into_iter().zip(shares) {
            let destination = route.destination;
            let request = SendRequest {
                destination,
                receiver: route.peer,
                payload: payload.clone(),
                options: route.options,
                fee: MessagingFee::native(share),
                refund_to: caller,
            };

            match self.transport.send(request).await {
                Ok(receipt) => {
                    debug!(
                        "[qc-18] Dispatched to {} nonce={} guid={}",
                        destination,
                        receipt.nonce,
                        hex::encode(&receipt.guid[..8])
                    );
                    report.dispatched.push(DispatchedMessage {
                        destination,
                        receipt,
                    });
                }
                Err(error) => {
                    warn!(
                        "[qc-18] Send to {} failed after local commit: {}",
                        destination, error
                    );
                    report.failures.push(FailedDispatch {
                        destination,
                        fee_share: share,
                        error,
                    });
                }
            }
        }
        report
    }

    async fn sync(
        &self,
        kind: SyncKind,
        caller: Address,
        name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        funds: u128,
    ) -> Result<SyncReport, RegistryError> {
        let result = self
            .checked_sync(kind, caller, name, destinations, options, funds)
            .await;
        if let Err(e) = &result {
            self.metrics.record_rejected();
            debug!("[qc-18] Rejected {:?} of {:?}: {}", kind, name, e);
        }
        result
    }

    async fn checked_sync(
        &self,
        kind: SyncKind,
        caller: Address,
        name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        funds: u128,
    ) -> Result<SyncReport, RegistryError> {
        self.precheck(kind, &caller, name, destinations, options)?;

        let payload = encode_payload(&NameSyncPayload::new(caller, name))?;
        let (routes, required) = self.price(&payload, destinations, options, false).await?;
        if funds < required.native_fee {
            return Err(RegistryError::InsufficientFunds {
                supplied: funds,
                required: required.native_fee,
            });
        }

        let event = self.commit(kind, caller, name)?;
        self.metrics.record_mutation(kind == SyncKind::Update);
        info!(
            owner = %hex::encode(caller),
            label = %name,
            destinations = routes.len(),
            "[qc-18] {:?} committed",
            kind
        );
        self.publish(event);

        let report = self.fan_out(caller, payload, routes, funds).await;
        self.metrics
            .record_fan_out(report.dispatched.len(), report.failures.len());
        if !report.dispatched.is_empty() {
            self.publish(RegistryEvent::MessagesDispatched {
                owner: caller,
                name: name.to_string(),
                destinations: report.dispatched.iter().map(|d| d.destination).collect(),
            });
        }
        Ok(report)
    }
}

#[async_trait]
impl<T: MessageTransport + 'static> NameRegistryApi for NameRegistryService<T> {
    async fn claim_and_sync(
        &self,
        caller: Address,
        name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        funds: u128,
    ) -> Result<SyncReport, RegistryError> {
        self.sync(SyncKind::Claim, caller, name, destinations, options, funds)
            .await
    }

    async fn update_and_sync(
        &self,
        caller: Address,
        new_name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        funds: u128,
    ) -> Result<SyncReport, RegistryError> {
        self.sync(
            SyncKind::Update,
            caller,
            new_name,
            destinations,
            options,
            funds,
        )
        .await
    }

    async fn quote(
        &self,
        caller: Address,
        destinations: &[DomainId],
        name: &str,
        options: &[ExecutionOptions],
        pay_in_secondary_token: bool,
    ) -> Result<MessagingFee, RegistryError> {
        let payload = encode_payload(&NameSyncPayload::new(caller, name))?;
        let (_, total) = self
            .price(&payload, destinations, options, pay_in_secondary_token)
            .await?;
        Ok(total)
    }

    fn name_of(&self, owner: &Address) -> Option<String> {
        self.ledger.read().name_of(owner).map(str::to_string)
    }

    fn owner_of(&self, name: &str) -> Option<Address> {
        self.ledger.read().owner_of(name)
    }
}

impl<T: MessageTransport> MessageReceiver for NameRegistryService<T> {
    fn is_trusted_origin(&self, origin: DomainId, sender: &Hash) -> bool {
        self.peers.read().get(&origin) == Some(sender)
    }

    /// Apply an update from `origin` unconditionally.
    ///
    /// No conflict or validity checks: the origin's dispatch-time checks are
    /// trusted, and a local holder of the name is evicted. Updates are
    /// applied in arrival order, so two updates for one owner that arrive
    /// reversed leave the older one in place until a later update lands.
    fn on_message(&self, origin: DomainId, payload: &[u8]) -> Result<(), RegistryError> {
        let NameSyncPayload { owner, name } = match decode_payload(payload) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.record_decode_failure();
                warn!("[qc-18] Dropping malformed payload from {}: {}", origin, e);
                return Err(e);
            }
        };

        let applied = self
            .ledger
            .write()
            .apply_unconditionally(owner, name.clone());
        self.metrics.record_inbound(applied.evicted.is_some());

        if let Some(evicted) = applied.evicted {
            warn!(
                evicted = %hex::encode(evicted),
                label = %name,
                "[qc-18] Inbound update from {} evicted local owner",
                origin
            );
        }
        info!(
            owner = %hex::encode(owner),
            label = %name,
            "[qc-18] Applied update from {}",
            origin
        );

        self.publish(RegistryEvent::NameReceived {
            origin,
            owner,
            name,
            evicted: applied.evicted,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, RegistryConfigBuilder, TransportError};
    use crate::ports::MockTransport;
    use proptest::prelude::*;

    const LOCAL: DomainId = DomainId(1);
    const D2: DomainId = DomainId(2);
    const D3: DomainId = DomainId(3);
    const ALICE: Address = [0xA1; 20];
    const BOB: Address = [0xB0; 20];

    fn service_with(transport: MockTransport) -> NameRegistryService<MockTransport> {
        let service = NameRegistryService::new(RegistryConfig::new(LOCAL), Arc::new(transport));
        service.set_peer(D2, [2u8; 32]);
        service.set_peer(D3, [3u8; 32]);
        service
    }

    fn service() -> NameRegistryService<MockTransport> {
        service_with(MockTransport::flat(100))
    }

    fn opts(n: usize) -> Vec<ExecutionOptions> {
        vec![ExecutionOptions::lz_receive(200_000); n]
    }

    #[tokio::test]
    async fn test_claim_with_zero_destinations() {
        let service = service();
        let report = service
            .claim_and_sync(ALICE, "alice", &[], &[], 0)
            .await
            .unwrap();

        assert!(report.is_complete());
        assert!(report.receipts().is_empty());
        assert_eq!(service.name_of(&ALICE).as_deref(), Some("alice"));
        assert_eq!(service.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_claim_fans_out_to_each_destination() {
        let service = service();
        let report = service
            .claim_and_sync(ALICE, "alice", &[D2, D3], &opts(2), 200)
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.dispatched.len(), 2);
        assert_eq!(report.dispatched[0].destination, D2);
        assert_eq!(report.dispatched[1].destination, D3);

        let sent = service.transport.sent.lock();
        let decoded = decode_payload(&sent[0].payload).unwrap();
        assert_eq!(decoded, NameSyncPayload::new(ALICE, "alice"));
        assert_eq!(sent[0].receiver, [2u8; 32]);
        assert_eq!(sent[0].refund_to, ALICE);
    }

    #[tokio::test]
    async fn test_funds_split_with_remainder_last() {
        let service = service();
        service
            .claim_and_sync(ALICE, "alice", &[D2, D3], &opts(2), 301)
            .await
            .unwrap();

        let sent = service.transport.sent.lock();
        assert_eq!(sent[0].fee.native_fee, 150);
        assert_eq!(sent[1].fee.native_fee, 151);
    }

    #[tokio::test]
    async fn test_exact_quote_suffices_and_one_less_fails() {
        let service = service();
        let quote = service
            .quote(ALICE, &[D2, D3], "x", &opts(2), false)
            .await
            .unwrap();
        assert_eq!(quote.native_fee, 200);

        let short = service
            .claim_and_sync(ALICE, "x", &[D2, D3], &opts(2), quote.native_fee - 1)
            .await;
        assert_eq!(
            short,
            Err(RegistryError::InsufficientFunds {
                supplied: 199,
                required: 200
            })
        );
        assert_eq!(service.transport.sent_count(), 0);
        assert_eq!(service.name_of(&ALICE), None);

        let report = service
            .claim_and_sync(ALICE, "x", &[D2, D3], &opts(2), quote.native_fee)
            .await
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.dispatched.len(), 2);
    }

    #[tokio::test]
    async fn test_quote_depends_on_name_length() {
        let service = service_with(MockTransport {
            fee_per_send: 10,
            fee_per_byte: 1,
            ..Default::default()
        });
        let short = service
            .quote(ALICE, &[D2], "ab", &opts(1), false)
            .await
            .unwrap();
        let long = service
            .quote(ALICE, &[D2], "abcdef", &opts(1), false)
            .await
            .unwrap();
        assert_eq!(long.native_fee - short.native_fee, 4);
    }

    #[tokio::test]
    async fn test_quote_reads_no_state() {
        let service = service();
        service
            .quote(ALICE, &[D2], "alice", &opts(1), true)
            .await
            .unwrap();
        assert!(service.ledger_snapshot().is_empty());
        assert_eq!(service.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_arity_mismatch_before_mutation() {
        let service = service();
        let result = service
            .claim_and_sync(ALICE, "alice", &[D2, D3], &opts(1), 1_000)
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Arity);
        assert!(service.ledger_snapshot().is_empty());
        assert_eq!(service.transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_arity() {
        let service = service();
        let result = service.claim_and_sync(ALICE, "", &[D2], &[], 0).await;
        assert_eq!(result, Err(RegistryError::EmptyName));

        let long = "n".repeat(33);
        let result = service.claim_and_sync(ALICE, &long, &[D2], &[], 0).await;
        assert!(matches!(result, Err(RegistryError::NameTooLong { .. })));
    }

    #[tokio::test]
    async fn test_arity_precedes_conflict() {
        let service = service();
        service.claim_and_sync(BOB, "x", &[], &[], 0).await.unwrap();
        let result = service.claim_and_sync(ALICE, "x", &[D2], &[], 0).await;
        assert!(matches!(result, Err(RegistryError::ArityMismatch { .. })));
    }

    #[tokio::test]
    async fn test_conflict_precedes_funding() {
        let service = service();
        service.claim_and_sync(BOB, "x", &[], &[], 0).await.unwrap();
        let result = service.claim_and_sync(ALICE, "x", &[D2], &opts(1), 0).await;
        assert_eq!(
            result,
            Err(RegistryError::AlreadyClaimed { name: "x".into() })
        );
        assert_eq!(service.name_of(&BOB).as_deref(), Some("x"));
        assert_eq!(service.name_of(&ALICE), None);
    }

    #[tokio::test]
    async fn test_reclaim_own_name_succeeds() {
        let service = service();
        service
            .claim_and_sync(ALICE, "alice", &[], &[], 0)
            .await
            .unwrap();
        let again = service
            .claim_and_sync(ALICE, "alice", &[D2], &opts(1), 100)
            .await;
        assert!(again.is_ok());
        assert_eq!(service.owner_of("alice"), Some(ALICE));
    }

    #[tokio::test]
    async fn test_update_requires_existing_name() {
        let service = service();
        let result = service.update_and_sync(ALICE, "alice", &[], &[], 0).await;
        assert_eq!(result, Err(RegistryError::NoExistingName));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
        assert!(service.ledger_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_update_frees_old_name() {
        let service = service();
        let mut events = service.subscribe();
        service
            .claim_and_sync(ALICE, "alice", &[], &[], 0)
            .await
            .unwrap();
        service
            .update_and_sync(ALICE, "bob", &[], &[], 0)
            .await
            .unwrap();

        assert_eq!(service.owner_of("alice"), None);
        assert_eq!(service.owner_of("bob"), Some(ALICE));
        assert!(service.check_invariants());

        assert!(matches!(
            events.recv().await.unwrap(),
            RegistryEvent::NameClaimed { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            RegistryEvent::NameUpdated {
                owner: ALICE,
                old_name: "alice".into(),
                new_name: "bob".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_unwired_destination_rejected_before_mutation() {
        let service = service();
        let result = service
            .claim_and_sync(ALICE, "alice", &[DomainId(9)], &opts(1), 1_000)
            .await;
        assert_eq!(result, Err(RegistryError::NoPeer(DomainId(9))));
        assert!(service.ledger_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_local_commit() {
        let mut transport = MockTransport::flat(100);
        transport.failing.insert(D2);
        let service = service_with(transport);

        let report = service
            .claim_and_sync(ALICE, "alice", &[D2, D3], &opts(2), 200)
            .await
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failed_destinations(), vec![D2]);
        assert_eq!(report.failures[0].fee_share, 100);
        assert_eq!(report.failures[0].error, TransportError::Unreachable(D2));
        assert_eq!(report.dispatched.len(), 1);
        assert_eq!(report.dispatched[0].destination, D3);

        assert_eq!(service.owner_of("alice"), Some(ALICE));
        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.messages_dispatched, 1);
        assert_eq!(snapshot.send_failures, 1);
    }

    #[tokio::test]
    async fn test_concurrent_claims_one_winner() {
        let service = Arc::new(service());
        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.claim_and_sync(ALICE, "x", &[], &[], 0).await })
        };
        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.claim_and_sync(BOB, "x", &[], &[], 0).await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(service.owner_of("x").is_some());
        assert!(service.check_invariants());
    }

    #[tokio::test]
    async fn test_events_for_dispatch() {
        let service = service();
        let mut events = service.subscribe();
        service
            .claim_and_sync(ALICE, "alice", &[D2], &opts(1), 100)
            .await
            .unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            RegistryEvent::NameClaimed { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            RegistryEvent::MessagesDispatched {
                owner: ALICE,
                name: "alice".into(),
                destinations: vec![D2],
            }
        );
    }

    #[tokio::test]
    async fn test_inbound_overrides_local_owner() {
        let service = service();
        service.claim_and_sync(BOB, "x", &[], &[], 0).await.unwrap();

        let payload = encode_payload(&NameSyncPayload::new(ALICE, "x")).unwrap();
        service.on_message(D2, &payload).unwrap();

        assert_eq!(service.owner_of("x"), Some(ALICE));
        assert_eq!(service.name_of(&BOB), None);
        assert!(service.check_invariants());
        assert_eq!(service.metrics().snapshot().inbound_evictions, 1);
    }

    #[tokio::test]
    async fn test_inbound_malformed_payload_leaves_state() {
        let service = service();
        service
            .claim_and_sync(ALICE, "alice", &[], &[], 0)
            .await
            .unwrap();
        let before = service.ledger_snapshot();

        let mut payload = encode_payload(&NameSyncPayload::new(BOB, "alice")).unwrap();
        payload.pop();
        let result = service.on_message(D2, &payload);

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Decode);
        assert_eq!(service.owner_of("alice"), Some(ALICE));
        assert_eq!(service.ledger_snapshot().len(), before.len());
        assert_eq!(service.metrics().snapshot().decode_failures, 1);
    }

    #[test]
    fn test_trusted_origin() {
        let service = service();
        assert!(service.is_trusted_origin(D2, &[2u8; 32]));
        assert!(!service.is_trusted_origin(D2, &[3u8; 32]));
        assert!(!service.is_trusted_origin(DomainId(9), &[2u8; 32]));
    }

    #[tokio::test]
    async fn test_rejections_counted() {
        let service = service();
        let _ = service.update_and_sync(ALICE, "a", &[], &[], 0).await;
        let _ = service.claim_and_sync(ALICE, "", &[], &[], 0).await;
        service
            .claim_and_sync(ALICE, "a", &[], &[], 0)
            .await
            .unwrap();

        let snapshot = service.metrics().snapshot();
        assert_eq!(snapshot.rejected, 2);
        assert_eq!(snapshot.claims, 1);
    }

    #[tokio::test]
    async fn test_spawned_sync_then_funded_local_update() {
        let service = Arc::new(service());
        let spawned = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .claim_and_sync(ALICE, "alice", &[D2], &opts(1), 100)
                    .await
            })
        };
        assert!(spawned.await.unwrap().is_ok());

        // Funds with no destinations are accepted and nothing is sent.
        let report = service
            .update_and_sync(ALICE, "al", &[], &[], 500)
            .await
            .unwrap();
        assert!(report.dispatched.is_empty());
        assert_eq!(service.transport.sent_count(), 1);
        assert_eq!(service.name_of(&ALICE).as_deref(), Some("al"));
    }

    #[derive(Clone, Debug)]
    enum RegistryOp {
        Claim(u8, &'static str, bool),
        Update(u8, &'static str, bool),
        Inbound(u8, &'static str),
    }

    /// Names up to 4 bytes against a 3-byte limit, so some local calls fail
    /// validation while inbound updates still install them.
    fn registry_op() -> impl Strategy<Value = RegistryOp> {
        let name = prop::sample::select(vec!["", "a", "b", "ab", "ccc", "dddd"]);
        prop_oneof![
            (0u8..4, name.clone(), any::<bool>())
                .prop_map(|(o, n, fan)| RegistryOp::Claim(o, n, fan)),
            (0u8..4, name.clone(), any::<bool>())
                .prop_map(|(o, n, fan)| RegistryOp::Update(o, n, fan)),
            (0u8..4, name).prop_map(|(o, n)| RegistryOp::Inbound(o, n)),
        ]
    }

    fn fan_out_to(fan: bool) -> (Vec<DomainId>, Vec<ExecutionOptions>) {
        if fan {
            (vec![D2], opts(1))
        } else {
            (vec![], vec![])
        }
    }

    proptest! {
        #[test]
        fn prop_service_maps_stay_inverse(ops in prop::collection::vec(registry_op(), 1..40)) {
            let config = RegistryConfigBuilder::new(LOCAL)
                .max_name_length(3)
                .build()
                .unwrap();
            let service = NameRegistryService::new(config, Arc::new(MockTransport::flat(10)));
            service.set_peer(D2, [2u8; 32]);

            for op in ops {
                let before = service.ledger_snapshot();
                let result = match op {
                    RegistryOp::Claim(owner, name, fan) => {
                        let (to, options) = fan_out_to(fan);
                        tokio_test::block_on(
                            service.claim_and_sync([owner; 20], name, &to, &options, 10),
                        )
                        .map(|_| ())
                    }
                    RegistryOp::Update(owner, name, fan) => {
                        let (to, options) = fan_out_to(fan);
                        tokio_test::block_on(
                            service.update_and_sync([owner; 20], name, &to, &options, 10),
                        )
                        .map(|_| ())
                    }
                    RegistryOp::Inbound(owner, name) => {
                        let payload = encode_payload(&NameSyncPayload::new([owner; 20], name))
                            .unwrap();
                        service.on_message(D2, &payload)
                    }
                };

                if result.is_err() {
                    prop_assert_eq!(service.ledger_snapshot().len(), before.len());
                }
                prop_assert!(service.check_invariants());
            }
        }
    }
}
