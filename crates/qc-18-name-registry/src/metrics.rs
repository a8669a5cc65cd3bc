//! Metrics hooks for registry operations
//!
//! Thread-safe counters covering local mutations, fan-out and inbound
//! application.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the registry
#[derive(Default)]
pub struct Metrics {
    /// Successful local claims
    pub claims: AtomicU64,
    /// Successful local updates
    pub updates: AtomicU64,
    /// Requests rejected before any mutation
    pub rejected: AtomicU64,
    /// Messages accepted by the transport
    pub messages_dispatched: AtomicU64,
    /// Sends that failed after the local commit
    pub send_failures: AtomicU64,
    /// Inbound updates applied
    pub inbound_applied: AtomicU64,
    /// Inbound updates that displaced a local owner
    pub inbound_evictions: AtomicU64,
    /// Inbound payloads that failed to decode
    pub decode_failures: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful claim or update
    pub fn record_mutation(&self, is_update: bool) {
        if is_update {
            self.updates.fetch_add(1, Ordering::Relaxed);
        } else {
            self.claims.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a request rejected during validation
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record fan-out results
    pub fn record_fan_out(&self, dispatched: usize, failed: usize) {
        self.messages_dispatched
            .fetch_add(dispatched as u64, Ordering::Relaxed);
        self.send_failures.fetch_add(failed as u64, Ordering::Relaxed);
    }

    /// Record an applied inbound update
    pub fn record_inbound(&self, evicted: bool) {
        self.inbound_applied.fetch_add(1, Ordering::Relaxed);
        if evicted {
            self.inbound_evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rejected inbound payload
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            claims: self.claims.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            messages_dispatched: self.messages_dispatched.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            inbound_applied: self.inbound_applied.load(Ordering::Relaxed),
            inbound_evictions: self.inbound_evictions.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct MetricsSnapshot {
    pub claims: u64,
    pub updates: u64,
    pub rejected: u64,
    pub messages_dispatched: u64,
    pub send_failures: u64,
    pub inbound_applied: u64,
    pub inbound_evictions: u64,
    pub decode_failures: u64,
}
