//! # QC-18 Cross-Chain Name Registry
//!
//! One-to-one owner/name registry replicated across domains.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Let an owner claim a unique name on one domain and propagate the claim
//! to registry instances on other domains:
//! - Local claims are checked for validity and uniqueness before commit
//! - Fan-out sends one message per destination over a fee-charging transport
//! - Remote updates are applied unconditionally, evicting local conflicts
//!
//! ## Guarantees
//!
//! | Property | Scope |
//! |----------|-------|
//! | Name uniqueness | Per domain, at all times |
//! | Owner/name maps inverse | Per domain, after every operation |
//! | No mutation on rejection | Every rejected local call |
//! | Convergence | Only when updates for an owner arrive in order |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-name-registry/
//! ├── domain/          # NameLedger, DomainId, MessagingFee, errors, config
//! ├── algorithms/      # Payload codec, fee split
//! ├── ports/           # NameRegistryApi, MessageReceiver, MessageTransport
//! ├── service/         # NameRegistryService, fee aggregation
//! └── adapters/        # InMemoryNetwork transport
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let network = InMemoryNetwork::new();
//! let home = Arc::new(NameRegistryService::new(
//!     RegistryConfig::new(DomainId(1)),
//!     Arc::new(network.endpoint(DomainId(1), HOME_APP)),
//! ));
//! home.set_peer(DomainId(2), REMOTE_APP);
//!
//! let fee = home.quote(alice, &[DomainId(2)], "alice", &opts, false).await?;
//! home.claim_and_sync(alice, "alice", &[DomainId(2)], &opts, fee.native_fee).await?;
//! network.deliver_all();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod telemetry;

// Re-exports
pub use adapters::{
    DeliveryOutcome, InFlightMessage, InMemoryEndpoint, InMemoryNetwork, PricingModel,
};
pub use algorithms::{
    decode_payload, encode_payload, split_evenly, NameSyncPayload, MAX_PAYLOAD_BYTES,
};
pub use domain::{
    invariant_maps_inverse, invariant_valid_name, Address, AppliedUpdate, ClaimOutcome,
    ConfigError, DeliveryReceipt, DispatchedMessage, DomainId, ErrorKind, ExecutionOptions,
    FailedDispatch, Hash, MessagingFee, NameLedger, RegistryConfig, RegistryConfigBuilder,
    RegistryError, SyncReport, TransportError, MAX_NAME_LENGTH,
};
pub use events::RegistryEvent;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{MessageReceiver, MessageTransport, MockTransport, NameRegistryApi, SendRequest};
pub use service::NameRegistryService;
pub use telemetry::{init_logging, TelemetryConfig, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
