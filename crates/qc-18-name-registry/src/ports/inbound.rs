//! # Inbound Ports
//!
//! API traits defining what the Name Registry subsystem can do.

use crate::domain::{
    Address, DomainId, ExecutionOptions, Hash, MessagingFee, RegistryError, SyncReport,
};
use async_trait::async_trait;

/// Name registry API - inbound port for ordinary callers.
#[async_trait]
pub trait NameRegistryApi: Send + Sync {
    /// Claim `name` for `caller` and propagate it to `destinations`.
    ///
    /// `options[i]` applies to `destinations[i]`. `funds` are split evenly
    /// across destinations, the last absorbing the remainder.
    async fn claim_and_sync(
        &self,
        caller: Address,
        name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        funds: u128,
    ) -> Result<SyncReport, RegistryError>;

    /// Replace the caller's existing name and propagate the change.
    async fn update_and_sync(
        &self,
        caller: Address,
        new_name: &str,
        destinations: &[DomainId],
        options: &[ExecutionOptions],
        funds: u128,
    ) -> Result<SyncReport, RegistryError>;

    /// Total fee to propagate `(caller, name)` to `destinations`.
    async fn quote(
        &self,
        caller: Address,
        destinations: &[DomainId],
        name: &str,
        options: &[ExecutionOptions],
        pay_in_secondary_token: bool,
    ) -> Result<MessagingFee, RegistryError>;

    /// Name held by `owner`.
    fn name_of(&self, owner: &Address) -> Option<String>;

    /// Owner of `name`.
    fn owner_of(&self, name: &str) -> Option<Address>;
}

/// Inbound hook invoked by the transport collaborator.
///
/// Not part of the public surface for ordinary callers. The transport must
/// authenticate the origin with [`MessageReceiver::is_trusted_origin`]
/// before calling [`MessageReceiver::on_message`]; the receiver itself does
/// no origin checks.
pub trait MessageReceiver: Send + Sync {
    /// True when `sender` is the wired peer for `origin`.
    fn is_trusted_origin(&self, origin: DomainId, sender: &Hash) -> bool;

    /// Apply a payload that arrived from `origin`.
    fn on_message(&self, origin: DomainId, payload: &[u8]) -> Result<(), RegistryError>;
}
