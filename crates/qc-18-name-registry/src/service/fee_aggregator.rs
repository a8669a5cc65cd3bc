//! Fee Aggregator
//!
//! Side-effect free quoting over a set of destinations. The same routes and
//! payload feed both the caller-facing quote and the sufficiency check made
//! before dispatch.

use crate::domain::{DomainId, ExecutionOptions, Hash, MessagingFee, RegistryError};
use crate::ports::MessageTransport;
use std::collections::HashMap;

/// A destination resolved against the peer table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Destination domain.
    pub destination: DomainId,
    /// Peer registry on that domain.
    pub peer: Hash,
    /// Execution options for this destination.
    pub options: ExecutionOptions,
}

/// Pair each destination with its options and wired peer.
///
/// Fails with `ArityMismatch` when the lists differ in length, and with
/// `NoPeer` for the first destination lacking a peer.
pub fn resolve_routes(
    peers: &HashMap<DomainId, Hash>,
    destinations: &[DomainId],
    options: &[ExecutionOptions],
) -> Result<Vec<Route>, RegistryError> {
    check_arity(destinations, options)?;
    destinations
        .iter()
        .zip(options)
        .map(|(destination, options)| {
            let peer = peers
                .get(destination)
                .copied()
                .ok_or(RegistryError::NoPeer(*destination))?;
            Ok(Route {
                destination: *destination,
                peer,
                options: options.clone(),
            })
        })
        .collect()
}

/// Every destination needs exactly one options blob.
pub fn check_arity(
    destinations: &[DomainId],
    options: &[ExecutionOptions],
) -> Result<(), RegistryError> {
    if destinations.len() != options.len() {
        return Err(RegistryError::ArityMismatch {
            destinations: destinations.len(),
            options: options.len(),
        });
    }
    Ok(())
}

/// Sum the transport's quote for `payload` over every route.
///
/// Native and secondary components are summed independently.
pub async fn aggregate_fees<T: MessageTransport + ?Sized>(
    transport: &T,
    routes: &[Route],
    payload: &[u8],
    pay_in_secondary_token: bool,
) -> Result<MessagingFee, RegistryError> {
    let mut total = MessagingFee::default();
    for route in routes {
        let fee = transport
            .quote(
                route.destination,
                payload,
                &route.options,
                pay_in_secondary_token,
            )
            .await?;
        total = total.checked_add(fee)?;
    }
    Ok(total)
}
