// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Readiness of the SMF: can its configuration be rendered and applied?

use crate::status::UnitStatus;
use interfaces::{PeerEndpointView, PeerKind, RelationTransport};
use std::fmt::Display;

/// Peers in the order they are checked
pub const PEERS: [PeerKind; 4] = [PeerKind::Amf, PeerKind::Upf, PeerKind::Nrf, PeerKind::Udm];

/// Everything readiness depends on. Arrays are indexed like [`PEERS`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadinessInputs {
    pub workload_reachable: bool,
    pub relation_exists: [bool; 4],
    pub peer_complete: [bool; 4],
}

impl ReadinessInputs {
    /// Read the inputs from a relation transport
    #[must_use]
    pub fn from_transport<T: RelationTransport + ?Sized>(workload_reachable: bool, transport: &T) -> Self {
        Self {
            workload_reachable,
            relation_exists: PEERS.map(|peer| transport.relation_created(peer.relation_name())),
            peer_complete: PEERS.map(|peer| PeerEndpointView::new(transport, peer).available()),
        }
    }
}

/// The outcome of the readiness evaluation: the first unmet condition, if any
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Readiness {
    WorkloadUnreachable,
    RelationMissing(PeerKind),
    PeerDataIncomplete(PeerKind),
    Ready,
}

impl Readiness {
    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }

    #[must_use]
    pub fn status(self) -> UnitStatus {
        match self {
            Readiness::WorkloadUnreachable => {
                UnitStatus::Waiting("Waiting for Pebble in workload container".to_string())
            }
            Readiness::RelationMissing(peer) => {
                UnitStatus::Blocked(format!("Waiting for relation to {peer} to be created"))
            }
            Readiness::PeerDataIncomplete(peer) => UnitStatus::Waiting(format!(
                "Waiting for {peer} IPv4 address to be available in relation data"
            )),
            Readiness::Ready => UnitStatus::Active,
        }
    }
}

impl Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::WorkloadUnreachable => write!(f, "workload unreachable"),
            Readiness::RelationMissing(peer) => write!(f, "relation to {peer} missing"),
            Readiness::PeerDataIncomplete(peer) => write!(f, "{peer} data incomplete"),
            Readiness::Ready => write!(f, "ready"),
        }
    }
}

/// Evaluate readiness. The workload must be reachable, then every relation must exist,
/// then every peer must have published all of its fields. Within each check, peers are
/// visited in the order of [`PEERS`].
#[must_use]
pub fn evaluate(inputs: &ReadinessInputs) -> Readiness {
    if !inputs.workload_reachable {
        return Readiness::WorkloadUnreachable;
    }
    if let Some(n) = inputs.relation_exists.iter().position(|exists| !exists) {
        return Readiness::RelationMissing(PEERS[n]);
    }
    if let Some(n) = inputs.peer_complete.iter().position(|complete| !complete) {
        return Readiness::PeerDataIncomplete(PEERS[n]);
    }
    Readiness::Ready
}
