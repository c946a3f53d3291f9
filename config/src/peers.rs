// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The endpoints of all peers, as fed to the renderer

use interfaces::{PeerEndpointView, PeerKind, PeerSnapshot, RelationTransport};

/// One snapshot per peer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerEndpoints {
    pub amf: PeerSnapshot,
    pub upf: PeerSnapshot,
    pub nrf: PeerSnapshot,
    pub udm: PeerSnapshot,
}

impl PeerEndpoints {
    /// Read the current endpoints of every peer from `transport`.
    #[must_use]
    pub fn from_transport<T: RelationTransport + ?Sized>(transport: &T) -> Self {
        let snapshot = |peer| PeerEndpointView::new(transport, peer).snapshot();
        Self {
            amf: snapshot(PeerKind::Amf),
            upf: snapshot(PeerKind::Upf),
            nrf: snapshot(PeerKind::Nrf),
            udm: snapshot(PeerKind::Udm),
        }
    }

    /// Tell if every peer published all of its fields
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.amf, &self.upf, &self.nrf, &self.udm]
            .iter()
            .all(|snapshot| snapshot.is_complete())
    }
}

impl Default for PeerEndpoints {
    fn default() -> Self {
        Self {
            amf: PeerSnapshot::empty(PeerKind::Amf),
            upf: PeerSnapshot::empty(PeerKind::Upf),
            nrf: PeerSnapshot::empty(PeerKind::Nrf),
            udm: PeerSnapshot::empty(PeerKind::Udm),
        }
    }
}
