// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Relation interfaces between the SMF operator and its 5G core peers.
//!
//! A relation is a bidirectional key/value channel between this application and one
//! remote application. The peers (AMF, UPF, NRF, UDM) publish their endpoints on their
//! side of the relation; this crate provides the read side ([`PeerEndpointView`]) and the
//! write side ([`PeerEndpointPublisher`]) on top of a [`RelationTransport`].

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod data;
mod peer;
mod publisher;
mod store;
mod transport;
pub mod utils;
mod view;

pub use data::{Relation, RelationData, RelationId};
pub use peer::PeerKind;
pub use peer::fields;
pub use publisher::{
    AmfInformation, NrfInformation, PeerEndpointPublisher, PeerInformation, UdmInformation,
    UpfInformation,
};
pub use store::RelationStore;
pub use transport::{RelationError, RelationTransport};
pub use view::{PeerAvailable, PeerEndpointView, PeerSnapshot};
