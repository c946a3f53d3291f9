// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Read side of the peer interfaces

use crate::data::{Relation, RelationData, RelationId};
use crate::peer::PeerKind;
use crate::transport::RelationTransport;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// The values of a peer's fields read at one instant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerSnapshot {
    peer: PeerKind,
    values: BTreeMap<&'static str, String>,
}

impl PeerSnapshot {
    /// A snapshot with no value for any field
    #[must_use]
    pub fn empty(peer: PeerKind) -> Self {
        Self {
            peer,
            values: BTreeMap::new(),
        }
    }

    fn from_data(peer: PeerKind, data: Option<&RelationData>) -> Self {
        let values = data
            .map(|data| {
                peer.required_fields()
                    .iter()
                    .filter_map(|&field| data.get(field).map(|v| (field, v.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        Self { peer, values }
    }

    /// Build a snapshot from explicit values. Fields that the peer does not publish are ignored.
    #[must_use]
    pub fn with_values<'a>(peer: PeerKind, values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let data: RelationData = values.into_iter().collect();
        Self::from_data(peer, Some(&data))
    }

    #[must_use]
    pub fn peer(&self) -> PeerKind {
        self.peer
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Tell if every required field has a non-empty value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.peer
            .required_fields()
            .iter()
            .all(|field| self.get(field).is_some_and(|v| !v.is_empty()))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl From<&PeerSnapshot> for RelationData {
    fn from(snapshot: &PeerSnapshot) -> Self {
        snapshot.fields().collect()
    }
}

/// Notification that a peer published all of its required fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerAvailable {
    pub relation_id: RelationId,
    pub endpoint: PeerSnapshot,
}

impl PeerAvailable {
    #[must_use]
    pub fn peer(&self) -> PeerKind {
        self.endpoint.peer()
    }
}

/// Read-only accessor over the data a peer publishes on its relation.
///
/// The view does not cache: every accessor reads the transport. Absence of the relation,
/// of the remote application or of a field all read as "not present".
pub struct PeerEndpointView<'a, T: RelationTransport + ?Sized> {
    transport: &'a T,
    peer: PeerKind,
}

impl<'a, T: RelationTransport + ?Sized> PeerEndpointView<'a, T> {
    #[must_use]
    pub fn new(transport: &'a T, peer: PeerKind) -> Self {
        Self { transport, peer }
    }

    #[must_use]
    pub fn peer(&self) -> PeerKind {
        self.peer
    }

    fn remote_app_data(&self) -> Option<&'a RelationData> {
        self.transport
            .relation(self.peer.relation_name())?
            .remote_data()
    }

    /// The value of `field` as published by the peer, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&'a str> {
        self.remote_app_data()?.get(field)
    }

    /// Tell if `field` is published with a non-empty value.
    #[must_use]
    pub fn field_available(&self, field: &str) -> bool {
        self.field(field).is_some_and(|value| !value.is_empty())
    }

    /// Tell if all the fields the peer is required to publish are available.
    #[must_use]
    pub fn available(&self) -> bool {
        self.peer
            .required_fields()
            .iter()
            .all(|field| self.field_available(field))
    }

    /// The required fields that are not available yet, in publication order
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.peer
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.field_available(field))
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> PeerSnapshot {
        PeerSnapshot::from_data(self.peer, self.remote_app_data())
    }

    /// Handle a change in `relation`. Returns a [`PeerAvailable`] notification if the remote
    /// application published every required field. The notification is produced on every
    /// change while the data is complete, not only on the first one.
    #[must_use]
    pub fn on_relation_changed(&self, relation: &Relation) -> Option<PeerAvailable> {
        let Some(data) = relation.remote_data() else {
            warn!("No remote application in relation: {}", relation.name);
            return None;
        };
        for field in self.peer.required_fields() {
            if !data.get(field).is_some_and(|v| !v.is_empty()) {
                info!(
                    "No {field} in relation data - Not triggering {} event",
                    self.peer.event_name()
                );
                return None;
            }
        }
        Some(PeerAvailable {
            relation_id: relation.id,
            endpoint: PeerSnapshot::from_data(self.peer, Some(data)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::fields::{AMF_API_VERSION, AMF_FQDN, AMF_IPV4_ADDRESS, AMF_PORT};
    use crate::store::RelationStore;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use tracing_test::traced_test;

    fn amf_data() -> RelationData {
        [
            (AMF_IPV4_ADDRESS, "1.2.3.4"),
            (AMF_FQDN, "amf.example.com"),
            (AMF_PORT, "81"),
            (AMF_API_VERSION, "v1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_absent_relation_reads_as_missing() {
        let store = RelationStore::new();
        for peer in PeerKind::iter() {
            let view = PeerEndpointView::new(&store, peer);
            assert!(!view.available());
            assert_eq!(view.field(peer.required_fields()[0]), None);
            assert_eq!(view.missing_fields(), peer.required_fields());
            assert_eq!(view.snapshot(), PeerSnapshot::empty(peer));
        }
    }

    #[test]
    fn test_available_iff_all_fields_present() {
        let mut store = RelationStore::new();
        let id = store.add_relation("fiveg-amf", Some("amf"));
        let mut data = amf_data();
        data.remove(AMF_PORT);
        store.update_remote_app_data("fiveg-amf", id, &data).unwrap();

        let view = PeerEndpointView::new(&store, PeerKind::Amf);
        assert!(view.field_available(AMF_IPV4_ADDRESS));
        assert!(!view.field_available(AMF_PORT));
        assert!(!view.available());
        assert_eq!(view.missing_fields(), vec![AMF_PORT]);

        store
            .update_remote_app_data("fiveg-amf", id, &amf_data())
            .unwrap();
        let view = PeerEndpointView::new(&store, PeerKind::Amf);
        assert!(view.available());
        assert_eq!(view.field(AMF_FQDN), Some("amf.example.com"));
        assert!(view.snapshot().is_complete());
    }

    #[test]
    fn test_empty_value_is_not_available() {
        let mut store = RelationStore::new();
        let mut relation = Relation::new("fiveg-upf", RelationId(0));
        relation.remote_app = Some("upf".to_string());
        relation.remote_app_data.insert("upf_ipv4_address", "");
        relation.remote_app_data.insert("upf_fqdn", "upf.example.com");
        store.upsert(relation);

        let view = PeerEndpointView::new(&store, PeerKind::Upf);
        assert_eq!(view.field("upf_ipv4_address"), Some(""));
        assert!(!view.field_available("upf_ipv4_address"));
        assert!(!view.available());
    }

    #[test]
    #[traced_test]
    fn test_relation_changed_without_remote_app() {
        let store = RelationStore::new();
        let view = PeerEndpointView::new(&store, PeerKind::Amf);
        let relation = Relation::new("fiveg-amf", RelationId(0));
        assert_eq!(view.on_relation_changed(&relation), None);
        assert!(logs_contain("No remote application in relation: fiveg-amf"));
    }

    #[test]
    #[traced_test]
    fn test_relation_changed_incomplete_then_complete() {
        let store = RelationStore::new();
        let view = PeerEndpointView::new(&store, PeerKind::Amf);
        let mut relation = Relation::new("fiveg-amf", RelationId(2));
        relation.remote_app = Some("amf".to_string());
        relation.remote_app_data = amf_data();
        relation.remote_app_data.remove(AMF_API_VERSION);

        assert_eq!(view.on_relation_changed(&relation), None);
        assert!(logs_contain(
            "No amf_api_version in relation data - Not triggering amf_available event"
        ));

        relation.remote_app_data = amf_data();
        let event = view.on_relation_changed(&relation).unwrap();
        assert_eq!(event.relation_id, RelationId(2));
        assert_eq!(event.peer(), PeerKind::Amf);
        assert_eq!(event.endpoint.get(AMF_PORT), Some("81"));

        // level triggered: unchanged complete data notifies again
        assert_eq!(view.on_relation_changed(&relation), Some(event));
    }

    #[test]
    fn test_snapshot_ignores_foreign_fields() {
        let snapshot = PeerSnapshot::with_values(
            PeerKind::Upf,
            [("upf_fqdn", "upf.example.com"), ("amf_port", "81")],
        );
        assert_eq!(snapshot.get("upf_fqdn"), Some("upf.example.com"));
        assert_eq!(snapshot.get("amf_port"), None);
        assert!(!snapshot.is_complete());
    }
}
