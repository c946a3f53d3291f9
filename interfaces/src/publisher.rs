// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Write side of the peer interfaces, used by the applications providing the endpoints.

use crate::data::{RelationData, RelationId};
use crate::peer::PeerKind;
use crate::peer::fields::{
    AMF_API_VERSION, AMF_FQDN, AMF_IPV4_ADDRESS, AMF_PORT, NRF_API_VERSION, NRF_FQDN,
    NRF_IPV4_ADDRESS, NRF_PORT, UDM_API_VERSION, UDM_FQDN, UDM_IPV4_ADDRESS, UDM_PORT, UPF_FQDN,
    UPF_IPV4_ADDRESS,
};
use crate::transport::{RelationError, RelationTransport};
use tracing::debug;

/// Complete endpoint information of one peer kind
pub trait PeerInformation: Into<RelationData> {
    const PEER: PeerKind;
}

/// AMF endpoint information
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AmfInformation {
    pub ipv4_address: String,
    pub fqdn: String,
    pub port: String,
    pub api_version: String,
}

impl From<AmfInformation> for RelationData {
    fn from(info: AmfInformation) -> Self {
        [
            (AMF_IPV4_ADDRESS, info.ipv4_address),
            (AMF_FQDN, info.fqdn),
            (AMF_PORT, info.port),
            (AMF_API_VERSION, info.api_version),
        ]
        .into_iter()
        .collect()
    }
}

impl PeerInformation for AmfInformation {
    const PEER: PeerKind = PeerKind::Amf;
}

/// UPF endpoint information
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpfInformation {
    pub ipv4_address: String,
    pub fqdn: String,
}

impl From<UpfInformation> for RelationData {
    fn from(info: UpfInformation) -> Self {
        [(UPF_IPV4_ADDRESS, info.ipv4_address), (UPF_FQDN, info.fqdn)]
            .into_iter()
            .collect()
    }
}

impl PeerInformation for UpfInformation {
    const PEER: PeerKind = PeerKind::Upf;
}

/// NRF endpoint information
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NrfInformation {
    pub ipv4_address: String,
    pub fqdn: String,
    pub port: String,
    pub api_version: String,
}

impl From<NrfInformation> for RelationData {
    fn from(info: NrfInformation) -> Self {
        [
            (NRF_IPV4_ADDRESS, info.ipv4_address),
            (NRF_FQDN, info.fqdn),
            (NRF_PORT, info.port),
            (NRF_API_VERSION, info.api_version),
        ]
        .into_iter()
        .collect()
    }
}

impl PeerInformation for NrfInformation {
    const PEER: PeerKind = PeerKind::Nrf;
}

/// UDM endpoint information
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UdmInformation {
    pub ipv4_address: String,
    pub fqdn: String,
    pub port: String,
    pub api_version: String,
}

impl From<UdmInformation> for RelationData {
    fn from(info: UdmInformation) -> Self {
        [
            (UDM_IPV4_ADDRESS, info.ipv4_address),
            (UDM_FQDN, info.fqdn),
            (UDM_PORT, info.port),
            (UDM_API_VERSION, info.api_version),
        ]
        .into_iter()
        .collect()
    }
}

impl PeerInformation for UdmInformation {
    const PEER: PeerKind = PeerKind::Udm;
}

/// Publishes this application's endpoint information on a peer relation.
pub struct PeerEndpointPublisher<'a, T: RelationTransport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: RelationTransport + ?Sized> PeerEndpointPublisher<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self { transport }
    }

    /// Publish the complete field set of `peer` on relation instance `relation_id`.
    /// The values replace whatever this application published before on that relation.
    ///
    /// # Errors
    /// Fails with [`RelationError::RelationNotReady`] if the relation instance was not created,
    /// and with [`RelationError::MissingField`] if `values` lacks a required field. Nothing is
    /// written in either case.
    pub fn publish(
        &mut self,
        peer: PeerKind,
        relation_id: RelationId,
        values: RelationData,
    ) -> Result<(), RelationError> {
        let relation = peer.relation_name();
        if self.transport.relation_by_id(relation, relation_id).is_none() {
            return Err(RelationError::RelationNotReady {
                relation: relation.to_string(),
                id: relation_id,
            });
        }
        if let Some(field) = peer
            .required_fields()
            .iter()
            .copied()
            .find(|field| !values.is_available(field))
        {
            return Err(RelationError::MissingField { peer, field });
        }
        self.transport
            .set_local_app_data(relation, relation_id, values)?;
        debug!("Published {peer} information on relation {relation}:{relation_id}");
        Ok(())
    }

    /// Publish typed endpoint information. See [`PeerEndpointPublisher::publish`].
    pub fn publish_information<I: PeerInformation>(
        &mut self,
        relation_id: RelationId,
        information: I,
    ) -> Result<(), RelationError> {
        self.publish(I::PEER, relation_id, information.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RelationStore;
    use pretty_assertions::assert_eq;

    fn amf_information() -> AmfInformation {
        AmfInformation {
            ipv4_address: "1.2.3.4".to_string(),
            fqdn: "amf.example.com".to_string(),
            port: "81".to_string(),
            api_version: "v1".to_string(),
        }
    }

    #[test]
    fn test_publish_amf_information() {
        let mut store = RelationStore::new();
        let id = store.add_relation("fiveg-amf", Some("smf"));
        PeerEndpointPublisher::new(&mut store)
            .publish_information(id, amf_information())
            .unwrap();

        let local = &store.relation_by_id("fiveg-amf", id).unwrap().local_app_data;
        assert_eq!(local.len(), 4);
        assert_eq!(local.get("amf_ipv4_address"), Some("1.2.3.4"));
        assert_eq!(local.get("amf_api_version"), Some("v1"));
    }

    #[test]
    fn test_publish_without_relation_fails() {
        let mut store = RelationStore::new();
        let err = PeerEndpointPublisher::new(&mut store)
            .publish_information(RelationId(12), amf_information())
            .unwrap_err();
        assert_eq!(
            err,
            RelationError::RelationNotReady {
                relation: "fiveg-amf".to_string(),
                id: RelationId(12)
            }
        );
        assert!(store.relations("fiveg-amf").is_empty());
    }

    #[test]
    fn test_publish_to_other_instance_id_fails() {
        let mut store = RelationStore::new();
        let id = store.add_relation("fiveg-upf", Some("smf"));
        let other = RelationId(id.0 + 1);
        let info = UpfInformation {
            ipv4_address: "1.2.3.4".to_string(),
            fqdn: "upf.example.com".to_string(),
        };
        assert!(matches!(
            PeerEndpointPublisher::new(&mut store).publish_information(other, info),
            Err(RelationError::RelationNotReady { .. })
        ));
        assert!(store.relation_by_id("fiveg-upf", id).unwrap().local_app_data.is_empty());
    }

    #[test]
    fn test_publish_incomplete_values_fails() {
        let mut store = RelationStore::new();
        let id = store.add_relation("fiveg-nrf", Some("smf"));
        let mut values: RelationData = NrfInformation {
            ipv4_address: "1.2.3.4".to_string(),
            fqdn: "nrf.example.com".to_string(),
            port: "81".to_string(),
            api_version: "v1".to_string(),
        }
        .into();
        values.remove("nrf_port");

        let err = PeerEndpointPublisher::new(&mut store)
            .publish(PeerKind::Nrf, id, values)
            .unwrap_err();
        assert_eq!(
            err,
            RelationError::MissingField {
                peer: PeerKind::Nrf,
                field: "nrf_port"
            }
        );
        assert!(store.relation_by_id("fiveg-nrf", id).unwrap().local_app_data.is_empty());
    }

    #[test]
    fn test_publish_replaces_previous_values() {
        let mut store = RelationStore::new();
        let id = store.add_relation("fiveg-udm", Some("smf"));
        let mut values: RelationData = UdmInformation {
            ipv4_address: "1.2.3.4".to_string(),
            fqdn: "udm.example.com".to_string(),
            port: "81".to_string(),
            api_version: "v1".to_string(),
        }
        .into();
        values.insert("udm_extra", "stale");
        let mut publisher = PeerEndpointPublisher::new(&mut store);
        publisher.publish(PeerKind::Udm, id, values.clone()).unwrap();

        values.remove("udm_extra");
        values.insert("udm_port", "82");
        publisher.publish(PeerKind::Udm, id, values.clone()).unwrap();

        assert_eq!(
            store.relation_by_id("fiveg-udm", id).unwrap().local_app_data,
            values
        );
    }
}
