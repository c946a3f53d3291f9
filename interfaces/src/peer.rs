// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The peer network functions the SMF depends on

use strum::IntoEnumIterator;

/// Field names published by each peer
pub mod fields {
    pub const AMF_IPV4_ADDRESS: &str = "amf_ipv4_address";
    pub const AMF_FQDN: &str = "amf_fqdn";
    pub const AMF_PORT: &str = "amf_port";
    pub const AMF_API_VERSION: &str = "amf_api_version";

    pub const UPF_IPV4_ADDRESS: &str = "upf_ipv4_address";
    pub const UPF_FQDN: &str = "upf_fqdn";

    pub const NRF_IPV4_ADDRESS: &str = "nrf_ipv4_address";
    pub const NRF_FQDN: &str = "nrf_fqdn";
    pub const NRF_PORT: &str = "nrf_port";
    pub const NRF_API_VERSION: &str = "nrf_api_version";

    pub const UDM_IPV4_ADDRESS: &str = "udm_ipv4_address";
    pub const UDM_FQDN: &str = "udm_fqdn";
    pub const UDM_PORT: &str = "udm_port";
    pub const UDM_API_VERSION: &str = "udm_api_version";
}

use fields::{
    AMF_API_VERSION, AMF_FQDN, AMF_IPV4_ADDRESS, AMF_PORT, NRF_API_VERSION, NRF_FQDN,
    NRF_IPV4_ADDRESS, NRF_PORT, UDM_API_VERSION, UDM_FQDN, UDM_IPV4_ADDRESS, UDM_PORT, UPF_FQDN,
    UPF_IPV4_ADDRESS,
};

const AMF_FIELDS: &[&str] = &[AMF_IPV4_ADDRESS, AMF_FQDN, AMF_PORT, AMF_API_VERSION];
const UPF_FIELDS: &[&str] = &[UPF_IPV4_ADDRESS, UPF_FQDN];
const NRF_FIELDS: &[&str] = &[NRF_IPV4_ADDRESS, NRF_FQDN, NRF_PORT, NRF_API_VERSION];
const UDM_FIELDS: &[&str] = &[UDM_IPV4_ADDRESS, UDM_FQDN, UDM_PORT, UDM_API_VERSION];

/// A remote role the SMF depends on.
///
/// Variants are declared in the order readiness checks visit them: the first peer
/// that is not ready is the one reported.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum::Display, strum::EnumIter)]
pub enum PeerKind {
    #[strum(serialize = "AMF")]
    Amf,
    #[strum(serialize = "UPF")]
    Upf,
    #[strum(serialize = "NRF")]
    Nrf,
    #[strum(serialize = "UDM")]
    Udm,
}

impl PeerKind {
    /// Name of the relation endpoint over which this peer publishes its information
    #[must_use]
    pub const fn relation_name(self) -> &'static str {
        match self {
            PeerKind::Amf => "fiveg-amf",
            PeerKind::Upf => "fiveg-upf",
            PeerKind::Nrf => "fiveg-nrf",
            PeerKind::Udm => "fiveg-udm",
        }
    }

    /// Fields that must all be present before the peer is considered available
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            PeerKind::Amf => AMF_FIELDS,
            PeerKind::Upf => UPF_FIELDS,
            PeerKind::Nrf => NRF_FIELDS,
            PeerKind::Udm => UDM_FIELDS,
        }
    }

    /// Name of the event raised when the peer becomes available
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            PeerKind::Amf => "amf_available",
            PeerKind::Upf => "upf_available",
            PeerKind::Nrf => "nrf_available",
            PeerKind::Udm => "udm_available",
        }
    }

    /// Look up the peer served by the relation endpoint `name`
    #[must_use]
    pub fn from_relation_name(name: &str) -> Option<Self> {
        PeerKind::iter().find(|peer| peer.relation_name() == name)
    }
}
