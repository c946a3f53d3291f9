// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Local SMF parameters. None of these are learnt from peers.

use derive_builder::Builder;
use std::fmt::Display;

/// A data network served by the SMF, with the pool of addresses assigned to UEs
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dnn {
    pub ni: String,
    pub pdu_session_type: String,
    pub ipv4_range: String,
    pub ipv6_prefix: String,
}

impl Dnn {
    #[must_use]
    pub fn new(ni: &str, pdu_session_type: &str, ipv4_range: &str, ipv6_prefix: &str) -> Self {
        Self {
            ni: ni.to_string(),
            pdu_session_type: pdu_session_type.to_string(),
            ipv4_range: ipv4_range.to_string(),
            ipv6_prefix: ipv6_prefix.to_string(),
        }
    }
}

/// A locally configured session management subscription
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionManagement {
    pub nssai_sst: u8,
    pub nssai_sd: String,
    pub dnn: String,
    pub default_session_type: String,
    pub qos_profile_5qi: u8,
}

impl SessionManagement {
    #[must_use]
    pub fn new(nssai_sst: u8, nssai_sd: &str, dnn: &Dnn, qos_profile_5qi: u8) -> Self {
        Self {
            nssai_sst,
            nssai_sd: nssai_sd.to_string(),
            dnn: dnn.ni.clone(),
            default_session_type: dnn.pdu_session_type.clone(),
            qos_profile_5qi,
        }
    }
}

/// DNS servers communicated to UEs
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DnsAddresses {
    pub ipv4: String,
    pub ipv4_secondary: String,
    pub ipv6: String,
    pub ipv6_secondary: String,
}

/// Optional SMF features
#[derive(Clone, Debug, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SupportFeatures {
    pub register_nrf: bool,
    pub discover_upf: bool,
    pub force_push_protocol_configuration_options: bool,
    pub use_local_subscription_info: bool,
    pub use_fqdn_dns: bool,
    pub http_version: u8,
    pub use_network_instance: bool,
    pub enable_usage_reporting: bool,
}

impl Default for SupportFeatures {
    fn default() -> Self {
        Self {
            register_nrf: true,
            discover_upf: true,
            force_push_protocol_configuration_options: false,
            use_local_subscription_info: true,
            use_fqdn_dns: true,
            http_version: 1,
            use_network_instance: false,
            enable_usage_reporting: false,
        }
    }
}

/// Network instance domains of the UPF
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkInstance {
    pub domain_access: String,
    pub domain_core: String,
}

fn default_dns() -> DnsAddresses {
    DnsAddresses {
        ipv4: "172.21.3.100".to_string(),
        ipv4_secondary: "172.21.3.100".to_string(),
        ipv6: "2001:4860:4860::8888".to_string(),
        ipv6_secondary: "2001:4860:4860::8888".to_string(),
    }
}

fn default_network_instance() -> NetworkInstance {
    NetworkInstance {
        domain_access: "random".to_string(),
        domain_core: "random".to_string(),
    }
}

fn default_dnns() -> Vec<Dnn> {
    vec![
        Dnn::new("oai.ipv4", "IPv4", "12.1.1.2 - 12.1.1.40", "2001:1:2::/64"),
        Dnn::new("default", "IPv4", "12.1.1.41 - 12.1.1.80", "3001:1:2::/64"),
        Dnn::new("oai", "IPv4", "12.1.1.81 - 12.1.1.120", "4001:1:2::/64"),
    ]
}

fn default_session_management() -> Vec<SessionManagement> {
    let dnns = default_dnns();
    // all subscriptions use the session type of the first DNN
    let session_type = dnns[0].pdu_session_type.clone();
    [(1, "1", 6), (222, "123", 7), (1, "1023", 8)]
        .into_iter()
        .zip(dnns.iter())
        .map(|((sst, sd, qos), dnn)| SessionManagement {
            default_session_type: session_type.clone(),
            ..SessionManagement::new(sst, sd, dnn, qos)
        })
        .collect()
}

/// The parameters of the SMF that do not depend on any peer.
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
pub struct SmfParams {
    /// Name of this application
    #[builder(setter(into))]
    pub app_name: String,

    /// Name of the model (namespace) this application runs in
    #[builder(setter(into))]
    pub model_name: String,

    #[builder(default = 0)]
    pub instance: u32,

    #[builder(setter(into), default = "/var/run".to_string())]
    pub pid_directory: String,

    #[builder(setter(into), default = "eth0".to_string())]
    pub n4_interface_name: String,

    #[builder(default = 8805)]
    pub n4_port: u16,

    #[builder(setter(into), default = "eth0".to_string())]
    pub sbi_interface_name: String,

    #[builder(default = 80)]
    pub sbi_port: u16,

    #[builder(default = 9090)]
    pub sbi_http2_port: u16,

    #[builder(setter(into), default = "v1".to_string())]
    pub sbi_api_version: String,

    #[builder(default = default_dnns())]
    pub dnns: Vec<Dnn>,

    #[builder(default = default_dns())]
    pub dns: DnsAddresses,

    #[builder(setter(into), default = "127.0.0.1".to_string())]
    pub cscf_ipv4_address: String,

    #[builder(setter(into), default = "fe80::7915:f408:1787:db8b".to_string())]
    pub cscf_ipv6_address: String,

    #[builder(default = 1500)]
    pub ue_mtu: u16,

    #[builder(default)]
    pub features: SupportFeatures,

    #[builder(default = default_network_instance())]
    pub upf_network_instance: NetworkInstance,

    #[builder(default = default_session_management())]
    pub session_management: Vec<SessionManagement>,
}

impl SmfParams {
    /// Parameters with every default value for application `app_name` in model `model_name`
    pub fn new(app_name: &str, model_name: &str) -> Result<Self, SmfParamsBuilderError> {
        SmfParamsBuilder::default()
            .app_name(app_name)
            .model_name(model_name)
            .build()
    }

    /// The FQDN of the SMF service inside the cluster
    #[must_use]
    pub fn fqdn(&self) -> String {
        format!("{}.{}.svc.cluster.local", self.app_name, self.model_name)
    }
}

impl Display for SmfParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SMF parameters")?;
        writeln!(f, "  fqdn     : {}", self.fqdn())?;
        writeln!(f, "  N4       : {}:{}", self.n4_interface_name, self.n4_port)?;
        writeln!(
            f,
            "  SBI      : {}:{} (http2: {}, api: {})",
            self.sbi_interface_name, self.sbi_port, self.sbi_http2_port, self.sbi_api_version
        )?;
        writeln!(f, "  DNNs     : {}", self.dnns.len())?;
        write!(f, "  UE MTU   : {}", self.ue_mtu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_has_defaults() {
        let params = SmfParams::new("oai-5g-smf", "core").unwrap();
        assert_eq!(params.fqdn(), "oai-5g-smf.core.svc.cluster.local");
        assert_eq!(params.instance, 0);
        assert_eq!(params.pid_directory, "/var/run");
        assert_eq!(
            (params.n4_port, params.sbi_port, params.sbi_http2_port),
            (8805, 80, 9090)
        );
        assert_eq!(params.sbi_api_version, "v1");
        assert_eq!(params.ue_mtu, 1500);
        assert_eq!(params.features, SupportFeatures::default());
        assert_eq!(params.dnns, default_dnns());
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let params = SmfParamsBuilder::default()
            .app_name("smf")
            .model_name("core")
            .n4_port(8806_u16)
            .build()
            .unwrap();
        assert_eq!(params.n4_port, 8806);
        assert_eq!(
            SmfParams {
                n4_port: 8805,
                ..params
            },
            SmfParams::new("smf", "core").unwrap()
        );
    }

    #[test]
    fn test_builder_requires_names() {
        assert!(SmfParamsBuilder::default().app_name("smf").build().is_err());
    }

    #[test]
    fn test_session_management_defaults() {
        let params = SmfParams::new("smf", "core").unwrap();
        let subscriptions: Vec<(u8, &str, &str, u8)> = params
            .session_management
            .iter()
            .map(|s| (s.nssai_sst, s.nssai_sd.as_str(), s.dnn.as_str(), s.qos_profile_5qi))
            .collect();
        assert_eq!(
            subscriptions,
            vec![
                (1, "1", "oai.ipv4", 6),
                (222, "123", "default", 7),
                (1, "1023", "oai", 8)
            ]
        );
        assert!(params
            .session_management
            .iter()
            .all(|s| s.default_session_type == "IPv4"));
    }
}
