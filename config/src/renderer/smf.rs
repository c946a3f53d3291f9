// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: smf.conf

use crate::params::{DnsAddresses, Dnn, NetworkInstance, SessionManagement, SmfParams, SupportFeatures};
use crate::peers::PeerEndpoints;
use crate::renderer::builder::{ConfigBuilder, Render};

use interfaces::PeerSnapshot;
use interfaces::fields::{
    AMF_API_VERSION, AMF_FQDN, AMF_IPV4_ADDRESS, AMF_PORT, NRF_API_VERSION, NRF_FQDN,
    NRF_IPV4_ADDRESS, NRF_PORT, UDM_API_VERSION, UDM_FQDN, UDM_IPV4_ADDRESS, UDM_PORT, UPF_FQDN,
    UPF_IPV4_ADDRESS,
};

const BANNER: &[&str] = &[
    "################################################################################",
    "# Licensed to the OpenAirInterface (OAI) Software Alliance under one or more",
    "# contributor license agreements.  See the NOTICE file distributed with",
    "# this work for additional information regarding copyright ownership.",
    "# The OpenAirInterface Software Alliance licenses this file to You under",
    "# the OAI Public License, Version 1.1  (the \"License\"); you may not use this file",
    "# except in compliance with the License.",
    "# You may obtain a copy of the License at",
    "#",
    "#      http://www.openairinterface.org/?page_id=698",
    "#",
    "# Unless required by applicable law or agreed to in writing, software",
    "# distributed under the License is distributed on an \"AS IS\" BASIS,",
    "# WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.",
    "# See the License for the specific language governing permissions and",
    "# limitations under the License.",
    "#-------------------------------------------------------------------------------",
    "# For more information about the OpenAirInterface (OAI) Software Alliance:",
    "#      contact@openairinterface.org",
    "################################################################################",
];

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Value of `field` in `snapshot`. Absent values render empty.
fn value<'a>(snapshot: &'a PeerSnapshot, field: &str) -> &'a str {
    snapshot.get(field).unwrap_or_default()
}

/// N4 and SBI interfaces of the SMF itself
struct Interfaces<'a>(&'a SmfParams);

/// A peer reached over the service based interface
struct SbiPeer<'a> {
    snapshot: &'a PeerSnapshot,
    ipv4_address: &'static str,
    fqdn: &'static str,
    port: &'static str,
    api_version: &'static str,
}

/// The UPF list. There is a single UPF.
struct UpfList<'a>(&'a PeerSnapshot);

impl Render for Interfaces<'_> {
    type Context = ();
    type Output = ConfigBuilder;

    fn render(&self, (): &Self::Context) -> Self::Output {
        let params = self.0;
        let mut cfg = ConfigBuilder::new();
        cfg += "    INTERFACES :";
        cfg += "    {";

        /* N4 */
        cfg += "        N4 :";
        cfg += "        {";
        cfg += "            # SMF binded interface for N4 communication (UPF)";
        cfg += format!(
            "            INTERFACE_NAME = \"{}\"; # YOUR NETWORK CONFIG HERE",
            params.n4_interface_name
        );
        cfg += "            IPV4_ADDRESS   = \"read\";";
        cfg += "         };";
        cfg.blank();

        /* SBI */
        cfg += "        SBI :";
        cfg += "        {";
        cfg += "            # SMF binded interface for SBI interface (e.g., communication with AMF, UDM)";
        cfg += format!(
            "            INTERFACE_NAME = \"{}\";     # YOUR NETWORK CONFIG HERE",
            params.sbi_interface_name
        );
        cfg += "            IPV4_ADDRESS   = \"read\";";
        cfg += format!(
            "            PORT           = {};       # YOUR NETWORK CONFIG HERE (default: 80)",
            params.sbi_port
        );
        cfg += format!(
            "            HTTP2_PORT     = {}; # YOUR NETWORK CONFIG HERE",
            params.sbi_http2_port
        );
        cfg += format!(
            "            API_VERSION    = \"{}\";                # YOUR SMF API VERSION CONFIG HERE",
            params.sbi_api_version
        );
        cfg += "         };";
        cfg.blank();

        cfg += "    };";
        cfg.blank();
        cfg
    }
}

impl Render for Vec<Dnn> {
    type Context = ();
    type Output = ConfigBuilder;

    fn render(&self, (): &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += "    # DNN configurations with pool of UE assigned IP addresses";
        cfg += "    # Do not make IP pools overlap";
        cfg += "    # first IPv4 address X.Y.Z.1 is reserved for GTP network device on UPF";
        cfg += "    DNN_LIST = (";
        cfg += "       # PDU_SESSION_TYPE choice in {IPv4, IPv6, IPv4v6}";
        cfg += "       # DNN IP ADDRESS RANGE format is for example: \"12.2.1.2 - 12.2.1.128\"";
        for (n, dnn) in self.iter().enumerate() {
            let sep = if n + 1 < self.len() { "," } else { "" };
            cfg += format!(
                "      {{DNN_NI = \"{}\"; PDU_SESSION_TYPE = \"{}\"; IPV4_RANGE = \"{}\"; IPV6_PREFIX = \"{}\"}}{sep}",
                dnn.ni, dnn.pdu_session_type, dnn.ipv4_range, dnn.ipv6_prefix
            );
        }
        cfg += "    );";
        cfg.blank();
        cfg
    }
}

impl Render for DnsAddresses {
    type Context = ();
    type Output = ConfigBuilder;

    fn render(&self, (): &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += "    # DNS address communicated to UEs";
        cfg += format!(
            "    DEFAULT_DNS_IPV4_ADDRESS     = \"{}\";      # YOUR DNS CONFIG HERE",
            self.ipv4
        );
        cfg += format!(
            "    DEFAULT_DNS_SEC_IPV4_ADDRESS = \"{}\";  # YOUR DNS CONFIG HERE",
            self.ipv4_secondary
        );
        cfg += format!(
            "    DEFAULT_DNS_IPV6_ADDRESS     = \"{}\";            # YOUR DNS CONFIG HERE",
            self.ipv6
        );
        cfg += format!(
            "    DEFAULT_DNS_SEC_IPV6_ADDRESS = \"{}\";            # YOUR DNS CONFIG HERE",
            self.ipv6_secondary
        );
        cfg.blank();
        cfg
    }
}

impl Render for SupportFeatures {
    type Context = ();
    type Output = ConfigBuilder;

    fn render(&self, (): &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += "    # SUPPORT FEATURES";
        cfg += "    SUPPORT_FEATURES:";
        cfg += "    {";
        cfg += "      # STRING, {\"yes\", \"no\"},";
        cfg += format!(
            "      REGISTER_NRF = \"{}\";  # Set to yes if SMF resgisters to an NRF",
            yes_no(self.register_nrf)
        );
        cfg += format!(
            "      DISCOVER_UPF = \"{}\";  # Set to yes to enable UPF discovery and selection",
            yes_no(self.discover_upf)
        );
        cfg += format!(
            "      FORCE_PUSH_PROTOCOL_CONFIGURATION_OPTIONS = \"{}\"; # Non standard feature, normally should be set to \"no\",",
            yes_no(self.force_push_protocol_configuration_options)
        );
        cfg += "                                                        # but you may need to set to yes for UE that do not explicitly request a PDN address through NAS signalling";
        cfg += format!(
            "      USE_LOCAL_SUBSCRIPTION_INFO = \"{}\";  # Set to yes if SMF uses local subscription information instead of from an UDM",
            yes_no(self.use_local_subscription_info)
        );
        cfg += format!(
            "      USE_FQDN_DNS = \"{}\";                  # Set to yes if AMF/UDM/NRF/UPF will relying on a DNS to resolve FQDN",
            yes_no(self.use_fqdn_dns)
        );
        cfg += format!(
            "      HTTP_VERSION = {};                    # Default: 1",
            self.http_version
        );
        cfg += format!(
            "      USE_NETWORK_INSTANCE    = \"{}\"   # Set yes if network instance is to be used for given UPF",
            yes_no(self.use_network_instance)
        );
        cfg += format!(
            "      ENABLE_USAGE_REPORTING = \"{}\"   # Set yes if UE USAGE REPORTING is to be done at UPF",
            yes_no(self.enable_usage_reporting)
        );
        cfg += "    }";
        cfg.blank();
        cfg
    }
}

impl Render for SbiPeer<'_> {
    type Context = ();
    type Output = ConfigBuilder;

    fn render(&self, (): &Self::Context) -> Self::Output {
        let label = self.snapshot.peer();
        let mut cfg = ConfigBuilder::new();
        cfg += format!("    {label} :");
        cfg += "    {";
        cfg += format!(
            "      IPV4_ADDRESS = \"{}\";  # YOUR {label} CONFIG HERE",
            value(self.snapshot, self.ipv4_address)
        );
        cfg += format!(
            "      PORT         = {};            # YOUR {label} CONFIG HERE (default: 80)",
            value(self.snapshot, self.port)
        );
        cfg += format!(
            "      API_VERSION  = \"{}\";   # YOUR {label} API VERSION FOR SBI CONFIG HERE",
            value(self.snapshot, self.api_version)
        );
        cfg += format!(
            "      FQDN         = \"{}\"           # YOUR {label} FQDN CONFIG HERE",
            value(self.snapshot, self.fqdn)
        );
        cfg += "    };";
        cfg.blank();
        cfg
    }
}

impl Render for UpfList<'_> {
    type Context = NetworkInstance;
    type Output = ConfigBuilder;

    fn render(&self, nwi: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += "    UPF_LIST = (";
        cfg += format!(
            "         {{IPV4_ADDRESS = \"{}\" ; FQDN = \"{}\"; NWI_LIST = ({{DOMAIN_ACCESS  = \"{}\", DOMAIN_CORE = \"{}\"}})}}   # YOUR UPF CONFIG HERE",
            value(self.0, UPF_IPV4_ADDRESS),
            value(self.0, UPF_FQDN),
            nwi.domain_access,
            nwi.domain_core
        );
        cfg += "    );                                                               # NWI_LIST IS OPTIONAL PARAMETER";
        cfg.blank();
        cfg
    }
}

impl Render for Vec<SessionManagement> {
    type Context = ();
    type Output = ConfigBuilder;

    fn render(&self, (): &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += "    LOCAL_CONFIGURATION :";
        cfg += "    {";
        cfg += "      SESSION_MANAGEMENT_SUBSCRIPTION_LIST = (";
        for (n, sm) in self.iter().enumerate() {
            /* the first entry separates SST from SD with a comma, the others with a semicolon */
            let sst_sep = if n == 0 { "," } else { ";" };
            let sep = if n + 1 < self.len() { "," } else { "" };
            cfg += format!(
                "         {{ NSSAI_SST = {}{sst_sep} NSSAI_SD = \"{}\", DNN = \"{}\", DEFAULT_SESSION_TYPE = \"{}\", DEFAULT_SSC_MODE = 1,",
                sm.nssai_sst, sm.nssai_sd, sm.dnn, sm.default_session_type
            );
            cfg += format!(
                "           QOS_PROFILE_5QI = {}, QOS_PROFILE_PRIORITY_LEVEL = 1, QOS_PROFILE_ARP_PRIORITY_LEVEL = 1, QOS_PROFILE_ARP_PREEMPTCAP = \"NOT_PREEMPT\",",
                sm.qos_profile_5qi
            );
            cfg += format!(
                "           QOS_PROFILE_ARP_PREEMPTVULN = \"NOT_PREEMPTABLE\", SESSION_AMBR_UL = \"20Mbps\", SESSION_AMBR_DL = \"22Mbps\"}}{sep}"
            );
        }
        cfg += "        );";
        cfg += "    };";
        cfg.blank();
        cfg
    }
}

impl Render for SmfParams {
    type Context = PeerEndpoints;
    type Output = ConfigBuilder;

    fn render(&self, peers: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        for line in BANNER {
            cfg += *line;
        }
        cfg.blank();

        cfg += "SMF =";
        cfg += "{";
        cfg += format!("    FQDN          = \"{}\";", self.fqdn());
        cfg += format!(
            "    INSTANCE      = {};         # 0 is the default",
            self.instance
        );
        cfg += format!(
            "    PID_DIRECTORY = \"{}\";  # /var/run is the default",
            self.pid_directory
        );
        cfg.blank();

        cfg += Interfaces(self).render(&());
        cfg += self.dnns.render(&());
        cfg += self.dns.render(&());

        cfg += "    #Default P-CSCF server";
        cfg += format!("    DEFAULT_CSCF_IPV4_ADDRESS = \"{}\";", self.cscf_ipv4_address);
        cfg += format!("    DEFAULT_CSCF_IPV6_ADDRESS = \"{}\";", self.cscf_ipv6_address);
        cfg.blank();

        cfg += "    #Default UE MTU";
        cfg += format!("    UE_MTU = {};", self.ue_mtu);
        cfg.blank();

        cfg += self.features.render(&());

        let sbi_peers = [
            SbiPeer {
                snapshot: &peers.amf,
                ipv4_address: AMF_IPV4_ADDRESS,
                fqdn: AMF_FQDN,
                port: AMF_PORT,
                api_version: AMF_API_VERSION,
            },
            SbiPeer {
                snapshot: &peers.udm,
                ipv4_address: UDM_IPV4_ADDRESS,
                fqdn: UDM_FQDN,
                port: UDM_PORT,
                api_version: UDM_API_VERSION,
            },
            SbiPeer {
                snapshot: &peers.nrf,
                ipv4_address: NRF_IPV4_ADDRESS,
                fqdn: NRF_FQDN,
                port: NRF_PORT,
                api_version: NRF_API_VERSION,
            },
        ];
        for peer in &sbi_peers {
            cfg += peer.render(&());
        }

        cfg += UpfList(&peers.upf).render(&self.upf_network_instance);
        cfg += self.session_management.render(&());
        cfg += "};";
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::PeerKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sbi_peer_absent_values_render_empty() {
        let snapshot = PeerSnapshot::with_values(PeerKind::Nrf, [(NRF_FQDN, "nrf.example.com")]);
        let peer = SbiPeer {
            snapshot: &snapshot,
            ipv4_address: NRF_IPV4_ADDRESS,
            fqdn: NRF_FQDN,
            port: NRF_PORT,
            api_version: NRF_API_VERSION,
        };
        let expected = [
            "    NRF :",
            "    {",
            "      IPV4_ADDRESS = \"\";  # YOUR NRF CONFIG HERE",
            "      PORT         = ;            # YOUR NRF CONFIG HERE (default: 80)",
            "      API_VERSION  = \"\";   # YOUR NRF API VERSION FOR SBI CONFIG HERE",
            "      FQDN         = \"nrf.example.com\"           # YOUR NRF FQDN CONFIG HERE",
            "    };",
            "",
        ]
        .join("\n");
        assert_eq!(peer.render(&()).to_string(), expected);
    }

    #[test]
    fn test_features_render_yes_no() {
        let features = SupportFeatures {
            use_network_instance: true,
            http_version: 2,
            ..SupportFeatures::default()
        };
        let rendered = features.render(&()).to_string();
        assert!(rendered.contains("      HTTP_VERSION = 2;                    # Default: 1"));
        assert!(rendered.contains("      USE_NETWORK_INSTANCE    = \"yes\"   #"));
        assert!(rendered.contains("      ENABLE_USAGE_REPORTING = \"no\"   #"));
    }

    #[test]
    fn test_session_list_separators() {
        let params = SmfParams::new("smf", "core").unwrap();
        let rendered = params.session_management.render(&()).to_string();
        let heads: Vec<&str> = rendered
            .lines()
            .filter(|l| l.contains("NSSAI_SST"))
            .map(|l| &l[..l.find("NSSAI_SD").unwrap()])
            .collect();
        assert_eq!(
            heads,
            vec![
                "         { NSSAI_SST = 1, ",
                "         { NSSAI_SST = 222; ",
                "         { NSSAI_SST = 1; "
            ]
        );
        assert_eq!(rendered.matches("\"22Mbps\"},").count(), 2);
    }
}
