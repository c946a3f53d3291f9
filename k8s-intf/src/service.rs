// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The Kubernetes service exposing the SMF

use config::SmfParams;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Label selecting the pods of the application
pub const APP_NAME_LABEL: &str = "app.kubernetes.io/name";

/// A port exposed by the SMF
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SmfPort {
    pub name: &'static str,
    pub port: u16,
    pub protocol: &'static str,
}

/// N4 (PFCP), SBI over HTTP/1 and SBI over HTTP/2, on the ports the SMF is configured with
#[must_use]
pub fn smf_ports(params: &SmfParams) -> [SmfPort; 3] {
    [
        SmfPort {
            name: "oai-smf",
            port: params.n4_port,
            protocol: "UDP",
        },
        SmfPort {
            name: "http1",
            port: params.sbi_port,
            protocol: "TCP",
        },
        SmfPort {
            name: "http2",
            port: params.sbi_http2_port,
            protocol: "TCP",
        },
    ]
}

impl From<&SmfPort> for ServicePort {
    fn from(port: &SmfPort) -> Self {
        ServicePort {
            name: Some(port.name.to_string()),
            port: i32::from(port.port),
            protocol: Some(port.protocol.to_string()),
            target_port: Some(IntOrString::Int(i32::from(port.port))),
            ..Default::default()
        }
    }
}

#[must_use]
pub fn smf_service_ports(params: &SmfParams) -> Vec<ServicePort> {
    smf_ports(params).iter().map(ServicePort::from).collect()
}

/// The service of the application in `namespace`, exposing the SMF ports
#[must_use]
pub fn smf_service(params: &SmfParams, namespace: &str) -> Service {
    let name = &params.app_name;
    Service {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(smf_service_ports(params)),
            selector: Some(BTreeMap::from([(
                APP_NAME_LABEL.to_string(),
                name.clone(),
            )])),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
