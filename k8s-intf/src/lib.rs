// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Kubernetes objects of the SMF operator and the client to apply them

#![deny(clippy::all, clippy::pedantic)]

#[cfg(feature = "client")]
pub mod client;
pub mod service;

pub use service::{SmfPort, smf_ports, smf_service, smf_service_ports};
