// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of the SMF workload: local parameters, peer endpoints and the renderer
//! producing `smf.conf` from both.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod params;
mod peers;
pub mod renderer;

pub use params::{
    DnsAddresses, Dnn, NetworkInstance, SessionManagement, SmfParams, SmfParamsBuilder,
    SmfParamsBuilderError, SupportFeatures,
};
pub use peers::PeerEndpoints;
pub use renderer::render_smf_config;

use thiserror::Error;

/// Directory of the configuration file inside the workload container
pub const CONFIG_DIR: &str = "/openair-smf/etc";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "smf.conf";

/// Full path of the configuration file inside the workload container
#[must_use]
pub fn config_file_path() -> String {
    format!("{CONFIG_DIR}/{CONFIG_FILE_NAME}")
}

/// Errors raised while rendering the configuration file
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RenderError {
    #[error("Failed to format configuration: {0}")]
    Template(#[from] std::fmt::Error),
}
