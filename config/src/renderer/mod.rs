// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Renderer of the SMF configuration file

pub mod builder;
mod smf;

use crate::RenderError;
use crate::params::SmfParams;
use crate::peers::PeerEndpoints;
use builder::Render;
use std::fmt::Write;
use tracing::debug;

/// Render the complete `smf.conf` from the local parameters and the endpoints of the peers.
/// The output does not end with a newline. Absent peer values render as empty strings.
pub fn render_smf_config(params: &SmfParams, peers: &PeerEndpoints) -> Result<String, RenderError> {
    let cfg = params.render(peers);
    let mut out = String::new();
    write!(out, "{cfg}")?;
    debug!("Rendered SMF config: {} lines, {} bytes", cfg.len(), out.len());
    Ok(out)
}
