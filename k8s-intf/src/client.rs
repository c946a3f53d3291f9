// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::SmfParams;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use tracing::{debug, info};

use crate::service::smf_service;

/// Field manager of the objects applied by the operator
pub const FIELD_MANAGER: &str = "smf-operator";

#[derive(Debug, thiserror::Error)]
pub enum ServicePatchError {
    #[error("Client error: {0}")]
    ClientError(#[from] kube::Error),
}

/// Apply the SMF ports to the service of the application in `namespace`, with
/// server-side apply.
///
/// # Errors
/// Returns an error if no client can be built or if the apply request fails.
pub async fn patch_service(params: &SmfParams, namespace: &str) -> Result<(), ServicePatchError> {
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        debug!("TLS crypto provider already installed");
    }
    let client = Client::try_default().await?;
    let api: Api<Service> = Api::namespaced(client, namespace);

    let name = params.app_name.as_str();
    let service = smf_service(params, namespace);
    let params = PatchParams::apply(FIELD_MANAGER).force();
    api.patch(name, &params, &Patch::Apply(&service)).await?;
    info!("Patched service {namespace}/{name} with the SMF ports");
    Ok(())
}
