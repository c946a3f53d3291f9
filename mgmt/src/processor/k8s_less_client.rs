// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::controller::Reconciled;
use crate::processor::mgmt_client::{ConfigClient, ConfigProcessorError};
use k8s_less::{K8sLessError, RelationEvent, kubeless_watch_relations};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Feeds the config processor with the relations found in a directory
pub struct K8sLess {
    pathdir: PathBuf,
    client: ConfigClient,
}

impl K8sLess {
    #[must_use]
    pub fn new(pathdir: &Path, client: ConfigClient) -> Self {
        Self {
            pathdir: pathdir.to_path_buf(),
            client,
        }
    }

    /// Watch the relations directory. Only returns on error.
    pub async fn start_relation_watch(k8sless: Arc<Self>) -> Result<(), K8sLessError> {
        info!(
            "Starting relation watcher for directory {}",
            k8sless.pathdir.display()
        );

        kubeless_watch_relations(&k8sless.pathdir.clone(), async move |event| {
            match k8sless.client.get_generation().await {
                Ok(genid) => info!("Current configuration is {genid}"),
                Err(ConfigProcessorError::NoConfigApplied) => info!("No configuration applied yet"),
                Err(e) => {
                    error!("Failed to get current config generation: {e}");
                    return;
                }
            }

            // request the config processor to reconcile with the new relation data
            let (name, id, result) = match event {
                RelationEvent::Changed(relation) => {
                    let (name, id) = (relation.name.clone(), relation.id);
                    info!("Learnt relation {name}:{id} from file");
                    (name, id, k8sless.client.learn_relation(relation).await)
                }
                RelationEvent::Removed { name, id } => {
                    info!("Relation {name}:{id} was removed");
                    let result = k8sless.client.forget_relation(&name, id).await;
                    (name, id, result)
                }
            };
            match result {
                Ok(Some(Reconciled::Applied)) => info!("Config was applied after {name}:{id} changed"),
                Ok(Some(Reconciled::Retry)) => info!("Workload not reachable: {name}:{id} deferred"),
                Ok(_) => info!("Config not applied after {name}:{id} changed"),
                Err(e) => error!("Failed to handle relation {name}:{id}: {e}"),
            }
        })
        .await?;

        Err(K8sLessError::EarlyTermination)
    }
}
