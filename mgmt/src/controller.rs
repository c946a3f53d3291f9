// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The reconciliation controller: drives the workload towards the configuration
//! implied by the current peer endpoints.

use crate::processor::configdb::{ConfigDatabase, GenId};
use crate::readiness::{Readiness, ReadinessInputs, evaluate};
use crate::status::UnitStatus;
use config::{PeerEndpoints, RenderError, SmfParams, config_file_path, render_smf_config};
use interfaces::RelationTransport;
use thiserror::Error;
use tracing::{debug, error, info};
use workload::{Layer, Override, Service, Startup, Workload, WorkloadError};

/// Label of the supervisor layer of the SMF
pub const SMF_LAYER_LABEL: &str = "smf";

/// Name of the SMF service in the supervisor
pub const SMF_SERVICE_NAME: &str = "smf";

/// Command starting the SMF
pub const SMF_COMMAND: &str = "/openair-smf/bin/oai_smf -c /openair-smf/etc/smf.conf -o";

/// The supervisor layer running the SMF
#[must_use]
pub fn smf_layer() -> Layer {
    Layer::new("smf layer", "pebble config layer for smf").with_service(
        SMF_SERVICE_NAME,
        Service {
            override_policy: Override::Replace,
            summary: "smf".to_string(),
            command: SMF_COMMAND.to_string(),
            startup: Some(Startup::Enabled),
        },
    )
}

/// The outcome of a reconciliation
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reconciled {
    /// The workload could not be reached: the trigger should be retried later
    Retry,
    /// A relation or some peer data is missing. Nothing was done.
    Gated,
    /// The configuration was pushed and the SMF (re)planned
    Applied,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to render configuration: {0}")]
    Render(#[from] RenderError),
    #[error("Workload error: {0}")]
    Workload(#[from] WorkloadError),
}

/// Owns the SMF parameters and the workload, and reconciles the latter with the
/// peer endpoints read from a relation transport.
pub struct ReconciliationController<W: Workload> {
    params: SmfParams,
    workload: W,
    status: UnitStatus,
    configdb: ConfigDatabase,
}

impl<W: Workload> ReconciliationController<W> {
    #[must_use]
    pub fn new(params: SmfParams, workload: W) -> Self {
        debug!("Building reconciliation controller for {}", params.fqdn());
        Self {
            params,
            workload,
            status: UnitStatus::default(),
            configdb: ConfigDatabase::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> &UnitStatus {
        &self.status
    }

    #[must_use]
    pub fn params(&self) -> &SmfParams {
        &self.params
    }

    #[must_use]
    pub fn workload(&self) -> &W {
        &self.workload
    }

    pub fn workload_mut(&mut self) -> &mut W {
        &mut self.workload
    }

    #[must_use]
    pub fn configdb(&self) -> &ConfigDatabase {
        &self.configdb
    }

    fn set_status(&mut self, status: UnitStatus) {
        if self.status != status {
            info!("Status: {status}");
        }
        self.status = status;
    }

    /// Reconcile the workload with the peer endpoints found in `transport`.
    ///
    /// Nothing is written to the workload unless the workload is reachable, every peer
    /// relation exists and every peer published all of its fields. On error, the status
    /// is left unchanged.
    pub fn reconcile<T: RelationTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<Reconciled, ReconcileError> {
        let inputs = ReadinessInputs::from_transport(self.workload.can_connect(), transport);
        let readiness = evaluate(&inputs);
        debug!("Readiness: {readiness}");
        match readiness {
            Readiness::Ready => {}
            Readiness::WorkloadUnreachable => {
                self.set_status(readiness.status());
                return Ok(Reconciled::Retry);
            }
            Readiness::RelationMissing(_) | Readiness::PeerDataIncomplete(_) => {
                self.set_status(readiness.status());
                return Ok(Reconciled::Gated);
            }
        }

        let peers = PeerEndpoints::from_transport(transport);
        let content = render_smf_config(&self.params, &peers)
            .inspect_err(|e| error!("Failed to render configuration: {e}"))?;
        let genid = self.configdb.learn(&content);

        match self.apply(&content) {
            Ok(()) => {
                self.configdb.mark_applied(genid);
                info!("Config for generation {genid} was successfully applied");
                debug!("\n{}", self.configdb);
                self.set_status(UnitStatus::Active);
                Ok(Reconciled::Applied)
            }
            Err(e) => {
                error!("Failed to apply the config for generation {genid}: {e}");
                self.configdb.mark_failed(genid, &e.to_string());
                Err(e.into())
            }
        }
    }

    fn apply(&mut self, content: &str) -> Result<(), WorkloadError> {
        self.workload.push(&config_file_path(), content)?;
        self.workload.add_layer(SMF_LAYER_LABEL, &smf_layer(), true)?;
        self.workload.replan()
    }

    /// Tell if the configuration file is present in the workload
    #[must_use]
    pub fn config_file_is_pushed(&self) -> bool {
        let path = config_file_path();
        match self.workload.exists(&path) {
            Ok(true) => {
                info!("Config file is written: {path}");
                true
            }
            Ok(false) => {
                info!("Config file is not written: {path}");
                false
            }
            Err(e) => {
                info!("Config file is not written: {path}: {e}");
                false
            }
        }
    }

    /// Generation of the configuration currently applied, if any
    #[must_use]
    pub fn applied_generation(&self) -> Option<GenId> {
        self.configdb.get_current_gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::RelationStore;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;
    use workload::MemoryWorkload;

    fn controller() -> ReconciliationController<MemoryWorkload> {
        let params = SmfParams::new("oai-5g-smf", "5g-core").unwrap();
        ReconciliationController::new(params, MemoryWorkload::new())
    }

    #[test]
    fn test_smf_layer_yaml() {
        let yaml = smf_layer().to_yaml().unwrap();
        assert!(yaml.contains("summary: smf layer"));
        assert!(yaml.contains("command: /openair-smf/bin/oai_smf -c /openair-smf/etc/smf.conf -o"));
        assert!(yaml.contains("override: replace"));
        assert!(yaml.contains("startup: enabled"));
    }

    #[traced_test]
    #[test]
    fn test_config_file_is_pushed_logs() {
        let mut controller = controller();
        assert!(!controller.config_file_is_pushed());
        assert!(logs_contain("Config file is not written: /openair-smf/etc/smf.conf"));

        controller
            .workload_mut()
            .push(&config_file_path(), "content")
            .unwrap();
        assert!(controller.config_file_is_pushed());
        assert!(logs_contain("Config file is written: /openair-smf/etc/smf.conf"));
    }

    #[traced_test]
    #[test]
    fn test_status_change_is_logged() {
        let mut controller = controller();
        let result = controller.reconcile(&RelationStore::new()).unwrap();
        assert_eq!(result, Reconciled::Gated);
        assert!(logs_contain(
            "Status: blocked: Waiting for relation to AMF to be created"
        ));
    }
}
