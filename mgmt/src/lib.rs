// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! SMF management: readiness, reconciliation of the workload and the tasks driving them.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod controller;
mod dispatcher;
mod processor;
mod readiness;
mod status;

pub use controller::{
    ReconcileError, Reconciled, ReconciliationController, SMF_COMMAND, SMF_LAYER_LABEL,
    SMF_SERVICE_NAME, smf_layer,
};
pub use dispatcher::{Dispatcher, Trigger};
pub use processor::configdb::{ConfigDatabase, ConfigMeta, GenId, SmfConfig};
pub use processor::launch::{
    LaunchError, MgmtHandle, MgmtParams, STATUS_UPDATE_INTERVAL, start_mgmt,
};
pub use processor::mgmt_client::{ConfigClient, ConfigProcessorError};
pub use processor::proc::ConfigProcessor;
pub use readiness::{PEERS, Readiness, ReadinessInputs, evaluate};
pub use status::UnitStatus;
