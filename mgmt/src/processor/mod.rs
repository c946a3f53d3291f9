// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! SMF configuration processor.
//! This module keeps track of the rendered configurations and runs the task that
//! serializes every reconciliation.

pub(crate) mod configdb;
mod display;
pub(crate) mod k8s_less_client;
pub(crate) mod launch;
pub(crate) mod mgmt_client;
pub(crate) mod proc;
