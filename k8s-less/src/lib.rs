// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Support for k8s-less mode where relations are learnt from files

#![deny(clippy::all, clippy::pedantic)]

mod local;

pub use local::{K8sLessError, RelationEvent, kubeless_watch_relations};
