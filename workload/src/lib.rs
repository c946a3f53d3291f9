// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The workload container the SMF runs in, seen from the operator.
//!
//! The operator needs to push files into the container and to tell the service
//! supervisor of the container what to run. Services are described with [`Layer`]s;
//! the supervisor merges all layers it holds into a [`Plan`] and starts the services
//! of the plan when asked to [`Workload::replan`].

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod errors;
mod layer;
mod local;
#[cfg(any(test, feature = "testing"))]
mod memory;

pub use errors::WorkloadError;
pub use layer::{Layer, Layers, Override, Plan, Service, Startup};
pub use local::LocalWorkload;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryWorkload;

/// Access to a workload container and its service supervisor
pub trait Workload {
    /// Tell if the container can be reached. Nothing else should be attempted if it cannot.
    fn can_connect(&self) -> bool;

    /// Write `content` to `path` in the container, replacing any previous file.
    /// Missing parent directories are created.
    fn push(&mut self, path: &str, content: &str) -> Result<(), WorkloadError>;

    /// Read the file at `path` in the container
    fn pull(&self, path: &str) -> Result<String, WorkloadError>;

    /// Tell if a file exists at `path` in the container
    fn exists(&self, path: &str) -> Result<bool, WorkloadError>;

    /// Add a layer to the supervisor. With `combine`, a layer with the same label is merged
    /// with the new one; otherwise an existing label is an error.
    fn add_layer(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), WorkloadError>;

    /// (Re)start the services of the plan that are enabled at startup and that either
    /// changed or are not running.
    fn replan(&mut self) -> Result<(), WorkloadError>;

    /// The plan resulting from all the layers held by the supervisor
    fn plan(&self) -> Plan;

    /// Tell if `service` is running
    fn is_running(&mut self, service: &str) -> bool;
}
