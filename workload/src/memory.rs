// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! In-memory workload for tests

use crate::errors::WorkloadError;
use crate::layer::{Layer, Layers, Plan, Service};
use crate::Workload;
use std::collections::BTreeMap;

/// Records everything done to it. Services "run" as soon as they are replanned and
/// are only "started" again when their definition changes.
#[derive(Debug)]
pub struct MemoryWorkload {
    connected: bool,
    fail_pushes: bool,
    files: BTreeMap<String, String>,
    layers: Layers,
    running: BTreeMap<String, Service>,
    pushes: usize,
    replans: usize,
    starts: usize,
}

impl Default for MemoryWorkload {
    fn default() -> Self {
        Self {
            connected: true,
            fail_pushes: false,
            files: BTreeMap::new(),
            layers: Layers::new(),
            running: BTreeMap::new(),
            pushes: 0,
            replans: 0,
            starts: 0,
        }
    }
}

impl MemoryWorkload {
    /// A reachable, empty workload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_can_connect(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make every subsequent push fail with an IO error
    pub fn set_fail_pushes(&mut self, fail: bool) {
        self.fail_pushes = fail;
    }

    #[must_use]
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Number of successful pushes
    #[must_use]
    pub fn pushes(&self) -> usize {
        self.pushes
    }

    /// Number of replans
    #[must_use]
    pub fn replans(&self) -> usize {
        self.replans
    }

    /// Number of times a service was (re)started by a replan
    #[must_use]
    pub fn starts(&self) -> usize {
        self.starts
    }

    fn check_connected(&self) -> Result<(), WorkloadError> {
        if self.connected {
            Ok(())
        } else {
            Err(WorkloadError::CannotConnect)
        }
    }
}

impl Workload for MemoryWorkload {
    fn can_connect(&self) -> bool {
        self.connected
    }

    fn push(&mut self, path: &str, content: &str) -> Result<(), WorkloadError> {
        self.check_connected()?;
        if self.fail_pushes {
            return Err(WorkloadError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "push refused"),
            ));
        }
        self.files.insert(path.to_string(), content.to_string());
        self.pushes += 1;
        Ok(())
    }

    fn pull(&self, path: &str) -> Result<String, WorkloadError> {
        self.check_connected()?;
        self.files.get(path).cloned().ok_or_else(|| {
            WorkloadError::io(path, std::io::Error::from(std::io::ErrorKind::NotFound))
        })
    }

    fn exists(&self, path: &str) -> Result<bool, WorkloadError> {
        self.check_connected()?;
        Ok(self.files.contains_key(path))
    }

    fn add_layer(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), WorkloadError> {
        self.check_connected()?;
        self.layers.add(label, layer, combine)
    }

    fn replan(&mut self) -> Result<(), WorkloadError> {
        self.check_connected()?;
        let wanted: BTreeMap<String, Service> = self
            .plan()
            .services
            .into_iter()
            .filter(|(_, service)| service.is_enabled())
            .collect();
        self.starts += wanted
            .iter()
            .filter(|(name, service)| self.running.get(*name) != Some(*service))
            .count();
        self.running = wanted;
        self.replans += 1;
        Ok(())
    }

    fn plan(&self) -> Plan {
        self.layers.plan()
    }

    fn is_running(&mut self, service: &str) -> bool {
        self.running.contains_key(service)
    }
}
