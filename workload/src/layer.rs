// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Service supervisor layers and the plan they merge into

use crate::errors::WorkloadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How a service definition combines with a previous definition of the same service
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Override {
    /// Non-empty fields of the new definition overwrite the old ones
    Merge,
    /// The new definition replaces the old one
    #[default]
    Replace,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Startup {
    Enabled,
    Disabled,
}

/// One supervised service
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Service {
    #[serde(rename = "override", default)]
    pub override_policy: Override,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup: Option<Startup>,
}

impl Service {
    /// Tell if the supervisor starts the service on replan
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.startup == Some(Startup::Enabled)
    }

    fn merge(&mut self, other: &Service) {
        self.override_policy = other.override_policy;
        if !other.summary.is_empty() {
            self.summary.clone_from(&other.summary);
        }
        if !other.command.is_empty() {
            self.command.clone_from(&other.command);
        }
        if other.startup.is_some() {
            self.startup = other.startup;
        }
    }
}

fn combine_services(into: &mut BTreeMap<String, Service>, from: &BTreeMap<String, Service>) {
    for (name, service) in from {
        match (service.override_policy, into.get_mut(name)) {
            (Override::Merge, Some(existing)) => existing.merge(service),
            _ => {
                into.insert(name.clone(), service.clone());
            }
        }
    }
}

/// A fragment of service configuration
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Layer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
}

impl Layer {
    #[must_use]
    pub fn new(summary: &str, description: &str) -> Self {
        Self {
            summary: summary.to_string(),
            description: description.to_string(),
            services: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_service(mut self, name: &str, service: Service) -> Self {
        self.services.insert(name.to_string(), service);
        self
    }

    pub fn to_yaml(&self) -> Result<String, WorkloadError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, WorkloadError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

/// The merge of all layers: what the supervisor runs
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Plan {
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
}

impl Plan {
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn to_yaml(&self) -> Result<String, WorkloadError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct LabeledLayer {
    label: String,
    #[serde(flatten)]
    layer: Layer,
}

/// The ordered set of layers held by a supervisor
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Layers(Vec<LabeledLayer>);

impl Layers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `layer` under `label`. See [`crate::Workload::add_layer`].
    pub fn add(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), WorkloadError> {
        match self.0.iter_mut().find(|l| l.label == label) {
            Some(_) if !combine => Err(WorkloadError::LayerExists(label.to_string())),
            Some(existing) => {
                if !layer.summary.is_empty() {
                    existing.layer.summary.clone_from(&layer.summary);
                }
                if !layer.description.is_empty() {
                    existing.layer.description.clone_from(&layer.description);
                }
                combine_services(&mut existing.layer.services, &layer.services);
                debug!("Combined layer {label}");
                Ok(())
            }
            None => {
                self.0.push(LabeledLayer {
                    label: label.to_string(),
                    layer: layer.clone(),
                });
                debug!("Added layer {label}");
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Layer> {
        self.0.iter().find(|l| l.label == label).map(|l| &l.layer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge all layers, in the order they were added
    #[must_use]
    pub fn plan(&self) -> Plan {
        let mut plan = Plan::default();
        for labeled in &self.0 {
            combine_services(&mut plan.services, &labeled.layer.services);
        }
        plan
    }
}
