// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! In-memory relation store

use crate::data::{Relation, RelationData, RelationId};
use crate::transport::{RelationError, RelationTransport};
use std::collections::BTreeMap;
use tracing::debug;

/// Keeps all relation instances known to this application, grouped by endpoint name.
/// Relation ids are unique across endpoints.
#[derive(Clone, Debug, Default)]
pub struct RelationStore {
    relations: BTreeMap<String, Vec<Relation>>,
    next_id: u32,
}

impl RelationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a relation instance for endpoint `name`, optionally already bound to a remote
    /// application, and return its id.
    pub fn add_relation(&mut self, name: &str, remote_app: Option<&str>) -> RelationId {
        let id = RelationId(self.next_id);
        self.next_id += 1;
        let mut relation = Relation::new(name, id);
        relation.remote_app = remote_app.map(str::to_string);
        debug!("Created relation {relation}");
        self.relations.entry(name.to_string()).or_default().push(relation);
        id
    }

    /// Insert a relation instance or replace the one with the same endpoint name and id.
    /// This application's data on an existing relation is preserved.
    pub fn upsert(&mut self, mut relation: Relation) {
        self.next_id = self.next_id.max(relation.id.0.saturating_add(1));
        let instances = self.relations.entry(relation.name.clone()).or_default();
        if let Some(existing) = instances.iter_mut().find(|r| r.id == relation.id) {
            relation.local_app_data = std::mem::take(&mut existing.local_app_data);
            debug!("Updated relation {relation}");
            *existing = relation;
        } else {
            debug!("Created relation {relation}");
            instances.push(relation);
        }
    }

    fn relation_mut(&mut self, name: &str, id: RelationId) -> Result<&mut Relation, RelationError> {
        self.relations
            .get_mut(name)
            .and_then(|instances| instances.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| RelationError::RelationNotReady {
                relation: name.to_string(),
                id,
            })
    }

    /// Merge `data` into the remote application's data of a relation instance. A field
    /// set to the empty string is removed.
    pub fn update_remote_app_data(
        &mut self,
        name: &str,
        id: RelationId,
        data: &RelationData,
    ) -> Result<(), RelationError> {
        let relation = self.relation_mut(name, id)?;
        for (field, value) in data.entries() {
            if value.is_empty() {
                relation.remote_app_data.remove(field);
            } else {
                relation.remote_app_data.insert(field, value);
            }
        }
        Ok(())
    }

    /// Remove a relation instance, returning it if it existed.
    pub fn remove_relation(&mut self, name: &str, id: RelationId) -> Option<Relation> {
        let instances = self.relations.get_mut(name)?;
        let index = instances.iter().position(|r| r.id == id)?;
        let relation = instances.remove(index);
        if instances.is_empty() {
            self.relations.remove(name);
        }
        debug!("Removed relation {relation}");
        Some(relation)
    }

    /// All relation instances for endpoint `name`
    #[must_use]
    pub fn relations(&self, name: &str) -> &[Relation] {
        self.relations.get(name).map_or(&[], Vec::as_slice)
    }
}

impl RelationTransport for RelationStore {
    fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations(name).first()
    }

    fn relation_by_id(&self, name: &str, id: RelationId) -> Option<&Relation> {
        self.relations(name).iter().find(|r| r.id == id)
    }

    fn set_local_app_data(
        &mut self,
        name: &str,
        id: RelationId,
        data: RelationData,
    ) -> Result<(), RelationError> {
        self.relation_mut(name, id)?.local_app_data = data;
        Ok(())
    }
}
