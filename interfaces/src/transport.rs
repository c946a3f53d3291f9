// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Access to relation data

use crate::data::{Relation, RelationData, RelationId};
use crate::peer::PeerKind;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RelationError {
    #[error("Relation {relation} with id {id} not created yet")]
    RelationNotReady { relation: String, id: RelationId },
    #[error("Missing {field} in {peer} information")]
    MissingField { peer: PeerKind, field: &'static str },
    #[error("Failed to load relation: {0}")]
    Load(String),
}

/// The capability to read and write relation data. Implementations deliver the
/// remote applications' data and accept this application's own data.
pub trait RelationTransport {
    /// The first relation instance for endpoint `name`, if any was created.
    fn relation(&self, name: &str) -> Option<&Relation>;

    /// The relation instance `id` for endpoint `name`, if it exists.
    fn relation_by_id(&self, name: &str, id: RelationId) -> Option<&Relation>;

    /// Replace this application's data on relation instance `id` for endpoint `name`.
    ///
    /// # Errors
    /// Fails with [`RelationError::RelationNotReady`] if the relation instance does not exist.
    fn set_local_app_data(
        &mut self,
        name: &str,
        id: RelationId,
        data: RelationData,
    ) -> Result<(), RelationError>;

    /// Tell if a relation for endpoint `name` was created.
    fn relation_created(&self, name: &str) -> bool {
        self.relation(name).is_some()
    }
}
