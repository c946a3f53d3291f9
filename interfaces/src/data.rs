// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Relation data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Identifier of a relation instance
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RelationId(pub u32);

impl Display for RelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RelationId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// The data one application exposes on its side of a relation: a flat map from
/// field name to string value. Fields are independent of each other: any of them
/// may be present or absent at any time.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RelationData(BTreeMap<String, String>);

impl RelationData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Tell if a field is present and has a non-empty value.
    #[must_use]
    pub fn is_available(&self, field: &str) -> bool {
        self.get(field).is_some_and(|value| !value.is_empty())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RelationData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for RelationData {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self(value)
    }
}

/// One relation instance between this application and exactly one remote application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub id: RelationId,
    pub name: String,
    /// Name of the remote application; `None` until the remote side has joined.
    pub remote_app: Option<String>,
    pub remote_app_data: RelationData,
    pub local_app_data: RelationData,
}

impl Relation {
    #[must_use]
    pub fn new(name: &str, id: RelationId) -> Self {
        Self {
            id,
            name: name.to_string(),
            remote_app: None,
            remote_app_data: RelationData::new(),
            local_app_data: RelationData::new(),
        }
    }

    /// The data published by the remote application, if a remote application is bound.
    #[must_use]
    pub fn remote_data(&self) -> Option<&RelationData> {
        self.remote_app.as_ref().map(|_| &self.remote_app_data)
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} (remote app: {})",
            self.name,
            self.id,
            self.remote_app.as_deref().unwrap_or("--")
        )
    }
}
