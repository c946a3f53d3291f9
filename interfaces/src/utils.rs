// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Utils to build relations from JSON / YAML text files.

use crate::data::{Relation, RelationData, RelationId};
use crate::transport::RelationError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The contents of a relation file: one relation instance and the data the remote
/// application published on it.
///
/// ```yaml
/// name: fiveg-amf
/// id: 3
/// app: amf
/// data:
///   amf_ipv4_address: 1.2.3.4
///   amf_fqdn: amf.example.com
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelationFile {
    pub name: String,
    pub id: RelationId,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub data: RelationData,
}

impl From<RelationFile> for Relation {
    fn from(file: RelationFile) -> Self {
        let mut relation = Relation::new(&file.name, file.id);
        relation.remote_app = file.app;
        relation.remote_app_data = file.data;
        relation
    }
}

/// Read the file at `path` and deserialize it from YAML into a `RelationFile` object.
fn load_relation_from_yaml(path: &Path) -> Result<RelationFile, String> {
    let yaml = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read relation from YAML file ({}): {e}",
            path.display()
        )
    })?;
    serde_yaml_ng::from_str(&yaml).map_err(|e| {
        format!(
            "Failed to deserialize relation from YAML file ({}): {e}",
            path.display()
        )
    })
}

/// Read the file at `path` and deserialize it from JSON into a `RelationFile` object.
fn load_relation_from_json(path: &Path) -> Result<RelationFile, String> {
    let json = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read relation from JSON file ({}): {e}",
            path.display()
        )
    })?;
    serde_json::from_str(&json).map_err(|e| {
        format!(
            "Failed to deserialize relation from JSON file ({}): {e}",
            path.display()
        )
    })
}

/// Read the file at `path` and deserialize into a `RelationFile` object.
/// The file is assumed to contain a relation in JSON or YAML, as told by its extension.
///
/// # Errors
/// This function may fail if the file does not exist or cannot be opened / read, or if the contents
/// cannot be deserialized.
pub fn load_relation_from_file(path: &Path) -> Result<RelationFile, RelationError> {
    let ext = path.extension();
    match ext {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            load_relation_from_yaml(path)
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_relation_from_json(path),
        Some(ext) => Err(format!("Unsupported file extension {}", ext.display())),
        None => Err("Missing file extension".to_string()),
    }
    .map_err(RelationError::Load)
}
