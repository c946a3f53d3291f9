// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("Cannot connect to workload container")]
    CannotConnect,
    #[error("Invalid path in workload container: {0}")]
    InvalidPath(String),
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml_ng::Error),
    #[error("Layer {0} already exists")]
    LayerExists(String),
    #[error("Failed to start service {service}: {source}")]
    Spawn {
        service: String,
        #[source]
        source: std::io::Error,
    },
}

impl WorkloadError {
    pub(crate) fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}
