// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Global tracing setup.
//!
//! A single subscriber is installed for the process: a fmt layer filtered by an
//! [`EnvFilter`]. The filter is built from a default level plus optional directives
//! (`target=level,...`). When no directives are given, those of `RUST_LOG` apply.

use thiserror::Error;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Error, PartialEq)]
pub enum TraceCtlError {
    #[error("Invalid tracing directives '{0}': {1}")]
    InvalidDirectives(String, String),
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Build a filter from a default level and optional directives. Without directives, the
/// directives of the `RUST_LOG` environment variable, if any, are used.
pub fn build_filter(default: LevelFilter, directives: Option<&str>) -> Result<EnvFilter, TraceCtlError> {
    let builder = EnvFilter::builder().with_default_directive(default.into());
    match directives {
        Some(directives) => builder
            .parse(directives)
            .map_err(|e| TraceCtlError::InvalidDirectives(directives.to_string(), e.to_string())),
        None => Ok(builder.from_env_lossy()),
    }
}

/// Install the global subscriber. Fails if a global subscriber is already installed.
pub fn init_logging(default: LevelFilter, directives: Option<&str>) -> Result<(), TraceCtlError> {
    let filter = build_filter(default, directives)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| TraceCtlError::SubscriberInit(e.to_string()))?;
    info!("Tracing initialized with default level {default}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_filter_with_directives() {
        let filter = build_filter(LevelFilter::WARN, Some("smf_operator_mgmt=debug")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_build_filter_rejects_bad_directives() {
        let err = build_filter(LevelFilter::INFO, Some("mgmt=verbose")).unwrap_err();
        assert!(matches!(err, TraceCtlError::InvalidDirectives(d, _) if d == "mgmt=verbose"));
    }

    #[test]
    fn test_init_logging_once() {
        assert!(matches!(
            init_logging(LevelFilter::INFO, Some("smf=loud")),
            Err(TraceCtlError::InvalidDirectives(..))
        ));
        assert_eq!(init_logging(LevelFilter::INFO, Some("info")), Ok(()));
        assert!(matches!(
            init_logging(LevelFilter::INFO, None),
            Err(TraceCtlError::SubscriberInit(_))
        ));
    }
}
