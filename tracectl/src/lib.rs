// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Crate to set up tracing for the operator

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod control;

// re-exports
pub use control::{TraceCtlError, build_filter, init_logging};
pub use tracing_subscriber::filter::LevelFilter;
