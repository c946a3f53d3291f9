// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command line arguments of the SMF operator

#![deny(clippy::all, clippy::pedantic)]

pub use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracectl::LevelFilter;

/// Default name of the application
pub const DEFAULT_APP_NAME: &str = "oai-5g-smf";

/// Default model (namespace) of the application
pub const DEFAULT_MODEL_NAME: &str = "default";

/// Default directory watched for relation files
pub const DEFAULT_RELATIONS_DIR: &str = "/var/lib/smf-operator/relations";

/// Default host directory holding the workload container filesystem
pub const DEFAULT_WORKLOAD_ROOT: &str = "/var/lib/smf-operator/workload";

#[derive(Debug, Parser)]
#[command(name = "SMF operator")]
#[command(version)]
#[command(about = "Configures and supervises an OAI 5G SMF workload", long_about = None)]
pub struct CmdArgs {
    #[arg(
        long,
        value_name = "NAME",
        default_value = DEFAULT_APP_NAME,
        help = "Name of the application. Also the name of its Kubernetes service"
    )]
    name: String,

    #[arg(
        long,
        value_name = "MODEL",
        default_value = DEFAULT_MODEL_NAME,
        help = "Name of the model (namespace) the application runs in"
    )]
    model: String,

    #[arg(
        long,
        value_name = "DIR",
        default_value = DEFAULT_RELATIONS_DIR,
        help = "Directory watched for relation files (yaml or json). Created if missing"
    )]
    relations_dir: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        default_value = DEFAULT_WORKLOAD_ROOT,
        help = "Host directory holding the filesystem of the workload container"
    )]
    workload_root: PathBuf,

    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = LevelFilter::from_str,
        help = "Default log level, one of [off,error,warn,info,debug,trace]"
    )]
    log_level: LevelFilter,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing directives as a comma-separated sequence of target=level, e.g. info,smf_operator_mgmt=debug.
When not given, the directives in RUST_LOG apply"
    )]
    tracing: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Patch the Kubernetes service of the application with the SMF ports on startup"
    )]
    patch_service: bool,

    #[arg(
        long,
        value_name = "NAMESPACE",
        help = "Kubernetes namespace of the service to patch. Defaults to the model name"
    )]
    namespace: Option<String>,
}

impl CmdArgs {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
    #[must_use]
    pub fn relations_dir(&self) -> &Path {
        &self.relations_dir
    }
    #[must_use]
    pub fn workload_root(&self) -> &Path {
        &self.workload_root
    }
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
    #[must_use]
    pub fn tracing(&self) -> Option<&str> {
        self.tracing.as_deref()
    }
    #[must_use]
    pub fn patch_service(&self) -> bool {
        self.patch_service
    }

    /// The namespace of the Kubernetes service: the one given or else the model name
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.model)
    }
}
