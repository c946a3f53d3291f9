// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Start of the management thread

use crate::controller::ReconciliationController;
use crate::dispatcher::Dispatcher;
use crate::processor::k8s_less_client::K8sLess;
use crate::processor::proc::ConfigProcessor;
use config::SmfParams;
use interfaces::PeerAvailable;
use k8s_less::K8sLessError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use workload::{LocalWorkload, WorkloadError};

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Failed to open workload: {0}")]
    WorkloadError(#[from] WorkloadError),
    #[error("Config processor exited prematurely")]
    PrematureProcessorExit,
    #[error("Error starting/waiting for Config Processor task: {0}")]
    ProcessorJoinError(tokio::task::JoinError),
    #[error("Error in k8s-less mode: {0}")]
    K8LessError(#[from] K8sLessError),
    #[error("Management thread panicked")]
    Panicked,
}

/// Interval at which deferred triggers get another chance
pub const STATUS_UPDATE_INTERVAL: Duration = Duration::from_secs(15);

pub struct MgmtParams {
    /// Directory where relation files are dropped
    pub relations_dir: PathBuf,
    /// Host directory holding the workload filesystem
    pub workload_root: PathBuf,
    pub smf_params: SmfParams,
    pub status_interval: Duration,
    /// Namespace of the Kubernetes service to patch, if any. The service is named after
    /// the application.
    pub service_patch: Option<String>,
}

impl MgmtParams {
    #[must_use]
    pub fn new(relations_dir: PathBuf, workload_root: PathBuf, smf_params: SmfParams) -> Self {
        Self {
            relations_dir,
            workload_root,
            smf_params,
            status_interval: STATUS_UPDATE_INTERVAL,
            service_patch: None,
        }
    }
}

async fn log_peer_events(mut rx: broadcast::Receiver<PeerAvailable>) {
    loop {
        match rx.recv().await {
            Ok(event) => info!(
                "{} available on relation {}: {}",
                event.peer(),
                event.relation_id,
                event
                    .endpoint
                    .fields()
                    .map(|(field, value)| format!("{field}={value}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            Err(RecvError::Lagged(missed)) => warn!("Missed {missed} peer events"),
            Err(RecvError::Closed) => break,
        }
    }
}

async fn run_mgmt(params: MgmtParams, shutdown: oneshot::Receiver<()>) -> Result<(), LaunchError> {
    if let Some(namespace) = &params.service_patch {
        let name = &params.smf_params.app_name;
        debug!("Patching kubernetes service {namespace}/{name}...");
        if let Err(e) = k8s_intf::client::patch_service(&params.smf_params, namespace).await {
            error!("Failed to patch kubernetes service {namespace}/{name}: {e}");
        }
    }

    let workload = LocalWorkload::new(&params.workload_root)?;
    let controller = ReconciliationController::new(params.smf_params, workload);
    let dispatcher = Dispatcher::new(controller);
    let peer_rx = dispatcher.subscribe();
    let (processor, client) = ConfigProcessor::new(dispatcher, params.status_interval);
    let k8sless = Arc::new(K8sLess::new(&params.relations_dir, client));

    let mut processor_handle = tokio::spawn(processor.run());
    tokio::spawn(log_peer_events(peer_rx));

    tokio::select! {
        _ = shutdown => {
            info!("Stopping management");
            Ok(())
        }
        result = K8sLess::start_relation_watch(k8sless) => {
            result.inspect_err(|e| error!("Relation watch failed: {e}"))?;
            Ok(())
        }
        result = &mut processor_handle => {
            match result {
                Ok(()) => {
                    error!("Configuration processor task exited unexpectedly");
                    Err(LaunchError::PrematureProcessorExit)
                }
                Err(e) => Err(LaunchError::ProcessorJoinError(e)),
            }
        }
    }
}

/// The running management thread
pub struct MgmtHandle {
    thread: std::thread::JoinHandle<Result<(), LaunchError>>,
    shutdown: oneshot::Sender<()>,
}

impl MgmtHandle {
    /// Tell if the management thread ended on its own
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    fn join(thread: std::thread::JoinHandle<Result<(), LaunchError>>) -> Result<(), LaunchError> {
        thread.join().map_err(|_| LaunchError::Panicked)?
    }

    /// Wait for the management thread to end
    pub fn wait(self) -> Result<(), LaunchError> {
        Self::join(self.thread)
    }

    /// Ask the management thread to stop and wait for it. The workload, and the services it
    /// runs, are stopped before this returns.
    pub fn stop(self) -> Result<(), LaunchError> {
        if self.shutdown.send(()).is_err() {
            debug!("Management thread already ended");
        }
        Self::join(self.thread)
    }
}

/// Start the management thread: the config processor and the relation watcher.
pub fn start_mgmt(params: MgmtParams) -> Result<MgmtHandle, std::io::Error> {
    let (shutdown, shutdown_rx) = oneshot::channel();
    let thread = std::thread::Builder::new()
        .name("mgmt".to_string())
        .spawn(move || {
            debug!("Starting SMF management thread");

            /* create tokio runtime */
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .enable_time()
                .build()
                .map_err(LaunchError::IoError)?;

            warn!("Running in k8s-less mode....");
            let result = rt.block_on(run_mgmt(params, shutdown_rx));
            // dropping the runtime drops the tasks, and with them the workload
            drop(rt);
            debug!("SMF management thread ended");
            result
        })?;
    Ok(MgmtHandle { thread, shutdown })
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::SmfParams;

    #[test]
    fn test_mgmt_stops_on_request() {
        let relations = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let smf_params = SmfParams::new("oai-5g-smf", "5g-core").unwrap();
        let params = MgmtParams::new(
            relations.path().to_path_buf(),
            root.path().to_path_buf(),
            smf_params,
        );

        let handle = start_mgmt(params).unwrap();
        std::thread::sleep(Duration::from_millis(300));
        assert!(!handle.is_finished());
        assert!(handle.stop().is_ok());
    }

    #[test]
    fn test_mgmt_fails_on_bad_relations_dir() {
        let root = tempfile::tempdir().unwrap();
        // a file where the relations directory should be
        let relations = root.path().join("relations");
        std::fs::write(&relations, "").unwrap();
        let smf_params = SmfParams::new("oai-5g-smf", "5g-core").unwrap();
        let params = MgmtParams::new(relations, root.path().to_path_buf(), smf_params);

        let handle = start_mgmt(params).unwrap();
        assert!(matches!(handle.wait(), Err(LaunchError::K8LessError(_))));
        assert!(!root.path().join(".supervisor").exists());
    }
}
