// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A workload whose container filesystem is a directory of the host, supervised locally.

use crate::errors::WorkloadError;
use crate::layer::{Layer, Layers, Plan, Service};
use crate::Workload;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, error, info, warn};

/// Directory, relative to the root, where the supervisor keeps its state
const STATE_DIR: &str = ".supervisor";
const LAYERS_FILE: &str = "layers.yaml";
const SERVICES_FILE: &str = "services.yaml";

/// A service process, as recorded in the state directory
#[derive(Debug, Deserialize, Serialize)]
struct ServiceRecord {
    pid: u32,
    service: Service,
}

enum Process {
    /// Started by this supervisor
    Child(Child),
    /// Left running by a previous supervisor of the same root
    Adopted(u32),
}

struct RunningService {
    definition: Service,
    process: Process,
}

/// Tell if process `pid` is alive and runs `command`
fn runs_command(pid: u32, command: &str) -> bool {
    let Ok(cmdline) = fs::read(format!("/proc/{pid}/cmdline")) else {
        return false;
    };
    let args = cmdline
        .split(|byte| *byte == 0)
        .filter(|arg| !arg.is_empty())
        .map(String::from_utf8_lossy);
    args.eq(command.split_whitespace())
}

impl RunningService {
    fn pid(&self) -> u32 {
        match &self.process {
            Process::Child(child) => child.id(),
            Process::Adopted(pid) => *pid,
        }
    }

    fn is_alive(&mut self) -> bool {
        match &mut self.process {
            Process::Child(child) => matches!(child.try_wait(), Ok(None)),
            Process::Adopted(pid) => runs_command(*pid, &self.definition.command),
        }
    }

    fn record(&self) -> ServiceRecord {
        ServiceRecord {
            pid: self.pid(),
            service: self.definition.clone(),
        }
    }
}

/// Workload rooted at a host directory.
///
/// Container paths are resolved under the root. Layers are persisted under the root so that
/// a restarted operator finds the plan it left. Services are started as child processes of
/// the operator and killed when the workload is dropped. Their pids are persisted too: the
/// processes a previous supervisor left behind are adopted when the workload is reopened.
pub struct LocalWorkload {
    root: PathBuf,
    layers: Layers,
    running: BTreeMap<String, RunningService>,
}

impl LocalWorkload {
    /// Open the workload rooted at `root`, loading any persisted layers.
    pub fn new(root: &Path) -> Result<Self, WorkloadError> {
        let mut workload = Self {
            root: root.to_path_buf(),
            layers: Layers::new(),
            running: BTreeMap::new(),
        };
        let layers_path = workload.layers_path();
        match fs::read_to_string(&layers_path) {
            Ok(yaml) => {
                workload.layers = serde_yaml_ng::from_str(&yaml)?;
                info!(
                    "Loaded {} layer(s) from {}",
                    workload.layers.len(),
                    layers_path.display()
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(WorkloadError::io(layers_path.display(), e)),
        }
        workload.adopt_services()?;
        Ok(workload)
    }

    /// Adopt the services recorded by a previous supervisor that are still running
    fn adopt_services(&mut self) -> Result<(), WorkloadError> {
        let services_path = self.services_path();
        let records: BTreeMap<String, ServiceRecord> = match fs::read_to_string(&services_path) {
            Ok(yaml) => serde_yaml_ng::from_str(&yaml)?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(WorkloadError::io(services_path.display(), e)),
        };
        for (name, record) in records {
            if !runs_command(record.pid, &record.service.command) {
                debug!("Service {name} (pid {}) is gone", record.pid);
                continue;
            }
            info!("Adopted service {name} (pid {})", record.pid);
            self.running.insert(
                name,
                RunningService {
                    definition: record.service,
                    process: Process::Adopted(record.pid),
                },
            );
        }
        self.persist_services()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn layers_path(&self) -> PathBuf {
        self.root.join(STATE_DIR).join(LAYERS_FILE)
    }

    fn services_path(&self) -> PathBuf {
        self.root.join(STATE_DIR).join(SERVICES_FILE)
    }

    /// Map a container path to the host. Paths must be absolute and may not walk up.
    fn host_path(&self, path: &str) -> Result<PathBuf, WorkloadError> {
        let path = Path::new(path);
        if !path.is_absolute() {
            return Err(WorkloadError::InvalidPath(path.display().to_string()));
        }
        let mut host = self.root.clone();
        for component in path.components() {
            match component {
                Component::RootDir => {}
                Component::Normal(part) => host.push(part),
                _ => return Err(WorkloadError::InvalidPath(path.display().to_string())),
            }
        }
        Ok(host)
    }

    /// Write `content` to `target` through a temporary file in the same directory
    fn write_atomic(target: &Path, content: &[u8]) -> Result<(), WorkloadError> {
        let dir = target
            .parent()
            .ok_or_else(|| WorkloadError::InvalidPath(target.display().to_string()))?;
        fs::create_dir_all(dir).map_err(|e| WorkloadError::io(dir.display(), e))?;

        let name = target
            .file_name()
            .ok_or_else(|| WorkloadError::InvalidPath(target.display().to_string()))?;
        let tmp = dir.join(format!(".{}.tmp", name.to_string_lossy()));
        fs::write(&tmp, content).map_err(|e| WorkloadError::io(tmp.display(), e))?;
        fs::rename(&tmp, target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            WorkloadError::io(target.display(), e)
        })
    }

    fn persist_layers(&self) -> Result<(), WorkloadError> {
        let yaml = serde_yaml_ng::to_string(&self.layers)?;
        Self::write_atomic(&self.layers_path(), yaml.as_bytes())
    }

    fn persist_services(&self) -> Result<(), WorkloadError> {
        let records: BTreeMap<&String, ServiceRecord> = self
            .running
            .iter()
            .map(|(name, running)| (name, running.record()))
            .collect();
        let yaml = serde_yaml_ng::to_string(&records)?;
        Self::write_atomic(&self.services_path(), yaml.as_bytes())
    }

    fn spawn(&self, name: &str, service: &Service) -> Result<Child, WorkloadError> {
        let spawn_error = |source| WorkloadError::Spawn {
            service: name.to_string(),
            source,
        };
        let mut words = service.command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| spawn_error(std::io::Error::new(ErrorKind::InvalidInput, "empty command")))?;
        Command::new(program)
            .args(words)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .spawn()
            .map_err(spawn_error)
    }

    fn stop(name: &str, mut running: RunningService) {
        if !running.is_alive() {
            debug!("Service {name} already exited");
            return;
        }
        match running.process {
            Process::Child(mut child) => match child.kill() {
                Ok(()) => {
                    let _ = child.wait();
                    info!("Stopped service {name}");
                }
                Err(e) => warn!("Failed to stop service {name}: {e}"),
            },
            Process::Adopted(pid) => {
                let Ok(raw) = i32::try_from(pid) else {
                    warn!("Invalid pid {pid} for service {name}");
                    return;
                };
                match kill(Pid::from_raw(raw), Signal::SIGKILL) {
                    Ok(()) => info!("Stopped adopted service {name} (pid {pid})"),
                    Err(e) => warn!("Failed to stop adopted service {name} (pid {pid}): {e}"),
                }
            }
        }
    }
}

impl Workload for LocalWorkload {
    fn can_connect(&self) -> bool {
        self.root.is_dir()
    }

    fn push(&mut self, path: &str, content: &str) -> Result<(), WorkloadError> {
        let target = self.host_path(path)?;
        Self::write_atomic(&target, content.as_bytes())?;
        debug!("Pushed {} bytes to {path}", content.len());
        Ok(())
    }

    fn pull(&self, path: &str) -> Result<String, WorkloadError> {
        let source = self.host_path(path)?;
        fs::read_to_string(&source).map_err(|e| WorkloadError::io(path, e))
    }

    fn exists(&self, path: &str) -> Result<bool, WorkloadError> {
        let target = self.host_path(path)?;
        target.try_exists().map_err(|e| WorkloadError::io(path, e))
    }

    fn add_layer(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), WorkloadError> {
        self.layers.add(label, layer, combine)?;
        self.persist_layers()
    }

    fn replan(&mut self) -> Result<(), WorkloadError> {
        let plan = self.plan();

        /* stop services that were removed, disabled or redefined */
        let stale: Vec<String> = self
            .running
            .iter()
            .filter(|(name, running)| {
                plan.service(name)
                    .is_none_or(|service| !service.is_enabled() || *service != running.definition)
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in stale {
            if let Some(running) = self.running.remove(&name) {
                Self::stop(&name, running);
            }
        }

        for (name, service) in plan.services.iter().filter(|(_, s)| s.is_enabled()) {
            if self.is_running(name) {
                continue;
            }
            if let Some(exited) = self.running.remove(name) {
                Self::stop(name, exited);
            }
            let spawned = self.spawn(name, service).inspect_err(|e| error!("{e}"));
            let child = match spawned {
                Ok(child) => child,
                Err(e) => {
                    self.persist_services()?;
                    return Err(e);
                }
            };
            info!("Started service {name} (pid {})", child.id());
            self.running.insert(
                name.clone(),
                RunningService {
                    definition: service.clone(),
                    process: Process::Child(child),
                },
            );
        }
        self.persist_services()
    }

    fn plan(&self) -> Plan {
        self.layers.plan()
    }

    fn is_running(&mut self, service: &str) -> bool {
        self.running.get_mut(service).is_some_and(RunningService::is_alive)
    }
}

impl Drop for LocalWorkload {
    fn drop(&mut self) {
        if self.running.is_empty() {
            return;
        }
        for (name, running) in std::mem::take(&mut self.running) {
            Self::stop(&name, running);
        }
        if let Err(e) = self.persist_services() {
            warn!("Failed to record stopped services: {e}");
        }
    }
}
