// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use inotify::{Event, EventMask, Inotify, WatchMask};
use interfaces::RelationId;
use interfaces::utils::{RelationFile, load_relation_from_file};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use tokio::fs::{create_dir_all, read_dir};
use tokio::io::unix::AsyncFd;

#[allow(unused)]
use tracing::{debug, error, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum K8sLessError {
    #[error("Failed to create directory '{0}': {1}")]
    CreateDir(String, std::io::Error),
    #[error("Failed to read directory '{0}': {1}")]
    ReadDir(String, std::io::Error),
    #[error("Inotify error: {0}")]
    Inotify(std::io::Error),
    #[error("Failed to add watch for path {0}: {1}")]
    Watch(String, std::io::Error),
    #[error("K8sless exited early")]
    EarlyTermination,
}

/// What happened to a relation described by a file
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelationEvent {
    /// A relation file was written
    Changed(RelationFile),
    /// The file describing relation `id` of endpoint `name` was removed
    Removed { name: String, id: RelationId },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FileChange {
    Written,
    Removed,
}

/// The relation each loaded file describes
type KnownFiles = BTreeMap<PathBuf, (String, RelationId)>;

/// Tell if a file name is worth loading. Some editors create '.swp/.swx' (e.g. nano)
/// files or temporary hidden files (vi) when editing a file instead of modifying it in-place.
fn is_relation_file(filename: &str) -> bool {
    !(filename.contains(".sw") || filename.starts_with('.'))
}

fn file_change(mask: EventMask) -> Option<FileChange> {
    if mask.contains(EventMask::ISDIR) {
        None
    } else if mask.intersects(EventMask::CLOSE_WRITE | EventMask::MOVED_TO) {
        Some(FileChange::Written)
    } else if mask.intersects(EventMask::DELETE | EventMask::MOVED_FROM) {
        Some(FileChange::Removed)
    } else {
        None
    }
}

/// Tell if an event reported by `Inotify` is worth checking. Returns the path of the file
/// and what happened to it, or `None` if the event should be ignored.
fn check_event(event: &Event<&OsStr>, dir: &Path) -> Option<(PathBuf, FileChange)> {
    // we watch a directory; so `Inotify` should report the name of a file.
    let filename = event.name?.to_str()?;
    if !is_relation_file(filename) {
        return None;
    }
    let change = file_change(event.mask)?;
    Some((dir.join(filename), change))
}

async fn load_and_call(
    file: &Path,
    known: &mut KnownFiles,
    callback: &impl AsyncFn(RelationEvent),
) {
    debug!("Processing file {}...", file.display());
    let relation = match load_relation_from_file(file) {
        Ok(relation) => relation,
        Err(e) => {
            error!("Failed to load relation from file: {e}");
            return;
        }
    };
    let identity = (relation.name.clone(), relation.id);
    if let Some(previous) = known.insert(file.to_path_buf(), identity.clone())
        && previous != identity
    {
        debug!("File {} now describes another relation", file.display());
        let (name, id) = previous;
        callback(RelationEvent::Removed { name, id }).await;
    }
    callback(RelationEvent::Changed(relation)).await;
}

async fn forget_and_call(
    file: &Path,
    known: &mut KnownFiles,
    callback: &impl AsyncFn(RelationEvent),
) {
    match known.remove(file) {
        Some((name, id)) => {
            debug!("File {} was removed", file.display());
            callback(RelationEvent::Removed { name, id }).await;
        }
        None => debug!("Ignoring removal of {}: no relation was loaded from it", file.display()),
    }
}

/// The relation files already present in `path`, sorted by name
async fn existing_files(path: &Path) -> Result<BTreeSet<PathBuf>, K8sLessError> {
    let read_error = |e| K8sLessError::ReadDir(path.display().to_string(), e);
    let mut entries = read_dir(path).await.map_err(read_error)?;
    let mut files = BTreeSet::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
        let name = entry.file_name();
        if is_file && name.to_str().is_some_and(is_relation_file) {
            files.insert(entry.path());
        }
    }
    Ok(files)
}

/// Watch for relation files in the directory `path`. If the directory does not exist,
/// it gets created. Files already in the directory are loaded first, in name order.
/// Then, every time a file is written in (or moved into) the directory:
///    - read its contents (assumed to contain a relation in yaml or json)
///    - deserialize them into a `RelationFile`
///    - call the caller-specified callback with [`RelationEvent::Changed`].
///
/// When a file that was loaded is deleted or moved out of the directory, the callback
/// gets [`RelationEvent::Removed`] for the relation it described.
///
/// Files that cannot be loaded are logged and skipped. This function only returns on error.
///
/// # Errors
/// Returns an error if the directory or the corresponding watch cannot be created.
pub async fn kubeless_watch_relations(
    path: &Path,
    callback: impl AsyncFn(RelationEvent),
) -> Result<(), K8sLessError> {
    create_dir_all(path)
        .await
        .map_err(|e| K8sLessError::CreateDir(path.display().to_string(), e))?;

    let mut inotify = Inotify::init().map_err(K8sLessError::Inotify)?;
    inotify
        .watches()
        .add(
            path,
            WatchMask::CLOSE_WRITE | WatchMask::MOVED_TO | WatchMask::DELETE | WatchMask::MOVED_FROM,
        )
        .map_err(|e| K8sLessError::Watch(path.display().to_string(), e))?;

    let async_fd = AsyncFd::new(inotify.as_raw_fd()).map_err(K8sLessError::Inotify)?;

    let mut known = KnownFiles::new();
    for file in existing_files(path).await? {
        load_and_call(&file, &mut known, &callback).await;
    }

    debug!("Starting kubeless watcher for directory '{}'...", path.display());
    loop {
        trace!("Waiting for changes...");
        let Ok(mut guard) = async_fd.readable().await else {
            error!("Failure checking async fd readiness");
            continue;
        };

        let mut buffer = [0u8; 4096];
        match inotify.read_events(&mut buffer) {
            Ok(events) => {
                // collapse all events by filename: the last change of each file wins
                let mut changes = BTreeMap::new();
                for (file, change) in events.filter_map(|e| check_event(&e, path)) {
                    changes.insert(file, change);
                }
                for (file, change) in &changes {
                    match change {
                        FileChange::Written => load_and_call(file, &mut known, &callback).await,
                        FileChange::Removed => forget_and_call(file, &mut known, &callback).await,
                    }
                }
            }
            Err(e) => error!("Failed to read events from file: {e}"),
        }
        guard.clear_ready();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tracing_test::traced_test;

    #[test]
    fn test_relation_file_names() {
        assert!(is_relation_file("amf.yaml"));
        assert!(!is_relation_file(".amf.yaml"));
        assert!(!is_relation_file("amf.yaml.swp"));
    }

    #[test]
    fn test_file_changes() {
        assert_eq!(file_change(EventMask::CLOSE_WRITE), Some(FileChange::Written));
        assert_eq!(file_change(EventMask::MOVED_TO), Some(FileChange::Written));
        assert_eq!(file_change(EventMask::DELETE), Some(FileChange::Removed));
        assert_eq!(file_change(EventMask::MOVED_FROM), Some(FileChange::Removed));
        assert_eq!(file_change(EventMask::DELETE | EventMask::ISDIR), None);
        assert_eq!(file_change(EventMask::MODIFY), None);
    }

    /// Run the watcher on `path` until `count` events are received
    async fn watch_events(path: &Path, count: usize) -> Vec<RelationEvent> {
        let (tx, mut rx) = mpsc::channel(8);
        let watcher = kubeless_watch_relations(path, async |event| {
            tx.send(event).await.unwrap();
        });
        let received = async {
            let mut events = vec![];
            while events.len() < count {
                events.push(rx.recv().await.unwrap());
            }
            events
        };
        tokio::select! {
            result = watcher => panic!("Watcher exited: {result:?}"),
            () = tokio::time::sleep(Duration::from_secs(10)) => panic!("Timed out"),
            events = received => events,
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_kubeless_relations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relations");

        // a relation present before the watch starts
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(
            path.join("nrf.json"),
            r#"{"name": "fiveg-nrf", "id": 1, "app": "nrf"}"#,
        )
        .unwrap();

        // create files in the watched directory after a while
        let writer_path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            std::fs::write(writer_path.join("0-broken.yaml"), "name: [").unwrap();
            std::fs::write(writer_path.join(".hidden.yaml"), "name: fiveg-udm\nid: 9\n").unwrap();
            let yaml = "
name: fiveg-amf
id: 2
app: amf
data:
  amf_fqdn: amf.example.com
";
            std::fs::write(writer_path.join("amf.yaml"), yaml).unwrap();
        });

        let events = watch_events(&path, 2).await;
        let [RelationEvent::Changed(first), RelationEvent::Changed(second)] = events.as_slice()
        else {
            panic!("Unexpected events: {events:?}");
        };
        assert_eq!(first.name, "fiveg-nrf");
        assert_eq!(first.id, RelationId(1));
        assert_eq!(second.name, "fiveg-amf");
        assert_eq!(second.data.get("amf_fqdn"), Some("amf.example.com"));
        assert!(logs_contain("Failed to load relation from file"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_kubeless_relation_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("upf.yaml"), "name: fiveg-upf\nid: 3\napp: upf\n").unwrap();
        std::fs::write(path.join("nrf.yaml"), "name: fiveg-nrf\nid: 4\napp: nrf\n").unwrap();

        let remover_path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            // never loaded: no event
            std::fs::write(remover_path.join("junk.yaml"), "name: [").unwrap();
            std::fs::remove_file(remover_path.join("junk.yaml")).unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            std::fs::remove_file(remover_path.join("upf.yaml")).unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            let outside = tempfile::tempdir().unwrap();
            std::fs::rename(remover_path.join("nrf.yaml"), outside.path().join("nrf.yaml"))
                .unwrap();
        });

        let events = watch_events(&path, 4).await;
        assert!(matches!(&events[0], RelationEvent::Changed(r) if r.name == "fiveg-nrf"));
        assert!(matches!(&events[1], RelationEvent::Changed(r) if r.name == "fiveg-upf"));
        assert_eq!(
            events[2..],
            [
                RelationEvent::Removed {
                    name: "fiveg-upf".to_string(),
                    id: RelationId(3)
                },
                RelationEvent::Removed {
                    name: "fiveg-nrf".to_string(),
                    id: RelationId(4)
                },
            ]
        );
    }
}
