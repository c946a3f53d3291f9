// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Serializes the triggers the operator reacts to and hands them to the controller.

use crate::controller::{ReconcileError, Reconciled, ReconciliationController};
use interfaces::utils::RelationFile;
use interfaces::{
    PeerAvailable, PeerEndpointView, PeerKind, Relation, RelationId, RelationStore,
    RelationTransport,
};
use std::collections::VecDeque;
use std::fmt::Display;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use workload::Workload;

/// Capacity of the peer-available notification channel
const PEER_EVENTS_CAPACITY: usize = 16;

/// Something that may require the workload to be reconciled
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// The fixed configuration changed, or the operator just started
    ConfigChanged,
    /// Relation instance `id` of endpoint `name` was created or its data changed
    RelationChanged { name: String, id: RelationId },
    /// Relation instance `id` of endpoint `name` was removed
    RelationBroken { name: String, id: RelationId },
    /// Periodic tick. Only gives deferred triggers another chance.
    UpdateStatus,
}

impl Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::ConfigChanged => write!(f, "config-changed"),
            Trigger::RelationChanged { name, id } => write!(f, "{name}-relation-changed ({id})"),
            Trigger::RelationBroken { name, id } => write!(f, "{name}-relation-broken ({id})"),
            Trigger::UpdateStatus => write!(f, "update-status"),
        }
    }
}

/// Owns the relation store and the controller. Triggers that could not be handled
/// because the workload was unreachable are kept and redelivered, in order, before
/// every subsequent trigger.
pub struct Dispatcher<W: Workload> {
    store: RelationStore,
    controller: ReconciliationController<W>,
    deferred: VecDeque<Trigger>,
    peer_tx: broadcast::Sender<PeerAvailable>,
}

impl<W: Workload> Dispatcher<W> {
    #[must_use]
    pub fn new(controller: ReconciliationController<W>) -> Self {
        let (peer_tx, _) = broadcast::channel(PEER_EVENTS_CAPACITY);
        Self {
            store: RelationStore::new(),
            controller,
            deferred: VecDeque::new(),
            peer_tx,
        }
    }

    /// Receive a [`PeerAvailable`] notification every time a peer publishes all of its fields
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PeerAvailable> {
        self.peer_tx.subscribe()
    }

    #[must_use]
    pub fn store(&self) -> &RelationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RelationStore {
        &mut self.store
    }

    #[must_use]
    pub fn controller(&self) -> &ReconciliationController<W> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ReconciliationController<W> {
        &mut self.controller
    }

    /// Triggers waiting to be redelivered
    #[must_use]
    pub fn deferred(&self) -> &VecDeque<Trigger> {
        &self.deferred
    }

    /// Store the relation described by `file` and return the trigger for it
    pub fn learn_relation(&mut self, file: RelationFile) -> Trigger {
        let relation = Relation::from(file);
        let trigger = Trigger::RelationChanged {
            name: relation.name.clone(),
            id: relation.id,
        };
        if PeerKind::from_relation_name(&relation.name).is_none() {
            warn!("Relation {relation} is not a peer relation");
        }
        self.store.upsert(relation);
        trigger
    }

    /// Remove relation instance `id` of endpoint `name` and return the trigger for it
    pub fn forget_relation(&mut self, name: &str, id: RelationId) -> Trigger {
        if self.store.remove_relation(name, id).is_none() {
            warn!("Relation {name} ({id}) was not known");
        }
        Trigger::RelationBroken {
            name: name.to_string(),
            id,
        }
    }

    /// Defer `trigger` unless an identical one is already waiting
    fn defer(&mut self, trigger: Trigger) {
        if self.deferred.contains(&trigger) {
            debug!("{trigger} is already deferred");
        } else {
            debug!("Deferring {trigger}");
            self.deferred.push_back(trigger);
        }
    }

    fn notify_peer(&self, name: &str, id: RelationId) {
        let Some(peer) = PeerKind::from_relation_name(name) else {
            return;
        };
        let Some(relation) = self.store.relation_by_id(name, id) else {
            warn!("Relation {name} ({id}) is gone");
            return;
        };
        if let Some(event) = PeerEndpointView::new(&self.store, peer).on_relation_changed(relation) {
            info!("Triggering {} event", peer.event_name());
            // no subscriber is fine
            let _ = self.peer_tx.send(event);
        }
    }

    fn handle(&mut self, trigger: &Trigger) -> Result<Option<Reconciled>, ReconcileError> {
        debug!("Handling {trigger}");
        match trigger {
            Trigger::UpdateStatus => return Ok(None),
            Trigger::RelationChanged { name, id } => self.notify_peer(name, *id),
            Trigger::ConfigChanged | Trigger::RelationBroken { .. } => {}
        }
        self.controller.reconcile(&self.store).map(Some)
    }

    fn redeliver(&mut self) {
        let pending = std::mem::take(&mut self.deferred);
        for trigger in pending {
            match self.handle(&trigger) {
                Ok(Some(Reconciled::Retry)) => self.defer(trigger),
                Ok(_) => debug!("Redelivered {trigger}"),
                Err(e) => error!("Failed to handle deferred {trigger}: {e}"),
            }
        }
    }

    /// Redeliver the deferred triggers, then handle `trigger`. A trigger for which
    /// the controller asks to retry is deferred, unless an identical trigger is already
    /// deferred. [`Trigger::UpdateStatus`] only redelivers: it returns `None`.
    pub fn dispatch(&mut self, trigger: Trigger) -> Result<Option<Reconciled>, ReconcileError> {
        self.redeliver();
        let reconciled = self.handle(&trigger)?;
        if reconciled == Some(Reconciled::Retry) {
            self.defer(trigger);
        }
        Ok(reconciled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::SmfParams;
    use interfaces::RelationData;
    use pretty_assertions::assert_eq;
    use workload::MemoryWorkload;

    fn dispatcher() -> Dispatcher<MemoryWorkload> {
        let params = SmfParams::new("oai-5g-smf", "5g-core").unwrap();
        Dispatcher::new(ReconciliationController::new(params, MemoryWorkload::new()))
    }

    #[test]
    fn test_learn_relation_upserts() {
        let mut dispatcher = dispatcher();
        let mut data = RelationData::new();
        data.insert("upf_ipv4_address", "1.2.3.4");
        let file = RelationFile {
            name: "fiveg-upf".to_string(),
            id: RelationId(7),
            app: Some("upf".to_string()),
            data,
        };
        let trigger = dispatcher.learn_relation(file.clone());
        assert_eq!(
            trigger,
            Trigger::RelationChanged {
                name: "fiveg-upf".to_string(),
                id: RelationId(7)
            }
        );
        dispatcher.learn_relation(file);
        assert_eq!(dispatcher.store().relations("fiveg-upf").len(), 1);
    }

    #[test]
    fn test_forget_relation_removes() {
        let mut dispatcher = dispatcher();
        let file = RelationFile {
            name: "fiveg-upf".to_string(),
            id: RelationId(7),
            app: Some("upf".to_string()),
            data: RelationData::new(),
        };
        dispatcher.learn_relation(file);
        assert_eq!(
            dispatcher.forget_relation("fiveg-upf", RelationId(7)),
            Trigger::RelationBroken {
                name: "fiveg-upf".to_string(),
                id: RelationId(7)
            }
        );
        assert!(!dispatcher.store().relation_created("fiveg-upf"));
        // forgetting twice only warns
        dispatcher.forget_relation("fiveg-upf", RelationId(7));
        assert!(dispatcher.store().relations("fiveg-upf").is_empty());
    }

    #[test]
    fn test_trigger_display() {
        assert_eq!(Trigger::ConfigChanged.to_string(), "config-changed");
        assert_eq!(
            Trigger::RelationChanged {
                name: "fiveg-nrf".to_string(),
                id: RelationId(2)
            }
            .to_string(),
            "fiveg-nrf-relation-changed (2)"
        );
        assert_eq!(
            Trigger::RelationBroken {
                name: "fiveg-udm".to_string(),
                id: RelationId(3)
            }
            .to_string(),
            "fiveg-udm-relation-broken (3)"
        );
    }
}
