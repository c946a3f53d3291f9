// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use smf_operator_mgmt as mgmt;

use config::{SmfParams, config_file_path};
use interfaces::utils::RelationFile;
use interfaces::{PeerKind, RelationData, RelationId};
use mgmt::{
    ConfigProcessor, ConfigProcessorError, Dispatcher, Reconciled, ReconciliationController,
    Trigger, UnitStatus,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use workload::MemoryWorkload;

fn relation_file(peer: &str, id: u32, with_port: bool) -> RelationFile {
    let mut data = RelationData::new();
    data.insert(format!("{peer}_ipv4_address"), "1.2.3.4");
    data.insert(format!("{peer}_fqdn"), format!("{peer}.example.com"));
    if with_port {
        data.insert(format!("{peer}_port"), "81");
        data.insert(format!("{peer}_api_version"), "v1");
    }
    RelationFile {
        name: format!("fiveg-{peer}"),
        id: RelationId(id),
        app: Some(peer.to_string()),
        data,
    }
}

fn all_relation_files() -> Vec<RelationFile> {
    vec![
        relation_file("amf", 0, true),
        relation_file("upf", 1, false),
        relation_file("nrf", 2, true),
        relation_file("udm", 3, true),
    ]
}

fn dispatcher() -> Dispatcher<MemoryWorkload> {
    let params = SmfParams::new("oai-5g-smf", "5g-core").unwrap();
    Dispatcher::new(ReconciliationController::new(params, MemoryWorkload::new()))
}

#[test]
fn test_unreachable_workload_defers_triggers() {
    let mut dispatcher = dispatcher();
    dispatcher
        .controller_mut()
        .workload_mut()
        .set_can_connect(false);

    assert_eq!(
        dispatcher.dispatch(Trigger::ConfigChanged).unwrap(),
        Some(Reconciled::Retry)
    );
    let mut triggers = vec![Trigger::ConfigChanged];
    for file in all_relation_files() {
        let trigger = dispatcher.learn_relation(file);
        triggers.push(trigger.clone());
        assert_eq!(dispatcher.dispatch(trigger).unwrap(), Some(Reconciled::Retry));
    }
    assert_eq!(dispatcher.deferred().iter().cloned().collect::<Vec<_>>(), triggers);

    /* still unreachable: everything is deferred again, in order */
    assert_eq!(dispatcher.dispatch(Trigger::UpdateStatus).unwrap(), None);
    assert_eq!(dispatcher.deferred().iter().cloned().collect::<Vec<_>>(), triggers);
    assert_eq!(dispatcher.controller().workload().pushes(), 0);
}

#[test]
fn test_deferred_triggers_are_redelivered_first() {
    let mut dispatcher = dispatcher();
    for file in all_relation_files() {
        dispatcher.learn_relation(file);
    }
    dispatcher
        .controller_mut()
        .workload_mut()
        .set_can_connect(false);
    dispatcher.dispatch(Trigger::ConfigChanged).unwrap();
    assert_eq!(dispatcher.deferred().len(), 1);

    dispatcher
        .controller_mut()
        .workload_mut()
        .set_can_connect(true);
    assert_eq!(dispatcher.dispatch(Trigger::UpdateStatus).unwrap(), None);
    assert!(dispatcher.deferred().is_empty());
    assert_eq!(dispatcher.controller().status(), &UnitStatus::Active);
    assert_eq!(dispatcher.controller().workload().pushes(), 1);
    assert!(
        dispatcher
            .controller()
            .workload()
            .file(&config_file_path())
            .is_some()
    );
}

#[test]
fn test_gated_triggers_are_not_deferred() {
    let mut dispatcher = dispatcher();
    let trigger = dispatcher.learn_relation(relation_file("amf", 0, true));
    assert_eq!(dispatcher.dispatch(trigger).unwrap(), Some(Reconciled::Gated));
    assert!(dispatcher.deferred().is_empty());
    assert_eq!(
        dispatcher.controller().status(),
        &UnitStatus::Blocked("Waiting for relation to UPF to be created".to_string())
    );
}

#[test]
fn test_identical_triggers_are_deferred_once() {
    let mut dispatcher = dispatcher();
    dispatcher
        .controller_mut()
        .workload_mut()
        .set_can_connect(false);

    let amf = relation_file("amf", 0, true);
    for _ in 0..3 {
        dispatcher.dispatch(Trigger::ConfigChanged).unwrap();
        let trigger = dispatcher.learn_relation(amf.clone());
        assert_eq!(dispatcher.dispatch(trigger).unwrap(), Some(Reconciled::Retry));
    }
    assert_eq!(
        dispatcher.deferred().iter().cloned().collect::<Vec<_>>(),
        vec![
            Trigger::ConfigChanged,
            Trigger::RelationChanged {
                name: "fiveg-amf".to_string(),
                id: RelationId(0)
            }
        ]
    );

    /* redelivery keeps them unique too */
    dispatcher.dispatch(Trigger::UpdateStatus).unwrap();
    dispatcher.dispatch(Trigger::ConfigChanged).unwrap();
    assert_eq!(dispatcher.deferred().len(), 2);
}

#[test]
fn test_removed_relation_blocks_again() {
    let mut dispatcher = dispatcher();
    for file in all_relation_files() {
        let trigger = dispatcher.learn_relation(file);
        dispatcher.dispatch(trigger).unwrap();
    }
    assert_eq!(dispatcher.controller().status(), &UnitStatus::Active);
    let genid = dispatcher.controller().applied_generation();

    let trigger = dispatcher.forget_relation("fiveg-upf", RelationId(1));
    assert_eq!(dispatcher.dispatch(trigger).unwrap(), Some(Reconciled::Gated));
    assert_eq!(
        dispatcher.controller().status(),
        &UnitStatus::Blocked("Waiting for relation to UPF to be created".to_string())
    );
    // the last applied configuration stays in place
    assert_eq!(dispatcher.controller().applied_generation(), genid);
    assert_eq!(dispatcher.controller().workload().pushes(), 1);

    let trigger = dispatcher.learn_relation(relation_file("upf", 1, false));
    assert_eq!(dispatcher.dispatch(trigger).unwrap(), Some(Reconciled::Applied));
    assert_eq!(dispatcher.controller().status(), &UnitStatus::Active);
}

#[test]
fn test_peer_available_notifications() {
    let mut dispatcher = dispatcher();
    let mut rx = dispatcher.subscribe();

    /* incomplete AMF data: no notification */
    let trigger = dispatcher.learn_relation(relation_file("amf", 0, false));
    dispatcher.dispatch(trigger).unwrap();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    let trigger = dispatcher.learn_relation(relation_file("amf", 0, true));
    dispatcher.dispatch(trigger).unwrap();
    let event = rx.try_recv().unwrap();
    assert_eq!(event.peer(), PeerKind::Amf);
    assert_eq!(event.relation_id, RelationId(0));
    assert_eq!(event.endpoint.get("amf_port"), Some("81"));

    /* notifications are not for config-changed */
    dispatcher.dispatch(Trigger::ConfigChanged).unwrap();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_no_subscriber_is_fine() {
    let mut dispatcher = dispatcher();
    let mut last = None;
    for file in all_relation_files() {
        let trigger = dispatcher.learn_relation(file);
        last = dispatcher.dispatch(trigger).unwrap();
    }
    assert_eq!(last, Some(Reconciled::Applied));
}

#[tokio::test]
async fn test_config_processor() {
    let (processor, client) = ConfigProcessor::new(dispatcher(), Duration::from_secs(3600));
    let handle = tokio::spawn(processor.run());

    assert!(matches!(
        client.get_generation().await,
        Err(ConfigProcessorError::NoConfigApplied)
    ));
    assert_eq!(
        client.get_status().await.unwrap(),
        UnitStatus::Blocked("Waiting for relation to AMF to be created".to_string())
    );

    let mut outcomes = vec![];
    for file in all_relation_files() {
        outcomes.push(client.learn_relation(file).await.unwrap());
    }
    assert_eq!(
        outcomes,
        vec![
            Some(Reconciled::Gated),
            Some(Reconciled::Gated),
            Some(Reconciled::Gated),
            Some(Reconciled::Applied)
        ]
    );
    assert_eq!(client.get_status().await.unwrap(), UnitStatus::Active);
    assert_eq!(client.get_generation().await.unwrap(), 1);

    assert_eq!(
        client.forget_relation("fiveg-nrf", RelationId(2)).await.unwrap(),
        Some(Reconciled::Gated)
    );
    assert_eq!(
        client.get_status().await.unwrap(),
        UnitStatus::Blocked("Waiting for relation to NRF to be created".to_string())
    );
    assert_eq!(client.get_generation().await.unwrap(), 1);

    drop(client);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
