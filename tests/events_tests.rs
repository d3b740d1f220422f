//! Tests for list events shared between screens

use futures::StreamExt;
use hrms::prelude::*;
use std::sync::Arc;

fn controller(entity: &str, records: Vec<Value>, bus: &ListEventBus) -> ListController {
    let config = ClientConfig::default_config();
    let source = InMemoryCollectionSource::new(entity)
        .with_records(records.into_iter().map(|r| Record::from_value(r).unwrap()));
    ListController::new(config.entity(entity).unwrap().clone(), Arc::new(source))
        .unwrap()
        .with_events(bus.clone())
}

#[tokio::test]
async fn test_one_subscriber_sees_every_screen() {
    let bus = ListEventBus::default();
    let applicants = controller(
        "applicant",
        vec![json!({"_id": "app1", "fullName": "John Smith"})],
        &bus,
    );
    let requests = controller(
        "vacancyRequest",
        vec![json!({"_id": "r1", "position": "Clerk", "status": "pending"})],
        &bus,
    );
    let stream = bus.subscribe_stream();

    applicants.refresh().await.unwrap();
    requests.refresh().await.unwrap();
    requests.update_status("r1", "approved").await.unwrap();

    let events: Vec<ListEvent> = stream
        .take(3)
        .map(|item| item.unwrap().event)
        .collect()
        .await;

    assert_eq!(events[0].entity(), "applicant");
    assert_eq!(events[1].entity(), "vacancyRequest");
    assert!(matches!(
        &events[2],
        ListEvent::Updated { id, .. } if id == "r1"
    ));
}

#[test]
fn test_events_without_runtime_subscriber() {
    let bus = ListEventBus::new(4);
    let employees = controller("employee", Vec::new(), &bus);
    let mut rx = bus.subscribe();

    tokio_test::block_on(async {
        employees.refresh().await.unwrap();
    });
    employees.set_filter(FilterKind::Search, "smith");

    let first = rx.try_recv().unwrap();
    assert!(matches!(first.event, ListEvent::Loaded { count: 0, .. }));
    let second = rx.try_recv().unwrap();
    assert!(matches!(second.event, ListEvent::FiltersChanged { visible: 0, .. }));
}

#[tokio::test]
async fn test_failures_are_serializable_for_the_ui() {
    let bus = ListEventBus::default();
    let applicants = controller("applicant", Vec::new(), &bus);
    let mut rx = bus.subscribe();

    let _ = applicants.update_status("app1", "hired").await;
    let envelope = rx.recv().await.unwrap();
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["event"]["action"], "failed");
    assert_eq!(json["event"]["code"], "VALIDATION_ERROR");
}
