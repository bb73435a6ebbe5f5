//! Default notification policy and downstream fan-out.

use anyhow::Result;
use std::sync::Arc;

use roo_metadata::metadata::{HashTrackingNotifier, MetadataId, MetadataService, SharedItem};
use roo_metadata::test_utils::{CountingProvider, RecordingListener, SimpleItem};

fn id(s: &str) -> MetadataId {
    MetadataId::parse(s).unwrap()
}

#[test]
fn test_source_change_recomputes_once_and_fans_out() -> Result<()> {
    let service = MetadataService::new();
    let eq = CountingProvider::new("Eq");
    let report = CountingProvider::new("Report");
    service.register_provider(eq.clone())?;
    service.register_provider(report.clone())?;
    let listener = RecordingListener::new();
    service.add_notification_listener(listener.clone());

    let foo = id("MID:Eq#Foo");
    let report_foo = id("MID:Report#Foo");
    service.register_dependency(&foo, &report_foo)?;

    let before = service.get(&foo)?.expect("computed");
    assert_eq!(eq.invocations(), 1);
    assert!(service.cached(&foo).is_some());

    eq.set_version(2);
    service.notify(&id("MID:PhysicalType#Foo"), &foo)?;

    assert_eq!(eq.invocations(), 2);
    assert_eq!(report.invocations(), 1);
    let after = service.cached(&foo).expect("recomputed item cached");
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(listener.notifications(), vec![report_foo, foo]);
    Ok(())
}

#[test]
fn test_default_policy_notifies_downstream_exactly_once() -> Result<()> {
    let service = MetadataService::new();
    service.register_provider(CountingProvider::new("Eq"))?;
    let listener = RecordingListener::new();
    service.add_notification_listener(listener.clone());

    let foo = id("MID:Eq#Foo");
    service.notify(&id("MID:PhysicalType#Foo"), &foo)?;

    assert_eq!(listener.notifications(), vec![foo]);
    Ok(())
}

#[test]
fn test_notify_without_provider_is_ignored() -> Result<()> {
    let service = MetadataService::new();
    let listener = RecordingListener::new();
    service.add_notification_listener(listener.clone());

    service.notify(&id("MID:PhysicalType#Foo"), &id("MID:Unknown#Foo"))?;

    assert!(listener.notifications().is_empty());
    Ok(())
}

#[test]
fn test_class_downstream_only_triggers_listeners() -> Result<()> {
    let service = MetadataService::new();
    let eq = CountingProvider::new("Eq");
    service.register_provider(eq.clone())?;
    let listener = RecordingListener::new();
    service.add_notification_listener(listener.clone());

    service.notify(&id("MID:PhysicalType#Foo"), &id("MID:Eq"))?;

    assert_eq!(eq.invocations(), 0);
    assert!(listener.notifications().is_empty());
    Ok(())
}

#[test]
fn test_class_level_edges_reach_instances() -> Result<()> {
    let service = MetadataService::new();
    let eq = CountingProvider::new("Eq");
    let report = CountingProvider::new("Report");
    service.register_provider(eq.clone())?;
    service.register_provider(report.clone())?;

    // Every Report instance depends on Eq metadata in general.
    let report_foo = id("MID:Report#Foo");
    service.register_dependency(&id("MID:Eq"), &report_foo)?;

    service.notify_downstream(&id("MID:Eq#Bar"))?;
    assert_eq!(report.invocations(), 1);
    Ok(())
}

#[test]
fn test_removed_listener_stops_receiving() -> Result<()> {
    let service = MetadataService::new();
    let listener = RecordingListener::new();
    let handle: Arc<dyn roo_metadata::metadata::MetadataNotificationListener> = listener.clone();
    service.add_notification_listener(Arc::clone(&handle));

    service.notify_downstream(&id("MID:Eq#Foo"))?;
    service.remove_notification_listener(&handle);
    service.notify_downstream(&id("MID:Eq#Foo"))?;

    assert_eq!(listener.notifications().len(), 1);
    Ok(())
}

#[test]
fn test_hash_tracking_suppresses_unchanged_items() -> Result<()> {
    let service = MetadataService::new();
    let listener = RecordingListener::new();
    service.add_notification_listener(listener.clone());
    let notifier = HashTrackingNotifier::new(id("MID:Eq"));
    let foo = id("MID:Eq#Foo");

    let v1: SharedItem = Arc::new(SimpleItem::new(foo.clone(), "v1"));
    let v1_again: SharedItem = Arc::new(SimpleItem::new(foo.clone(), "v1"));
    let v2: SharedItem = Arc::new(SimpleItem::new(foo.clone(), "v2"));

    assert!(notifier.notify_if_required(&service, &v1)?);
    assert!(!notifier.notify_if_required(&service, &v1_again)?);
    assert!(notifier.notify_if_required(&service, &v2)?);

    assert_eq!(listener.notifications(), vec![foo.clone(), foo.clone()]);
    assert!(Arc::ptr_eq(&service.cached(&foo).expect("primed"), &v2));
    Ok(())
}
