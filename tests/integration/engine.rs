//! Retrieval, caching and dependency registration through the service.

use anyhow::Result;
use std::sync::Arc;

use roo_metadata::core::MetadataError;
use roo_metadata::metadata::{MetadataId, MetadataService};
use roo_metadata::test_utils::{CountingProvider, init_test_logging};

fn id(s: &str) -> MetadataId {
    MetadataId::parse(s).unwrap()
}

#[test]
fn test_repeated_get_hits_cache() -> Result<()> {
    init_test_logging(None);
    let service = MetadataService::new();
    let provider = CountingProvider::new("Eq");
    service.register_provider(provider.clone())?;

    let foo = id("MID:Eq#Foo");
    let first = service.get(&foo)?.expect("item computed");
    let second = service.get(&foo)?.expect("item cached");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.invocations(), 1);
    assert_eq!(service.statistics().valid_gets, 2);
    Ok(())
}

#[test]
fn test_forced_get_bypasses_cache() -> Result<()> {
    let service = MetadataService::new();
    let provider = CountingProvider::new("Eq");
    service.register_provider(provider.clone())?;
    let foo = id("MID:Eq#Foo");

    service.get(&foo)?;
    service.get_with_eviction(&foo, true)?;
    service.evict_and_get(&foo)?;

    assert_eq!(provider.invocations(), 3);
    assert!(service.cached(&foo).is_some());
    Ok(())
}

#[test]
fn test_reentrant_get_returns_nothing() -> Result<()> {
    let service = MetadataService::new();
    let provider = CountingProvider::new("Eq");
    provider.set_reentrant(true);
    service.register_provider(provider.clone())?;

    let item = service.get(&id("MID:Eq#Foo"))?;

    assert!(item.is_some());
    assert_eq!(provider.nested_results(), vec![true]);
    assert_eq!(provider.invocations(), 1);
    assert_eq!(service.statistics().recursive_gets, 1);

    // The in-flight marker is cleared afterwards.
    service.evict_and_get(&id("MID:Eq#Foo"))?;
    assert_eq!(provider.nested_results(), vec![true, true]);
    Ok(())
}

#[test]
fn test_missing_result_evicts_downstream() -> Result<()> {
    let service = MetadataService::new();
    let eq = CountingProvider::new("Eq");
    let report = CountingProvider::new("Report");
    service.register_provider(eq.clone())?;
    service.register_provider(report.clone())?;

    let foo = id("MID:Eq#Foo");
    let report_foo = id("MID:Report#Foo");
    service.register_dependency(&foo, &report_foo)?;
    service.get(&foo)?;
    service.get(&report_foo)?;

    eq.set_available(false);
    assert!(service.evict_and_get(&foo)?.is_none());
    assert!(service.cached(&foo).is_none());
    assert!(service.cached(&report_foo).is_none());
    Ok(())
}

#[test]
fn test_get_rejects_class_identifier_and_unknown_provider() {
    let service = MetadataService::new();

    let err = service.get(&id("MID:Eq")).unwrap_err();
    assert!(matches!(err, MetadataError::InvalidIdentifier { .. }));

    let err = service.get(&id("MID:Missing#Foo")).unwrap_err();
    assert!(matches!(err, MetadataError::ProviderNotFound { .. }));
}

#[test]
fn test_duplicate_provider_rejected() -> Result<()> {
    let service = MetadataService::new();
    service.register_provider(CountingProvider::new("Eq"))?;
    let err = service.register_provider(CountingProvider::new("Eq")).unwrap_err();
    assert!(matches!(err, MetadataError::DuplicateProvider { .. }));
    Ok(())
}

#[test]
fn test_unregistered_provider_is_no_longer_consulted() -> Result<()> {
    let service = MetadataService::new();
    let provider = CountingProvider::new("Eq");
    service.register_provider(provider.clone())?;
    let foo = id("MID:Eq#Foo");
    service.get(&foo)?;

    assert!(service.unregister_provider(&id("MID:Eq")).is_some());
    assert!(service.cached(&foo).is_none());
    assert!(service.get(&foo).is_err());
    Ok(())
}

#[test]
fn test_cycles_rejected() -> Result<()> {
    let service = MetadataService::new();
    let (a, b, c) = (id("MID:x#A"), id("MID:x#B"), id("MID:x#C"));

    service.register_dependency(&a, &b)?;
    assert!(matches!(
        service.register_dependency(&b, &a),
        Err(MetadataError::InvalidDependency { .. })
    ));

    service.register_dependency(&b, &c)?;
    assert!(!service.is_valid_dependency(&c, &a));
    assert!(service.register_dependency(&c, &a).is_err());
    assert!(service.register_dependency(&a, &a).is_err());
    Ok(())
}

#[test]
fn test_dependency_edges_are_symmetric() -> Result<()> {
    let service = MetadataService::new();
    let (u, d) = (id("MID:x#U"), id("MID:y#D"));

    service.register_dependency(&u, &d)?;
    assert!(service.downstream(&u).contains(&d));
    assert!(service.upstream(&d).contains(&u));

    service.deregister_dependency(&u, &d);
    assert!(service.downstream(&u).is_empty());
    assert!(service.upstream(&d).is_empty());
    Ok(())
}

#[test]
fn test_cache_capacity_bounds_items() -> Result<()> {
    let service = MetadataService::new();
    let provider = CountingProvider::new("Eq");
    service.register_provider(provider.clone())?;
    service.set_max_capacity(2)?;

    for key in ["A", "B", "C"] {
        service.get(&id(&format!("MID:Eq#{key}")))?;
    }

    let stats = service.statistics();
    assert_eq!(stats.cached_items, 2);
    assert_eq!(stats.cache_capacity, 2);
    assert!(service.cached(&id("MID:Eq#A")).is_none());

    service.get(&id("MID:Eq#A"))?;
    assert_eq!(provider.invocations(), 4);
    Ok(())
}

#[test]
fn test_timings_recorded_per_provider() -> Result<()> {
    let service = MetadataService::new();
    service.register_provider(CountingProvider::new("Eq"))?;
    service.get(&id("MID:Eq#A"))?;
    service.get(&id("MID:Eq#B"))?;

    let timings = service.timings();
    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0].class, "Eq");
    assert_eq!(timings[0].invocations, 2);
    Ok(())
}
