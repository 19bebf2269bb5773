/// Tests for decoration through modules
///
/// Modules register services and decorate them; a strict decoration inside a
/// module aborts the module chain with the decoration error.

use ferrous_decorate::{
    DiError, DiResult, Resolver, ServiceCollection, ServiceCollectionExt,
    ServiceCollectionModuleExt, ServiceModule,
};
use std::sync::Arc;

// ===== Test Services =====

trait Store: Send + Sync {
    fn read(&self, key: &str) -> String;
}

struct MemoryStore;

impl Store for MemoryStore {
    fn read(&self, key: &str) -> String {
        format!("memory[{}]", key)
    }
}

struct CachedStore {
    inner: Arc<dyn Store>,
}

impl Store for CachedStore {
    fn read(&self, key: &str) -> String {
        format!("cache({})", self.inner.read(key))
    }
}

struct MetricsStore {
    label: Arc<String>,
    inner: Arc<dyn Store>,
}

impl Store for MetricsStore {
    fn read(&self, key: &str) -> String {
        format!("{}({})", self.label, self.inner.read(key))
    }
}

// ===== Modules =====

struct StorageModule;

impl ServiceModule for StorageModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_singleton_trait::<dyn Store>(Arc::new(MemoryStore));
        Ok(())
    }
}

struct CachingModule;

impl ServiceModule for CachingModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.decorate_fn::<dyn Store, _>(|inner| Arc::new(CachedStore { inner }))?;
        Ok(())
    }
}

struct MetricsModule {
    label: &'static str,
}

impl ServiceModule for MetricsModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_singleton(self.label.to_string());
        services.decorate_with::<dyn Store, _>(|inner, r| {
            Arc::new(MetricsStore {
                label: r.get_required::<String>(),
                inner,
            })
        })?;
        Ok(())
    }
}

/// Decorates only when storage was registered.
struct OptionalCachingModule;

impl ServiceModule for OptionalCachingModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.try_decorate_with::<dyn Store, _>(|inner, _| Arc::new(CachedStore { inner }));
        Ok(())
    }
}

// ===== Tests =====

#[test]
fn modules_layer_in_registration_order() {
    let mut services = ServiceCollection::new();
    services.add_module_mut(StorageModule).unwrap();
    services.add_module_mut(CachingModule).unwrap();
    services.add_module_mut(MetricsModule { label: "metrics" }).unwrap();

    let provider = services.build();
    assert_eq!(
        provider.get_required::<dyn Store>().read("k"),
        "metrics(cache(memory[k]))"
    );
}

#[test]
fn owned_module_chaining() {
    let provider = ServiceCollection::new()
        .add_module(StorageModule)
        .unwrap()
        .add_module(MetricsModule { label: "timed" })
        .unwrap()
        .add_module(CachingModule)
        .unwrap()
        .build();

    assert_eq!(
        provider.get_required::<dyn Store>().read("k"),
        "cache(timed(memory[k]))"
    );
}

#[test]
fn decorating_module_before_storage_fails() {
    let mut services = ServiceCollection::new();
    let result = services.add_module_mut(CachingModule);

    match result.err() {
        Some(DiError::NothingToDecorate(service)) => {
            assert!(service.to_string().contains("Store"));
        }
        Some(other) => panic!("unexpected error: {}", other),
        None => panic!("expected NothingToDecorate"),
    }
}

#[test]
fn optional_module_tolerates_missing_storage() {
    let mut services = ServiceCollection::new();
    services.add_module_mut(OptionalCachingModule).unwrap();
    assert!(services.is_empty());

    services.add_module_mut(StorageModule).unwrap();
    services.add_module_mut(OptionalCachingModule).unwrap();

    let provider = services.build();
    assert_eq!(provider.get_required::<dyn Store>().read("k"), "cache(memory[k])");
}

#[test]
fn module_errors_propagate() {
    struct FailingModule;

    impl ServiceModule for FailingModule {
        fn register_services(self, _services: &mut ServiceCollection) -> DiResult<()> {
            Err(DiError::NotFound("SomeRequiredService".to_string()))
        }
    }

    let result = ServiceCollection::new().add_module(FailingModule);
    match result.err() {
        Some(DiError::NotFound(name)) => assert_eq!(name, "SomeRequiredService"),
        _ => panic!("Expected NotFound error"),
    }
}
