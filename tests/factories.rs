/// Factory-based decoration
///
/// Every factory overload wraps the registration it replaces, and factories
/// that need other services get them from the resolver they are handed.

use ferrous_decorate::{
    erase, unerase, DiError, Lifetime, Resolver, ServiceCollection, TypeRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ===== Test Services =====

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct Hello;

impl Greeter for Hello {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

struct Suffix {
    suffix: String,
    inner: Arc<dyn Greeter>,
}

impl Greeter for Suffix {
    fn greet(&self) -> String {
        format!("{}{}", self.inner.greet(), self.suffix)
    }
}

fn suffix(inner: Arc<dyn Greeter>, suffix: &str) -> Arc<dyn Greeter> {
    Arc::new(Suffix {
        suffix: suffix.to_string(),
        inner,
    })
}

struct Punctuation(&'static str);

fn greeters() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services.add_transient_trait_factory::<dyn Greeter, _>(|_| Arc::new(Hello));
    services
}

// ===== Tests =====

#[test]
fn decorate_fn_wraps_instance() {
    let mut services = greeters();
    services
        .decorate_fn::<dyn Greeter, _>(|inner| suffix(inner, "!"))
        .unwrap();

    let provider = services.build();
    assert_eq!(provider.get_required::<dyn Greeter>().greet(), "hello!");
}

#[test]
fn decorate_with_uses_resolver() {
    let mut services = greeters();
    services.add_singleton(Punctuation("?"));
    services
        .decorate_with::<dyn Greeter, _>(|inner, r| {
            let punctuation = r.get_required::<Punctuation>();
            suffix(inner, punctuation.0)
        })
        .unwrap();

    let provider = services.build();
    assert_eq!(provider.get_required::<dyn Greeter>().greet(), "hello?");
}

#[test]
fn try_decorate_with_reports_outcome() {
    let mut services = greeters();
    assert!(services.try_decorate_with::<dyn Greeter, _>(|inner, _| suffix(inner, "~")));
    assert!(!services.try_decorate_with::<Punctuation, _>(|inner, _| inner));

    let provider = services.build();
    assert_eq!(provider.get_required::<dyn Greeter>().greet(), "hello~");
}

#[test]
fn decorate_any_works_on_erased_instances() {
    let mut services = greeters();
    services
        .decorate_any(TypeRef::of::<dyn Greeter>(), |original, _| {
            let inner = unerase::<dyn Greeter>(&original, "Greeter")?;
            Ok(erase(suffix(inner, "#")))
        })
        .unwrap();

    let provider = services.build();
    assert_eq!(provider.get_required::<dyn Greeter>().greet(), "hello#");
}

#[test]
fn decorate_keyed_with_targets_runtime_key() {
    let english = TypeRef::named("Greeter<English>");
    let french = TypeRef::named("Greeter<French>");

    let mut services = ServiceCollection::new();
    services.add_keyed_factory::<dyn Greeter, _>(english.clone(), Lifetime::Transient, |_| Arc::new(Hello));
    services.add_keyed_factory::<dyn Greeter, _>(french.clone(), Lifetime::Transient, |_| Arc::new(Hello));
    services
        .decorate_keyed_with::<dyn Greeter, _>(english.clone(), |inner, _| suffix(inner, " there"))
        .unwrap();

    let provider = services.build();
    assert_eq!(provider.get_keyed_required::<dyn Greeter>(&english).greet(), "hello there");
    assert_eq!(provider.get_keyed_required::<dyn Greeter>(&french).greet(), "hello");
}

#[test]
fn factory_errors_propagate_to_caller() {
    let mut services = greeters();
    services
        .decorate_any(TypeRef::of::<dyn Greeter>(), |_, _| {
            Err(DiError::NotFound("decorator dependency".to_string()))
        })
        .unwrap();

    let provider = services.build();
    match provider.get::<dyn Greeter>() {
        Err(DiError::NotFound(what)) => assert_eq!(what, "decorator dependency"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected the decorator factory error"),
    }
}

#[test]
fn wrong_instance_type_is_a_type_mismatch() {
    let mut services = greeters();
    services
        .decorate_any(TypeRef::of::<dyn Greeter>(), |original, _| {
            // Claims the wrong service type for the erased instance.
            let _ = unerase::<Punctuation>(&original, "Punctuation")?;
            Ok(original)
        })
        .unwrap();

    let provider = services.build();
    assert!(matches!(provider.get::<dyn Greeter>(), Err(DiError::TypeMismatch(_))));
}

#[test]
fn transient_decorator_factory_runs_per_resolution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut services = greeters();
    services
        .decorate_fn::<dyn Greeter, _>(move |inner| {
            counter.fetch_add(1, Ordering::SeqCst);
            inner
        })
        .unwrap();

    let provider = services.build();
    for _ in 0..3 {
        provider.get_required::<dyn Greeter>();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn concrete_service_factory_decoration() {
    #[derive(Debug)]
    struct Settings {
        retries: u32,
    }

    let mut services = ServiceCollection::new();
    services.add_singleton(Settings { retries: 1 });
    services
        .decorate_fn::<Settings, _>(|inner| Arc::new(Settings { retries: inner.retries * 3 }))
        .unwrap();

    let provider = services.build();
    assert_eq!(provider.get_required::<Settings>().retries, 3);
}
