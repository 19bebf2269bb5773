/// Observer notifications for decoration and decorated resolution

use ferrous_decorate::{DiObserver, Key, LoggingObserver, Resolver, ServiceCollection, TypeRef};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    resolved: Mutex<Vec<(String, bool)>>,
    decorated: Mutex<Vec<(String, usize)>>,
}

impl DiObserver for Recorder {
    fn resolving(&self, _key: &Key) {}

    fn resolved(&self, key: &Key, _duration: Duration) {
        self.resolved
            .lock()
            .unwrap()
            .push((key.service_type().to_string(), key.is_proxy()));
    }

    fn decorated(&self, service: &TypeRef, count: usize) {
        self.decorated.lock().unwrap().push((service.to_string(), count));
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn decoration_passes_are_reported() {
    init_tracing();
    let recorder = Arc::new(Recorder::default());

    let mut services = ServiceCollection::new();
    services.add_observer(recorder.clone());
    services.add_observer(Arc::new(LoggingObserver::with_prefix("observers-test")));
    services.add_singleton(1u32);
    services.add_singleton(2u32);
    services.decorate_fn::<u32, _>(|inner| Arc::new(*inner + 10)).unwrap();
    // A lenient pass that matches nothing is not reported.
    assert!(!services.try_decorate_with::<u64, _>(|inner, _| inner));

    let decorated = recorder.decorated.lock().unwrap().clone();
    assert_eq!(decorated, vec![("u32".to_string(), 2)]);
}

#[test]
fn decorated_resolution_visits_hidden_original() {
    init_tracing();
    let recorder = Arc::new(Recorder::default());

    let mut services = ServiceCollection::new();
    services.add_observer(recorder.clone());
    services.add_singleton(1u32);
    services.decorate_fn::<u32, _>(|inner| Arc::new(*inner + 10)).unwrap();

    let provider = services.build();
    assert_eq!(*provider.get_required::<u32>(), 11);

    // The hidden original completes first, inside the decorator's factory.
    let resolved = recorder.resolved.lock().unwrap().clone();
    assert_eq!(
        resolved,
        vec![("u32".to_string(), true), ("u32".to_string(), false)]
    );
}
