/// Concurrent access to decorated services
///
/// These tests verify that decorated singletons keep a single identity
/// across threads and that scopes on different threads stay isolated.

use crossbeam_utils::thread;
use ferrous_decorate::{Resolver, ServiceCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Counter: Send + Sync {
    fn next(&self) -> usize;
}

struct AtomicCounter(AtomicUsize);

impl Counter for AtomicCounter {
    fn next(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

struct Doubling(Arc<dyn Counter>);

impl Counter for Doubling {
    fn next(&self) -> usize {
        self.0.next() * 2
    }
}

const THREADS: usize = 8;
const ITERATIONS: usize = 100;

#[test]
fn decorated_singleton_is_shared_across_threads() {
    let mut services = ServiceCollection::new();
    services.add_singleton_trait_factory::<dyn Counter, _>(|_| Arc::new(AtomicCounter(AtomicUsize::new(0))));
    services
        .decorate_fn::<dyn Counter, _>(|inner| Arc::new(Doubling(inner)))
        .unwrap();
    let provider = services.build();

    let resolved: Vec<Arc<dyn Counter>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    let counter = provider.get_required::<dyn Counter>();
                    for _ in 0..ITERATIONS {
                        counter.next();
                    }
                    counter
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    for counter in &resolved[1..] {
        assert!(Arc::ptr_eq(&resolved[0], counter));
    }
    // Every call went through the one shared original.
    assert_eq!(resolved[0].next(), THREADS * ITERATIONS * 2);
}

#[test]
fn scopes_on_different_threads_are_isolated() {
    let mut services = ServiceCollection::new();
    services.add_scoped_trait_factory::<dyn Counter, _>(|_| Arc::new(AtomicCounter(AtomicUsize::new(0))));
    services
        .decorate_fn::<dyn Counter, _>(|inner| Arc::new(Doubling(inner)))
        .unwrap();
    let provider = services.build();

    let totals: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    let scope = provider.create_scope();
                    let counter = scope.get_required::<dyn Counter>();
                    for _ in 0..ITERATIONS {
                        scope.get_required::<dyn Counter>().next();
                    }
                    counter.next()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert!(totals.iter().all(|&total| total == ITERATIONS * 2));
}
