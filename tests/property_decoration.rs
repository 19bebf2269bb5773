/// Property-based tests for decoration
///
/// These tests verify the shape of the descriptor sequence and the resolved
/// wrappers for arbitrary numbers of registrations and layers.

use ferrous_decorate::{Lifetime, Resolver, ServiceCollection, TypeRef};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

trait Layered: Send + Sync {
    fn origin(&self) -> usize;
    fn depth(&self) -> usize;
}

struct Base(usize);

impl Layered for Base {
    fn origin(&self) -> usize {
        self.0
    }

    fn depth(&self) -> usize {
        0
    }
}

struct Layer(Arc<dyn Layered>);

impl Layered for Layer {
    fn origin(&self) -> usize {
        self.0.origin()
    }

    fn depth(&self) -> usize {
        self.0.depth() + 1
    }
}

fn lifetime_strategy() -> impl Strategy<Value = Lifetime> {
    prop_oneof![
        Just(Lifetime::Singleton),
        Just(Lifetime::Scoped),
        Just(Lifetime::Transient),
    ]
}

fn build(lifetimes: &[Lifetime], layers: usize) -> ServiceCollection {
    let mut services = ServiceCollection::new();
    for (i, &lifetime) in lifetimes.iter().enumerate() {
        services.add_keyed_factory::<dyn Layered, _>(TypeRef::of::<dyn Layered>(), lifetime, move |_| {
            Arc::new(Base(i))
        });
    }
    for _ in 0..layers {
        services
            .decorate_fn::<dyn Layered, _>(|inner| Arc::new(Layer(inner)))
            .unwrap();
    }
    services
}

// Property: every layer adds one wrapper and one hidden entry per registration
proptest! {
    #[test]
    fn sequence_grows_by_registrations_per_layer(
        lifetimes in prop::collection::vec(lifetime_strategy(), 1..6),
        layers in 1usize..6,
    ) {
        let services = build(&lifetimes, layers);
        let n = lifetimes.len();

        prop_assert_eq!(services.len(), n + n * layers);

        let hidden: HashSet<_> = services
            .descriptors()
            .iter()
            .filter(|d| d.key.is_proxy())
            .map(|d| d.key.clone())
            .collect();
        prop_assert_eq!(hidden.len(), n * layers);

        // Public entries stay first, in place, with their lifetimes.
        for (descriptor, lifetime) in services.descriptors().iter().zip(&lifetimes) {
            prop_assert!(!descriptor.key.is_proxy());
            prop_assert_eq!(descriptor.lifetime, *lifetime);
        }
    }
}

// Property: resolution sees every registration wrapped exactly `layers` times, in order
proptest! {
    #[test]
    fn all_registrations_are_wrapped_in_order(
        lifetimes in prop::collection::vec(lifetime_strategy(), 1..6),
        layers in 0usize..6,
    ) {
        let provider = build(&lifetimes, layers).build();
        let scope = provider.create_scope();

        let resolved = scope.get_all::<dyn Layered>().unwrap();
        prop_assert_eq!(resolved.len(), lifetimes.len());
        for (i, item) in resolved.iter().enumerate() {
            prop_assert_eq!(item.origin(), i);
            prop_assert_eq!(item.depth(), layers);
        }

        let last = scope.get_required::<dyn Layered>();
        prop_assert_eq!(last.origin(), lifetimes.len() - 1);
    }
}

// Property: decorating a missing service never changes the sequence
proptest! {
    #[test]
    fn lenient_miss_is_a_no_op(count in 0usize..8) {
        let mut services = ServiceCollection::new();
        for i in 0..count {
            services.add_singleton(i as u32);
        }

        prop_assert!(!services.try_decorate_with::<u64, _>(|inner, _| inner));
        prop_assert_eq!(services.len(), count);
    }
}
