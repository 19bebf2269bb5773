//! The decoration pass over a descriptor sequence.

use super::{DecorationStrategy, ProxyKey};
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Rewrites every registration `strategy` matches and returns how many
/// were rewritten.
///
/// The pass walks the sequence once, from the last entry present when it
/// started down to the first. Entries appended during the pass are never
/// visited, and entries already under a proxy key are skipped. For each
/// match the original is appended under a fresh [`ProxyKey`], and its slot
/// is replaced in place by a decorator factory with the same key and
/// lifetime, so registration order is preserved.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{apply, DecorationStrategy, Lifetime, ServiceDescriptor, TypeRef};
///
/// let service = TypeRef::named("Service");
/// let mut sequence = vec![
///     ServiceDescriptor::from_type(service.clone(), TypeRef::named("A"), Lifetime::Transient),
///     ServiceDescriptor::from_type(service.clone(), TypeRef::named("B"), Lifetime::Transient),
/// ];
///
/// let strategy = DecorationStrategy::closed(service.clone(), TypeRef::named("Logger")).unwrap();
/// assert_eq!(apply(&mut sequence, &strategy), 2);
/// assert_eq!(sequence.len(), 4);
/// assert!(sequence[2].key.is_proxy());
/// assert!(sequence[3].key.is_proxy());
/// ```
pub fn apply(sequence: &mut Vec<ServiceDescriptor>, strategy: &DecorationStrategy) -> usize {
    let mut matched = 0;

    for i in (0..sequence.len()).rev() {
        let entry = &sequence[i];
        if entry.key.is_proxy() || !strategy.can_decorate(entry.service_type()) {
            continue;
        }

        let proxy = ProxyKey::new(entry.service_type().clone(), sequence.len());
        let hidden = entry.retarget(Key::Proxy(proxy.clone()));
        let replacement = entry.with_factory(strategy.build_factory(&proxy));

        tracing::debug!(
            service = %replacement.key,
            %proxy,
            lifetime = %replacement.lifetime,
            "decorated registration"
        );

        sequence.push(hidden);
        sequence[i] = replacement;
        matched += 1;
    }

    matched
}

/// Strict decoration: fails with [`DiError::NothingToDecorate`] when no
/// registration matched.
pub fn decorate(sequence: &mut Vec<ServiceDescriptor>, strategy: &DecorationStrategy) -> DiResult<usize> {
    match apply(sequence, strategy) {
        0 => Err(DiError::NothingToDecorate(strategy.service_type())),
        matched => Ok(matched),
    }
}

/// Non-strict decoration: reports whether anything matched.
pub fn try_decorate(sequence: &mut Vec<ServiceDescriptor>, strategy: &DecorationStrategy) -> bool {
    let matched = apply(sequence, strategy);
    if matched == 0 {
        tracing::debug!(service = %strategy.service_type(), "nothing to decorate");
    }
    matched > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifetime::Lifetime;
    use crate::types::{GenericDefinition, TypeRef};

    fn entry(service: &TypeRef, implementation: &str, lifetime: Lifetime) -> ServiceDescriptor {
        ServiceDescriptor::from_type(service.clone(), TypeRef::named(implementation), lifetime)
    }

    fn strategy(service: &TypeRef) -> DecorationStrategy {
        DecorationStrategy::closed(service.clone(), TypeRef::named("Decorator")).unwrap()
    }

    #[test]
    fn rewrite_preserves_slot_key_and_lifetime() {
        let service = TypeRef::named("Service");
        let other = TypeRef::named("Other");
        let mut sequence = vec![
            entry(&other, "O", Lifetime::Singleton),
            entry(&service, "Impl", Lifetime::Scoped),
        ];

        assert_eq!(decorate(&mut sequence, &strategy(&service)).unwrap(), 1);
        assert_eq!(sequence.len(), 3);

        assert_eq!(sequence[0].key, Key::Service(other));
        assert_eq!(sequence[1].key, Key::Service(service.clone()));
        assert_eq!(sequence[1].lifetime, Lifetime::Scoped);
        assert!(sequence[1].implementation_type().is_none());

        let hidden = &sequence[2];
        assert_eq!(hidden.key, Key::Proxy(ProxyKey::new(service, 2)));
        assert_eq!(hidden.lifetime, Lifetime::Scoped);
        assert_eq!(hidden.implementation_type(), Some(&TypeRef::named("Impl")));
    }

    #[test]
    fn fan_out_gives_each_entry_its_own_proxy() {
        let service = TypeRef::named("Service");
        let mut sequence = vec![
            entry(&service, "A", Lifetime::Transient),
            entry(&service, "B", Lifetime::Transient),
            entry(&service, "C", Lifetime::Transient),
        ];

        assert_eq!(apply(&mut sequence, &strategy(&service)), 3);
        // Reverse walk: the last entry is hidden first.
        let hidden: Vec<_> = sequence[3..]
            .iter()
            .map(|d| d.implementation_type().map(|t| t.to_string()))
            .collect();
        assert_eq!(hidden, vec![Some("C".into()), Some("B".into()), Some("A".into())]);

        let keys: std::collections::HashSet<_> = sequence.iter().map(|d| d.key.clone()).collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn proxies_are_never_decorated_again() {
        let service = TypeRef::named("Service");
        let mut sequence = vec![entry(&service, "Impl", Lifetime::Transient)];

        decorate(&mut sequence, &strategy(&service)).unwrap();
        decorate(&mut sequence, &strategy(&service)).unwrap();

        // One public entry plus one hidden entry per layer.
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.iter().filter(|d| d.key.is_proxy()).count(), 2);
        assert_eq!(sequence[1].implementation_type(), Some(&TypeRef::named("Impl")));
        assert!(sequence[2].implementation_type().is_none());
    }

    #[test]
    fn strict_and_lenient_on_no_match() {
        let service = TypeRef::named("Missing");
        let mut sequence = vec![entry(&TypeRef::named("Other"), "O", Lifetime::Transient)];

        let err = decorate(&mut sequence, &strategy(&service)).unwrap_err();
        assert!(matches!(err, DiError::NothingToDecorate(ref t) if *t == service));
        assert!(!try_decorate(&mut sequence, &strategy(&service)));
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn open_generic_pass_skips_incompatible_instantiations() {
        let handler = GenericDefinition::new("Handler").param("T");
        let pair = GenericDefinition::new("Pair").param("A").param("B");
        let closed = handler.close(&[TypeRef::named("Event")]).unwrap();

        let mut sequence = vec![
            entry(&closed, "EventHandler", Lifetime::Transient),
            entry(&TypeRef::named("Handler"), "Plain", Lifetime::Transient),
        ];
        let open = DecorationStrategy::for_types(
            handler.clone().into(),
            GenericDefinition::new("Logging").param("T").into(),
        )
        .unwrap();
        assert_eq!(apply(&mut sequence, &open), 1);

        let arity_mismatch = DecorationStrategy::for_types(handler.into(), pair.into()).unwrap();
        assert_eq!(apply(&mut sequence, &arity_mismatch), 0);
    }
}
