//! Activation of implementation types.
//!
//! Registrations and decorators that name an implementation type instead of a
//! factory are built by an activator: a table of constructors keyed by
//! concrete type or by generic definition. A closed instantiation such as
//! `LoggingHandler<Event>` is served by its own constructor when one is
//! registered and by the `LoggingHandler<T>` definition's constructor
//! otherwise.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::provider::ResolverContext;
use crate::registration::{unerase, AnyArc};
use crate::traits::{Resolver, ResolverCore};
use crate::types::{GenericDefinition, TypeRef};

/// Constructor producing a type-erased instance of an implementation type.
pub type Constructor = Arc<dyn for<'a> Fn(&ActivationContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// A type that can be constructed by the container as an implementation of `S`.
///
/// Decorators implement this for the service they wrap and take the wrapped
/// instance with [`ActivationContext::arg`].
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{ActivationContext, DiResult, Injectable, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Plain;
/// impl Injectable<dyn Greeter> for Plain {
///     fn construct(_: &ActivationContext<'_>) -> DiResult<Arc<dyn Greeter>> {
///         Ok(Arc::new(Plain))
///     }
/// }
/// impl Greeter for Plain {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// struct Shouting { inner: Arc<dyn Greeter> }
/// impl Injectable<dyn Greeter> for Shouting {
///     fn construct(ctx: &ActivationContext<'_>) -> DiResult<Arc<dyn Greeter>> {
///         Ok(Arc::new(Shouting { inner: ctx.arg::<dyn Greeter>()? }))
///     }
/// }
/// impl Greeter for Shouting {
///     fn greet(&self) -> String { self.inner.greet().to_uppercase() }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_transient_type::<dyn Greeter, Plain>();
/// services.decorate::<dyn Greeter, Shouting>().unwrap();
///
/// let provider = services.build();
/// assert_eq!(provider.get_required::<dyn Greeter>().greet(), "HELLO");
/// ```
pub trait Injectable<S: ?Sized + Send + Sync + 'static>: 'static {
    fn construct(ctx: &ActivationContext<'_>) -> DiResult<Arc<S>>;
}

/// What a constructor sees while activating a type.
pub struct ActivationContext<'a> {
    ty: &'a TypeRef,
    args: &'a [AnyArc],
    resolver: ResolverContext<'a>,
}

impl<'a> ActivationContext<'a> {
    pub(crate) fn new(ty: &'a TypeRef, args: &'a [AnyArc], resolver: &'a dyn ResolverCore) -> Self {
        Self {
            ty,
            args,
            resolver: ResolverContext::from_dyn(resolver),
        }
    }

    /// The type being activated.
    pub fn type_ref(&self) -> &TypeRef {
        self.ty
    }

    /// Generic arguments of the type being activated; empty for non-generic types.
    pub fn type_args(&self) -> &[TypeRef] {
        self.ty.args()
    }

    /// Raw arguments supplied by the caller of the activation.
    pub fn args(&self) -> &[AnyArc] {
        self.args
    }

    /// A dependency of type `S`.
    ///
    /// Supplied arguments are searched first; the container is consulted only
    /// when none of them is an `S`.
    pub fn arg<S: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<S>> {
        if let Some(found) = self.args.iter().find_map(|a| a.downcast_ref::<Arc<S>>()) {
            return Ok(found.clone());
        }
        self.resolver.get::<S>()
    }

    /// A supplied argument of type `S`, without falling back to the container.
    pub fn supplied<S: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<S>> {
        let first = self
            .args
            .first()
            .ok_or_else(|| DiError::NotFound(format!("argument for {}", self.ty)))?;
        unerase::<S>(first, std::any::type_name::<S>())
    }

    /// Resolver for everything else the constructor depends on.
    pub fn resolver(&self) -> &ResolverContext<'a> {
        &self.resolver
    }
}

/// Constructor table consulted by [`ResolverCore::activate`].
#[derive(Clone, Default)]
pub(crate) struct Activator {
    exact: HashMap<TypeRef, Constructor>,
    generic: HashMap<GenericDefinition, Constructor>,
}

impl Activator {
    pub(crate) fn insert(&mut self, ty: TypeRef, ctor: Constructor) {
        match ty {
            TypeRef::Definition(definition) => {
                self.generic.insert(definition, ctor);
            }
            other => {
                self.exact.insert(other, ctor);
            }
        }
    }

    pub(crate) fn insert_generic(&mut self, definition: GenericDefinition, ctor: Constructor) {
        self.generic.insert(definition, ctor);
    }

    /// True if `ty` can be activated, or, for a definition, if the
    /// definition has a constructor.
    pub(crate) fn contains(&self, ty: &TypeRef) -> bool {
        self.lookup(ty).is_some()
    }

    fn lookup(&self, ty: &TypeRef) -> Option<&Constructor> {
        match ty {
            TypeRef::Concrete(_) => self.exact.get(ty),
            TypeRef::Definition(definition) => self.generic.get(definition),
            TypeRef::Closed(closed) => self
                .exact
                .get(ty)
                .or_else(|| self.generic.get(closed.definition())),
        }
    }

    pub(crate) fn activate(&self, ty: &TypeRef, args: &[AnyArc], resolver: &dyn ResolverCore) -> DiResult<AnyArc> {
        if ty.is_open() {
            return Err(DiError::NotActivatable(format!("{} (open generic)", ty)));
        }
        let ctor = self
            .lookup(ty)
            .ok_or_else(|| DiError::NotActivatable(ty.to_string()))?;
        let ctx = ActivationContext::new(ty, args, resolver);
        ctor(&ctx)
    }

    pub(crate) fn len(&self) -> usize {
        self.exact.len() + self.generic.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::erase;
    use crate::ServiceCollection;

    fn constant(value: u32) -> Constructor {
        Arc::new(move |_: &ActivationContext<'_>| -> DiResult<AnyArc> { Ok(erase(Arc::new(value))) })
    }

    #[test]
    fn closed_prefers_exact_constructor() {
        let definition = GenericDefinition::new("Wrapper").param("T");
        let special = definition.close(&[TypeRef::named("Special")]).unwrap();
        let general = definition.close(&[TypeRef::named("General")]).unwrap();

        let mut activator = Activator::default();
        activator.insert(TypeRef::from(definition.clone()), constant(1));
        activator.insert(special.clone(), constant(2));

        let provider = ServiceCollection::new().build();
        let read = |ty: &TypeRef| {
            let any = activator.activate(ty, &[], &provider).unwrap();
            *unerase::<u32>(&any, "u32").unwrap()
        };

        assert_eq!(read(&special), 2);
        assert_eq!(read(&general), 1);
        assert_eq!(activator.len(), 2);
    }

    #[test]
    fn open_definition_is_not_activatable() {
        let definition = GenericDefinition::new("Wrapper").param("T");
        let mut activator = Activator::default();
        activator.insert_generic(definition.clone(), constant(1));

        let provider = ServiceCollection::new().build();
        let err = activator
            .activate(&TypeRef::from(definition), &[], &provider)
            .unwrap_err();
        assert!(matches!(err, DiError::NotActivatable(_)));
    }

    #[test]
    fn missing_constructor_reports_type() {
        let activator = Activator::default();
        let provider = ServiceCollection::new().build();
        let err = activator
            .activate(&TypeRef::named("Nope"), &[], &provider)
            .unwrap_err();
        assert_eq!(err.to_string(), "No constructor registered for: Nope");
    }

    #[test]
    fn arg_prefers_supplied_values() {
        let mut services = ServiceCollection::new();
        services.add_singleton(10u32);
        let provider = services.build();

        let ty = TypeRef::named("Probe");
        let supplied = [erase(Arc::new(99u32))];

        let ctx = ActivationContext::new(&ty, &supplied, &provider);
        assert_eq!(*ctx.arg::<u32>().unwrap(), 99);
        assert_eq!(*ctx.supplied::<u32>().unwrap(), 99);

        let none: Vec<AnyArc> = Vec::new();
        let ctx = ActivationContext::new(&ty, &none, &provider);
        assert_eq!(*ctx.arg::<u32>().unwrap(), 10);
        assert!(ctx.supplied::<u32>().is_err());
    }
}
