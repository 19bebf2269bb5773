//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type and related functionality
//! for registering services, decorating them, and building service providers.

use std::fmt;
use std::sync::Arc;

use crate::activation::{ActivationContext, Activator, Constructor, Injectable};
use crate::descriptors::{Factory, ServiceDescriptor};
use crate::error::DiResult;
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::provider::{ResolverContext, ServiceProvider};
use crate::registration::{erase, AnyArc, Registry};
use crate::types::{GenericDefinition, TypeRef};

pub mod module_system;
pub use module_system::*;

/// Configuration-time registry: an ordered descriptor sequence plus the
/// constructors needed to activate implementation types.
///
/// Registration order matters. Single resolution returns the last
/// registration of a service, and `get_all` returns every registration in
/// order. Decoration rewrites registrations in place, so both properties
/// survive it.
pub struct ServiceCollection {
    pub(crate) descriptors: Vec<ServiceDescriptor>,
    activator: Activator,
    pub(crate) observers: Observers,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            activator: Activator::default(),
            observers: Observers::new(),
        }
    }

    // ----- Descriptor Sequence -----

    /// Appends a raw descriptor.
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// The descriptor sequence, in registration order.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Mutable access to the descriptor sequence, for custom decoration passes.
    pub fn descriptors_mut(&mut self) -> &mut Vec<ServiceDescriptor> {
        &mut self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// True if a public registration for `service` exists.
    pub fn contains(&self, service: &TypeRef) -> bool {
        self.descriptors
            .iter()
            .any(|d| !d.key.is_proxy() && d.service_type() == service)
    }

    // ----- Concrete Type Registrations -----

    /// Registers a singleton instance that will be shared across the entire application.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_decorate::ServiceCollection;
    /// struct Config {
    ///     database_url: String
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Config {
    ///     database_url: "postgres://localhost".to_string()
    /// });
    /// ```
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.add(ServiceDescriptor::from_instance(TypeRef::of::<T>(), erase(Arc::new(value))))
    }

    /// Registers a singleton factory that creates the instance on first request.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory that creates one instance per scope.
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a transient factory that creates a new instance on every request.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let ctor: Factory = Arc::new(move |r: &ResolverContext<'_>| -> DiResult<AnyArc> {
            Ok(erase(Arc::new(factory(r))))
        });
        self.add(ServiceDescriptor::from_factory(TypeRef::of::<T>(), lifetime, ctor))
    }

    // ----- Trait Registrations -----

    /// Registers a singleton trait implementation.
    ///
    /// Registering the same trait several times keeps every implementation:
    /// `get` returns the last, `get_all` returns them all.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_decorate::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// trait Plugin: Send + Sync {
    ///     fn name(&self) -> &str;
    /// }
    ///
    /// struct PluginA;
    /// impl Plugin for PluginA {
    ///     fn name(&self) -> &str { "Plugin A" }
    /// }
    ///
    /// struct PluginB;
    /// impl Plugin for PluginB {
    ///     fn name(&self) -> &str { "Plugin B" }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait::<dyn Plugin>(Arc::new(PluginA));
    /// services.add_singleton_trait::<dyn Plugin>(Arc::new(PluginB));
    ///
    /// let provider = services.build();
    /// let plugins = provider.get_all::<dyn Plugin>().unwrap();
    /// assert_eq!(plugins.len(), 2);
    /// assert_eq!(plugins[0].name(), "Plugin A");
    /// assert_eq!(provider.get_required::<dyn Plugin>().name(), "Plugin B");
    /// ```
    pub fn add_singleton_trait<S: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<S>) -> &mut Self {
        self.add(ServiceDescriptor::from_instance(TypeRef::of::<S>(), erase(value)))
    }

    /// Registers a singleton trait factory.
    pub fn add_singleton_trait_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        self.add_keyed_factory::<S, F>(TypeRef::of::<S>(), Lifetime::Singleton, factory)
    }

    /// Registers a scoped trait factory.
    pub fn add_scoped_trait_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        self.add_keyed_factory::<S, F>(TypeRef::of::<S>(), Lifetime::Scoped, factory)
    }

    /// Registers a transient trait factory.
    pub fn add_transient_trait_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        self.add_keyed_factory::<S, F>(TypeRef::of::<S>(), Lifetime::Transient, factory)
    }

    // ----- Type-based Registrations -----

    /// Registers `I` as a singleton implementation of `S`, activated on first request.
    pub fn add_singleton_type<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable<S>,
    {
        self.add_keyed_type::<S, I>(TypeRef::of::<S>(), Lifetime::Singleton)
    }

    /// Registers `I` as a scoped implementation of `S`.
    pub fn add_scoped_type<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable<S>,
    {
        self.add_keyed_type::<S, I>(TypeRef::of::<S>(), Lifetime::Scoped)
    }

    /// Registers `I` as a transient implementation of `S`.
    pub fn add_transient_type<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable<S>,
    {
        self.add_keyed_type::<S, I>(TypeRef::of::<S>(), Lifetime::Transient)
    }

    // ----- Runtime-keyed Registrations -----

    /// Registers `I` as an implementation of `S` under a runtime service key.
    ///
    /// This is how closed generic instantiations such as `Handler<Event>`
    /// are registered.
    pub fn add_keyed_type<S, I>(&mut self, service: TypeRef, lifetime: Lifetime) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable<S>,
    {
        self.add_injectable::<S, I>();
        self.add(ServiceDescriptor::from_type(service, TypeRef::of::<I>(), lifetime))
    }

    /// Registers a typed factory under a runtime service key.
    pub fn add_keyed_factory<S, F>(&mut self, service: TypeRef, lifetime: Lifetime, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        let ctor: Factory = Arc::new(move |r: &ResolverContext<'_>| -> DiResult<AnyArc> { Ok(erase(factory(r))) });
        self.add(ServiceDescriptor::from_factory(service, lifetime, ctor))
    }

    /// Registers an implementation type for a service type, both as runtime
    /// values. The implementation needs a constructor.
    pub fn add_type(&mut self, service: TypeRef, implementation: TypeRef, lifetime: Lifetime) -> &mut Self {
        self.add(ServiceDescriptor::from_type(service, implementation, lifetime))
    }

    // ----- Constructors -----

    /// Registers an untyped constructor for an implementation type.
    ///
    /// Passing an open generic definition registers the constructor for
    /// every instantiation of it.
    pub fn add_constructor<F>(&mut self, ty: TypeRef, ctor: F) -> &mut Self
    where
        F: Fn(&ActivationContext) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        let ctor: Constructor = Arc::new(ctor);
        self.activator.insert(ty, ctor);
        self
    }

    /// Registers a constructor for an implementation type producing `S`.
    pub fn add_trait_constructor<S, F>(&mut self, ty: TypeRef, ctor: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ActivationContext) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.add_constructor(ty, move |ctx| ctor(ctx).map(erase))
    }

    /// Registers a constructor shared by every instantiation of a generic
    /// definition. The constructor can inspect
    /// [`ActivationContext::type_args`] to see which instantiation it builds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_decorate::{GenericDefinition, Lifetime, Resolver, ServiceCollection, TypeRef};
    /// use std::sync::Arc;
    ///
    /// let repository = GenericDefinition::new("Repository").param("T");
    /// let table = GenericDefinition::new("Table").param("T");
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_generic_constructor::<String, _>(table.clone(), |ctx| {
    ///     Ok(Arc::new(format!("table of {}", ctx.type_args()[0])))
    /// });
    ///
    /// let users = repository.close(&[TypeRef::named("User")]).unwrap();
    /// let users_table = table.close(&[TypeRef::named("User")]).unwrap();
    /// services.add_type(users.clone(), users_table, Lifetime::Transient);
    ///
    /// let provider = services.build();
    /// assert_eq!(*provider.get_keyed_required::<String>(&users), "table of User");
    /// ```
    pub fn add_generic_constructor<S, F>(&mut self, definition: GenericDefinition, ctor: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ActivationContext) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        let ctor: Constructor = Arc::new(move |ctx: &ActivationContext<'_>| -> DiResult<AnyArc> { ctor(ctx).map(erase) });
        self.activator.insert_generic(definition, ctor);
        self
    }

    /// True if `ty` has a constructor.
    pub fn is_activatable(&self, ty: &TypeRef) -> bool {
        self.activator.contains(ty)
    }

    pub(crate) fn add_injectable<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable<S>,
    {
        self.add_trait_constructor::<S, _>(TypeRef::of::<I>(), <I as Injectable<S>>::construct)
    }

    // ----- Observers -----

    /// Adds a diagnostic observer for resolution and decoration events.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    // ----- Build -----

    /// Freezes the descriptor sequence into a service provider.
    pub fn build(self) -> ServiceProvider {
        let registry = Registry::from_descriptors(self.descriptors);
        ServiceProvider::new(registry, self.activator, self.observers)
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Service Collection Debug ===\n");
        for (i, d) in self.descriptors.iter().enumerate() {
            s.push_str(&format!("  [{}] {}: {} {:?}\n", i, d.key, d.lifetime, d.production));
        }
        s.push_str(&format!("Constructors: {}\n", self.activator.len()));
        s
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("descriptors", &self.descriptors)
            .field("constructors", &self.activator.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
