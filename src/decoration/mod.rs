//! Decoration of registered services.
//!
//! Decorating a service wraps every existing registration of it with a
//! decorator, without changing the registration's lifetime or position. The
//! original stays registered under a hidden [`ProxyKey`] that only the
//! decorator's factory resolves, so a decorator that depends on the service
//! it decorates receives the original instead of itself.
//!
//! Decoration is a configuration step on [`ServiceCollection`]: it rewrites
//! the descriptor sequence and must happen before `build()`. Calling it
//! repeatedly stacks layers, the last call producing the outermost wrapper.
//!
//! # Examples
//!
//! ```rust
//! use ferrous_decorate::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Hello;
//! impl Greeter for Hello {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//!
//! struct Excited(Arc<dyn Greeter>);
//! impl Greeter for Excited {
//!     fn greet(&self) -> String { format!("{}!", self.0.greet()) }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton_trait::<dyn Greeter>(Arc::new(Hello));
//! services
//!     .decorate_fn::<dyn Greeter, _>(|inner| Arc::new(Excited(inner)))
//!     .unwrap()
//!     .decorate_fn::<dyn Greeter, _>(|inner| Arc::new(Excited(inner)))
//!     .unwrap();
//!
//! let provider = services.build();
//! assert_eq!(provider.get_required::<dyn Greeter>().greet(), "hello!!");
//! ```

use std::sync::Arc;

use crate::activation::Injectable;
use crate::collection::ServiceCollection;
use crate::error::DiResult;
use crate::provider::ResolverContext;
use crate::registration::{erase, unerase, AnyArc};
use crate::types::TypeRef;

mod engine;
mod proxy;
mod strategy;

pub use engine::{apply, decorate, try_decorate};
pub use proxy::ProxyKey;
pub use strategy::{DecorationStrategy, DecoratorFactory};

impl ServiceCollection {
    /// Decorates every registration of `S` with the activated decorator `D`.
    ///
    /// `D` receives the instance it wraps through
    /// [`ActivationContext::arg`](crate::ActivationContext::arg). Its
    /// constructor is registered only when something was decorated.
    ///
    /// # Errors
    ///
    /// [`DiError::NothingToDecorate`](crate::DiError::NothingToDecorate) when
    /// no registration of `S` exists.
    pub fn decorate<S, D>(&mut self) -> DiResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
        D: Injectable<S>,
    {
        let strategy = DecorationStrategy::closed(TypeRef::of::<S>(), TypeRef::of::<D>())?;
        self.apply_decoration(&strategy)?;
        Ok(self.add_injectable::<S, D>())
    }

    /// Like [`decorate`](Self::decorate), but reports a missing service as
    /// `false` instead of an error.
    pub fn try_decorate<S, D>(&mut self) -> bool
    where
        S: ?Sized + Send + Sync + 'static,
        D: Injectable<S>,
    {
        let decorated = match DecorationStrategy::closed(TypeRef::of::<S>(), TypeRef::of::<D>()) {
            Ok(strategy) => self.try_apply_decoration(&strategy),
            Err(_) => false,
        };
        if decorated {
            self.add_injectable::<S, D>();
        }
        decorated
    }

    /// Decorates registrations of a runtime service type with a runtime
    /// decorator type.
    ///
    /// When `service` is an open generic definition, every closed
    /// instantiation whose arguments satisfy the decorator's parameter
    /// constraints is decorated with the matching instantiation of
    /// `decorator`. The decorator must have a constructor registered with
    /// [`add_constructor`](Self::add_constructor) or
    /// [`add_generic_constructor`](Self::add_generic_constructor).
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` when one side is an open generic definition
    ///   and the other is not
    /// - `NothingToDecorate` when nothing matched
    pub fn decorate_types(&mut self, service: TypeRef, decorator: TypeRef) -> DiResult<&mut Self> {
        let strategy = DecorationStrategy::for_types(service, decorator)?;
        self.apply_decoration(&strategy)?;
        Ok(self)
    }

    /// Like [`decorate_types`](Self::decorate_types), but reports a missing
    /// service as `Ok(false)`. Shape mismatches are still errors.
    pub fn try_decorate_types(&mut self, service: TypeRef, decorator: TypeRef) -> DiResult<bool> {
        let strategy = DecorationStrategy::for_types(service, decorator)?;
        Ok(self.try_apply_decoration(&strategy))
    }

    /// Decorates every registration of `S` with a factory that receives the
    /// instance being decorated and a resolver.
    pub fn decorate_with<S, F>(&mut self, decorator: F) -> DiResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<S>, &ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        let strategy = typed_factory_strategy(TypeRef::of::<S>(), decorator);
        self.apply_decoration(&strategy)?;
        Ok(self)
    }

    /// Like [`decorate_with`](Self::decorate_with), but reports a missing
    /// service as `false`.
    pub fn try_decorate_with<S, F>(&mut self, decorator: F) -> bool
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<S>, &ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        let strategy = typed_factory_strategy(TypeRef::of::<S>(), decorator);
        self.try_apply_decoration(&strategy)
    }

    /// Decorates every registration of `S` with a factory that only needs the
    /// instance being decorated.
    pub fn decorate_fn<S, F>(&mut self, decorator: F) -> DiResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<S>) -> Arc<S> + Send + Sync + 'static,
    {
        self.decorate_with::<S, _>(move |inner, _| decorator(inner))
    }

    /// Decorates registrations under a runtime service key, such as a closed
    /// generic instantiation, with a typed factory.
    pub fn decorate_keyed_with<S, F>(&mut self, service: TypeRef, decorator: F) -> DiResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<S>, &ResolverContext) -> Arc<S> + Send + Sync + 'static,
    {
        let strategy = typed_factory_strategy(service, decorator);
        self.apply_decoration(&strategy)?;
        Ok(self)
    }

    /// Decorates registrations under a runtime service key with an untyped
    /// factory over erased instances.
    pub fn decorate_any<F>(&mut self, service: TypeRef, decorator: F) -> DiResult<&mut Self>
    where
        F: Fn(AnyArc, &ResolverContext) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        let factory: DecoratorFactory = Arc::new(decorator);
        self.apply_decoration(&DecorationStrategy::from_factory(service, factory))?;
        Ok(self)
    }

    /// Runs a strict decoration pass with a prepared strategy and returns the
    /// number of registrations rewritten.
    pub fn apply_decoration(&mut self, strategy: &DecorationStrategy) -> DiResult<usize> {
        let matched = decorate(&mut self.descriptors, strategy)?;
        self.observers.decorated(&strategy.service_type(), matched);
        Ok(matched)
    }

    /// Runs a non-strict decoration pass with a prepared strategy.
    pub fn try_apply_decoration(&mut self, strategy: &DecorationStrategy) -> bool {
        let before = self.descriptors.len();
        let decorated = try_decorate(&mut self.descriptors, strategy);
        if decorated {
            let matched = self.descriptors.len() - before;
            self.observers.decorated(&strategy.service_type(), matched);
        }
        decorated
    }
}

fn typed_factory_strategy<S, F>(service: TypeRef, decorator: F) -> DecorationStrategy
where
    S: ?Sized + Send + Sync + 'static,
    F: Fn(Arc<S>, &ResolverContext) -> Arc<S> + Send + Sync + 'static,
{
    let name = service.clone();
    let factory: DecoratorFactory = Arc::new(move |original: AnyArc, ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
        let inner = unerase::<S>(&original, &name)?;
        Ok(erase(decorator(inner, ctx)))
    });
    DecorationStrategy::from_factory(service, factory)
}
