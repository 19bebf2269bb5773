//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type and related functionality
//! for resolving registered services from the DI container.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::activation::Activator;
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::registration::{AnyArc, Registration, Registry};
use crate::traits::{Resolver, ResolverCore};
use crate::types::TypeRef;

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

/// Service provider for resolving dependencies from the DI container.
///
/// The provider is built from a frozen descriptor sequence. Decoration has
/// already happened by then: a decorated service resolves to its outermost
/// decorator, and each decorator pulls the instance it wraps from a hidden
/// proxy registration.
///
/// # Thread Safety
///
/// ServiceProvider is thread-safe and can be shared across threads. Singleton
/// services are cached in an embedded `OnceCell`, and the provider can be
/// cloned cheaply (it uses `Arc` internally).
///
/// # Examples
///
/// ```
/// use ferrous_decorate::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService { db: resolver.get_required::<Database>() }
/// });
///
/// let provider = collection.build();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub registry: Registry,
    pub activator: Activator,
    pub observers: Observers,
}

impl ServiceProvider {
    pub(crate) fn new(registry: Registry, activator: Activator, observers: Observers) -> Self {
        tracing::debug!(
            registrations = registry.len(),
            scoped_slots = registry.scoped_count,
            observers = observers.len(),
            "service provider built"
        );
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                activator,
                observers,
            }),
        }
    }

    /// Convenience accessor for the inner provider
    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Creates a new scope for resolving scoped services.
    ///
    /// Each scope maintains its own cache of scoped services while still
    /// resolving singleton services from the root provider.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_decorate::{ServiceCollection, Resolver};
    /// use std::sync::{Arc, Mutex};
    ///
    /// struct RequestId(String);
    ///
    /// let mut collection = ServiceCollection::new();
    /// let counter = Arc::new(Mutex::new(0));
    /// let counter_clone = counter.clone();
    ///
    /// collection.add_scoped_factory::<RequestId, _>(move |_| {
    ///     let mut c = counter_clone.lock().unwrap();
    ///     *c += 1;
    ///     RequestId(format!("req-{}", *c))
    /// });
    ///
    /// let provider = collection.build();
    ///
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let req1a = scope1.get_required::<RequestId>();
    /// let req1b = scope1.get_required::<RequestId>(); // Same instance
    /// let req2 = scope2.get_required::<RequestId>(); // Different instance
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// ```
    pub fn create_scope(&self) -> Scope {
        let scoped_count = self.inner().registry.scoped_count;
        let scoped_cells: Box<[OnceCell<AnyArc>]> = (0..scoped_count)
            .map(|_| OnceCell::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Scope {
            root: self.clone(),
            scoped_cells,
        }
    }

    /// True if at least one registration exists for `service`.
    pub fn is_registered(&self, service: &TypeRef) -> bool {
        self.inner().registry.contains_key(&Key::Service(service.clone()))
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Service Provider Debug ===\n");
        for (i, reg) in self.inner().registry.entries.iter().enumerate() {
            s.push_str(&format!("  [{}] {}: {}", i, reg.key, reg.lifetime));
            if let Some(slot) = reg.scoped_slot {
                s.push_str(&format!(" (slot {})", slot));
            }
            s.push('\n');
        }
        s
    }

    /// Singleton resolution through the registration's embedded OnceCell.
    ///
    /// The factory runs outside the cell so that it can re-enter the
    /// resolver; the first value stored wins.
    #[inline]
    pub(crate) fn resolve_singleton(&self, reg: &Registration) -> DiResult<AnyArc> {
        match &reg.single_runtime {
            Some(cell) => {
                if let Some(value) = cell.get() {
                    return Ok(value.clone());
                }
                let ctx = ResolverContext::new(self);
                let value = (reg.ctor)(&ctx)?;
                Ok(cell.get_or_init(|| value).clone())
            }
            None => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }

    fn produce(&self, reg: &Registration) -> DiResult<AnyArc> {
        match reg.lifetime {
            Lifetime::Singleton => self.resolve_singleton(reg),
            Lifetime::Scoped => Err(DiError::WrongLifetime(
                "Cannot resolve scoped service from root provider",
            )),
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }

    fn resolve_any_impl(&self, key: &Key) -> DiResult<AnyArc> {
        let reg = self
            .inner()
            .registry
            .get(key)
            .ok_or_else(|| DiError::NotFound(key.display_name()))?;
        self.inner().observers.observe(key, || self.produce(reg))
    }

    fn resolve_many_impl(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.inner()
            .registry
            .get_all(key)
            .map(|reg| self.inner().observers.observe(key, || self.produce(reg)))
            .collect()
    }
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        with_circular_catch(key, || self.resolve_any_impl(key))
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        with_circular_catch(key, || self.resolve_many_impl(key))
    }

    fn activate(&self, ty: &TypeRef, args: &[AnyArc]) -> DiResult<AnyArc> {
        self.inner().activator.activate(ty, args, self)
    }
}

impl Resolver for ServiceProvider {}
