//! Scoped service resolution.
//!
//! This module contains the Scope type for managing request-scoped services.

use once_cell::sync::OnceCell;

use super::{ResolverContext, ServiceProvider};
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{AnyArc, Registration};
use crate::traits::{Resolver, ResolverCore};
use crate::types::TypeRef;

/// Scoped service container for request-scoped dependency resolution.
///
/// A `Scope` provides isolated dependency resolution for scoped services while
/// still accessing singleton services from the root provider.
///
/// # Lifetime Behavior
///
/// - **Singleton**: Resolved and cached in the root provider (shared across all scopes)
/// - **Scoped**: Resolved and cached within this specific scope
/// - **Transient**: Created fresh on every resolution (no caching)
///
/// A decorated scoped service is one decorator graph per scope: the decorator
/// and the original it wraps are both cached in the scope's slots.
///
/// Cloning a scope is the same as [`create_sibling`](Scope::create_sibling):
/// the clone starts with empty scoped state.
///
/// # Examples
///
/// ```
/// use ferrous_decorate::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct DatabaseConnection(String);
///
/// struct UserService {
///     db: Arc<DatabaseConnection>,
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_scoped_factory::<DatabaseConnection, _>(|_| {
///     DatabaseConnection("connection-123".to_string())
/// });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService {
///         db: resolver.get_required::<DatabaseConnection>(),
///     }
/// });
///
/// let provider = collection.build();
/// let scope = provider.create_scope();
///
/// let user1 = scope.get_required::<UserService>();
/// let user2 = scope.get_required::<UserService>();
/// assert!(Arc::ptr_eq(&user1.db, &user2.db));
/// ```
pub struct Scope {
    pub(crate) root: ServiceProvider,
    // Slot-based scoped storage for O(1) access
    pub(crate) scoped_cells: Box<[OnceCell<AnyArc>]>,
}

impl Scope {
    /// The root provider this scope was created from.
    pub fn root(&self) -> &ServiceProvider {
        &self.root
    }

    /// Creates another scope from the same root.
    ///
    /// Scopes do not nest: the new scope shares singletons with this one
    /// but inherits none of its scoped instances.
    pub fn create_sibling(&self) -> Self {
        self.root.create_scope()
    }

    #[inline]
    fn resolve_scoped(&self, reg: &Registration) -> DiResult<AnyArc> {
        let slot = reg
            .scoped_slot
            .ok_or(DiError::WrongLifetime("Scoped registration without a slot"))?;
        let cell = &self.scoped_cells[slot];

        if let Some(value) = cell.get() {
            return Ok(value.clone());
        }

        let ctx = ResolverContext::new(self);
        let value = (reg.ctor)(&ctx)?;
        Ok(cell.get_or_init(|| value).clone())
    }

    fn produce(&self, reg: &Registration) -> DiResult<AnyArc> {
        match reg.lifetime {
            Lifetime::Singleton => self.root.resolve_singleton(reg),
            Lifetime::Scoped => self.resolve_scoped(reg),
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }

    fn resolve_any_impl(&self, key: &Key) -> DiResult<AnyArc> {
        let inner = self.root.inner();
        let reg = inner
            .registry
            .get(key)
            .ok_or_else(|| DiError::NotFound(key.display_name()))?;
        inner.observers.observe(key, || self.produce(reg))
    }

    fn resolve_many_impl(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let inner = self.root.inner();
        inner
            .registry
            .get_all(key)
            .map(|reg| inner.observers.observe(key, || self.produce(reg)))
            .collect()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        self.create_sibling()
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        with_circular_catch(key, || self.resolve_any_impl(key))
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        with_circular_catch(key, || self.resolve_many_impl(key))
    }

    fn activate(&self, ty: &TypeRef, args: &[AnyArc]) -> DiResult<AnyArc> {
        self.root.inner().activator.activate(ty, args, self)
    }
}

impl Resolver for Scope {}
