//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use crate::error::DiResult;
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::{Resolver, ResolverCore};
use crate::types::TypeRef;

/// Context passed to factory functions for resolving dependencies.
///
/// ResolverContext wraps a resolver (ServiceProvider or Scope) and provides
/// the interface that factory functions use to access other services. This
/// allows factory functions to be independent of the specific resolver type.
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
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     // resolver is a ResolverContext that provides access to other services
///     UserService {
///         db: resolver.get_required::<Database>(),
///     }
/// });
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    /// Creates a new ResolverContext wrapping the given resolver.
    pub(crate) fn new<T>(resolver: &'a T) -> Self
    where
        T: ResolverCore,
    {
        Self { resolver }
    }

    pub(crate) fn from_dyn(resolver: &'a dyn ResolverCore) -> Self {
        Self { resolver }
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.resolver.resolve_many(key)
    }

    fn activate(&self, ty: &TypeRef, args: &[AnyArc]) -> DiResult<AnyArc> {
        self.resolver.activate(ty, args)
    }
}

impl<'a> Resolver for ResolverContext<'a> {}
