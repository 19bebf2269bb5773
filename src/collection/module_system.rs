//! Service module system for modular registration.
//!
//! This module provides traits and functionality for organizing service
//! registrations, and the decorations applied to them, into reusable modules.

use crate::{DiResult, ServiceCollection};

/// A module that can register and decorate services in a ServiceCollection.
///
/// Registration returns a `DiResult`, so a module can apply strict
/// decorations and let a missing target abort configuration.
///
/// # Example
///
/// ```rust
/// use ferrous_decorate::{DiResult, Resolver, ServiceCollection, ServiceCollectionExt, ServiceModule};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 1_000 }
/// }
///
/// struct OffsetClock(Arc<dyn Clock>);
/// impl Clock for OffsetClock {
///     fn now(&self) -> u64 { self.0.now() + 5 }
/// }
///
/// struct ClockModule;
/// impl ServiceModule for ClockModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_singleton_trait::<dyn Clock>(Arc::new(FixedClock));
///         Ok(())
///     }
/// }
///
/// struct SkewModule;
/// impl ServiceModule for SkewModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.decorate_fn::<dyn Clock, _>(|inner| Arc::new(OffsetClock(inner)))?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let provider = ServiceCollection::new()
///     .add_module(ClockModule)?
///     .add_module(SkewModule)?
///     .build();
/// assert_eq!(provider.get_required::<dyn Clock>().now(), 1_005);
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Register this module's services with the ServiceCollection.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Extension trait for ServiceCollection that provides module registration capabilities.
///
/// This trait enables .NET-style extension method chaining for modules.
pub trait ServiceCollectionExt {
    /// Add a module to the service collection using extension method syntax.
    fn add_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}

/// Additional extension trait for ServiceCollection that provides fluent module registration
/// that matches the existing &mut Self pattern.
pub trait ServiceCollectionModuleExt {
    /// Add a module to the service collection in-place.
    /// Returns a DiResult to handle any registration or decoration errors.
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ServiceCollectionModuleExt for ServiceCollection {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }
}
