//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::CircularPanic;
use crate::key::Key;
use crate::registration::{unerase, AnyArc};
use crate::types::TypeRef;

/// Core resolver trait for object-safe service resolution.
///
/// This trait provides the fundamental service resolution capabilities that are
/// object-safe (can be used as trait objects). It handles the low-level resolution
/// mechanics including circular dependency detection through thread-local stacks.
///
/// Decorator factories depend on exactly these three operations: fetching the
/// hidden original through [`resolve_any`](Self::resolve_any), and building
/// the decorator through [`activate`](Self::activate).
///
/// Most users should use the [`Resolver`] trait instead, which provides more
/// ergonomic generic methods built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single service.
    ///
    /// When several registrations share the key, the last one wins.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The resolved service in its erased form
    /// * `Err(DiError)` - Resolution error (not found, wrong lifetime, circular, etc.)
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves every registration for a key, in registration order.
    ///
    /// Returns an empty vector when nothing is registered.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>>;

    /// Constructs an implementation type through its registered constructor.
    ///
    /// `args` are offered to the constructor before anything is resolved
    /// from the container. Decorators receive the instance they wrap this way.
    fn activate(&self, ty: &TypeRef, args: &[AnyArc]) -> DiResult<AnyArc>;
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// This trait builds on [`ResolverCore`] to offer type-safe generic methods that
/// handle type erasure internally. Concrete types and trait objects are resolved
/// through the same methods.
///
/// # Examples
///
/// ```
/// use ferrous_decorate::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(42usize);
/// collection.add_singleton_trait::<dyn Logger>(Arc::new(ConsoleLogger));
///
/// let provider = collection.build();
///
/// let number = provider.get_required::<usize>();
/// assert_eq!(*number, 42);
///
/// let logger = provider.get_required::<dyn Logger>();
/// assert_eq!(logger.log("hi"), "LOG: hi");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a service registered under the Rust type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_decorate::{ServiceCollection, Resolver};
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_singleton("configuration".to_string());
    ///
    /// let provider = collection.build();
    /// let config = provider.get::<String>().unwrap();
    /// assert_eq!(&*config, "configuration");
    /// ```
    fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&Key::of::<T>())?;
        unerase::<T>(&any, std::any::type_name::<T>())
    }

    /// Resolves a service, panicking on failure.
    ///
    /// Circular dependencies propagate as a [`CircularPanic`] so that the
    /// outermost resolution reports the full cycle.
    fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        required(self.get::<T>(), std::any::type_name::<T>())
    }

    /// Resolves every registration of `T`, in registration order.
    fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many(&Key::of::<T>())?
            .iter()
            .map(|any| unerase::<T>(any, std::any::type_name::<T>()))
            .collect()
    }

    /// Resolves a service registered under a runtime type key, such as a
    /// closed generic instantiation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_decorate::{GenericDefinition, Lifetime, Resolver, ServiceCollection, TypeRef};
    /// use std::sync::Arc;
    ///
    /// let repository = GenericDefinition::new("Repository").param("T");
    /// let users = repository.close(&[TypeRef::named("User")]).unwrap();
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_keyed_factory::<String, _>(users.clone(), Lifetime::Singleton, |_| {
    ///     Arc::new("users table".to_string())
    /// });
    ///
    /// let provider = collection.build();
    /// let table = provider.get_keyed::<String>(&users).unwrap();
    /// assert_eq!(&*table, "users table");
    /// ```
    fn get_keyed<T: ?Sized + Send + Sync + 'static>(&self, service: &TypeRef) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&Key::Service(service.clone()))?;
        unerase::<T>(&any, service)
    }

    /// Resolves a runtime-keyed service, panicking on failure.
    fn get_keyed_required<T: ?Sized + Send + Sync + 'static>(&self, service: &TypeRef) -> Arc<T> {
        required(self.get_keyed::<T>(service), service)
    }

    /// Resolves every registration of a runtime type key, in registration order.
    fn get_all_keyed<T: ?Sized + Send + Sync + 'static>(&self, service: &TypeRef) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many(&Key::Service(service.clone()))?
            .iter()
            .map(|any| unerase::<T>(any, service))
            .collect()
    }
}

fn required<T: ?Sized>(result: DiResult<Arc<T>>, name: impl std::fmt::Display) -> Arc<T> {
    match result {
        Ok(value) => value,
        Err(DiError::Circular(path)) => std::panic::panic_any(CircularPanic::new(path)),
        Err(e) => panic!("Failed to resolve {}: {:?}", name, e),
    }
}
