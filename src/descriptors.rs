//! Service descriptors: the configuration-time registration records.

use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::registration::AnyArc;
use crate::types::TypeRef;

/// Factory producing a type-erased service instance.
pub type Factory = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// How a descriptor produces its instance.
///
/// Exactly one production mechanism exists per descriptor.
#[derive(Clone)]
pub enum Production {
    /// Activate an implementation type through its registered constructor
    Type(TypeRef),
    /// Invoke a factory
    Factory(Factory),
    /// Hand out a pre-built instance
    Instance(AnyArc),
}

impl fmt::Debug for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Production::Type(ty) => f.debug_tuple("Type").field(ty).finish(),
            Production::Factory(_) => f.write_str("Factory(..)"),
            Production::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

/// A registration record in the descriptor sequence.
///
/// The decoration engine reads descriptors and rewrites them with two
/// helpers: [`retarget`](Self::retarget) moves a registration under a new
/// key and [`with_factory`](Self::with_factory) swaps its production.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{ServiceCollection, Lifetime, TypeRef};
///
/// struct Database { url: String }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_scoped_factory::<String, _>(|_| "request".to_string());
///
/// let descriptors = services.descriptors();
/// assert_eq!(descriptors.len(), 2);
/// assert_eq!(descriptors[0].service_type(), &TypeRef::of::<Database>());
/// assert_eq!(descriptors[0].lifetime, Lifetime::Singleton);
/// assert_eq!(descriptors[1].lifetime, Lifetime::Scoped);
/// ```
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// The service key, public or proxy
    pub key: Key,
    /// Service lifetime
    pub lifetime: Lifetime,
    /// Production mechanism
    pub production: Production,
}

impl ServiceDescriptor {
    /// Describes a registration activated from an implementation type.
    pub fn from_type(service: TypeRef, implementation: TypeRef, lifetime: Lifetime) -> Self {
        Self {
            key: Key::Service(service),
            lifetime,
            production: Production::Type(implementation),
        }
    }

    /// Describes a registration produced by a factory.
    pub fn from_factory(service: TypeRef, lifetime: Lifetime, factory: Factory) -> Self {
        Self {
            key: Key::Service(service),
            lifetime,
            production: Production::Factory(factory),
        }
    }

    /// Describes a singleton registration of a pre-built instance.
    pub fn from_instance(service: TypeRef, instance: AnyArc) -> Self {
        Self {
            key: Key::Service(service),
            lifetime: Lifetime::Singleton,
            production: Production::Instance(instance),
        }
    }

    /// The service type of the key. For proxy entries this is the hidden
    /// original's type.
    pub fn service_type(&self) -> &TypeRef {
        self.key.service_type()
    }

    /// The implementation type, when production is type-based.
    pub fn implementation_type(&self) -> Option<&TypeRef> {
        match &self.production {
            Production::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Copy of this descriptor registered under `key`, with the same
    /// production and lifetime.
    pub fn retarget(&self, key: Key) -> ServiceDescriptor {
        ServiceDescriptor {
            key,
            lifetime: self.lifetime,
            production: self.production.clone(),
        }
    }

    /// Copy of this descriptor with the same key and lifetime, produced by
    /// `factory` instead.
    pub fn with_factory(&self, factory: Factory) -> ServiceDescriptor {
        ServiceDescriptor {
            key: self.key.clone(),
            lifetime: self.lifetime,
            production: Production::Factory(factory),
        }
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("production", &self.production)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::ProxyKey;

    #[test]
    fn retarget_keeps_production_and_lifetime() {
        let original = ServiceDescriptor::from_type(
            TypeRef::named("Service"),
            TypeRef::named("Impl"),
            Lifetime::Scoped,
        );
        let proxy = Key::Proxy(ProxyKey::new(TypeRef::named("Service"), 1));
        let moved = original.retarget(proxy.clone());

        assert_eq!(moved.key, proxy);
        assert_eq!(moved.lifetime, Lifetime::Scoped);
        assert_eq!(moved.implementation_type(), Some(&TypeRef::named("Impl")));
    }

    #[test]
    fn with_factory_keeps_key_and_lifetime() {
        let original = ServiceDescriptor::from_instance(TypeRef::named("Service"), Arc::new(5u8));
        let factory: Factory = Arc::new(|_: &ResolverContext<'_>| -> DiResult<AnyArc> { Ok(Arc::new(6u8)) });
        let swapped = original.with_factory(factory);

        assert_eq!(swapped.key, original.key);
        assert_eq!(swapped.lifetime, Lifetime::Singleton);
        assert!(matches!(swapped.production, Production::Factory(_)));
        assert!(swapped.implementation_type().is_none());
    }
}
