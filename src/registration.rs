//! Service registration types.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::descriptors::{Factory, Production, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::traits::ResolverCore;

/// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Erases a service instance for storage.
///
/// Every instance is stored as `Arc<Arc<S>>` behind `dyn Any`, so concrete
/// types and trait objects share one representation.
pub fn erase<S: ?Sized + Send + Sync + 'static>(value: Arc<S>) -> AnyArc {
    Arc::new(value)
}

/// Recovers a typed instance from its erased form.
pub fn unerase<S: ?Sized + Send + Sync + 'static>(value: &AnyArc, name: impl fmt::Display) -> DiResult<Arc<S>> {
    value
        .downcast_ref::<Arc<S>>()
        .cloned()
        .ok_or_else(|| DiError::TypeMismatch(name.to_string()))
}

/// Built registration with lifetime caches
pub(crate) struct Registration {
    pub(crate) key: Key,
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Factory,
    /// Singleton cache - OnceCell for lock-free access after initialization
    pub(crate) single_runtime: Option<OnceCell<AnyArc>>,
    /// Scoped slot index for O(1) scoped service resolution
    pub(crate) scoped_slot: Option<usize>,
}

impl Registration {
    pub(crate) fn from_descriptor(descriptor: ServiceDescriptor) -> Self {
        let ctor: Factory = match descriptor.production {
            Production::Factory(factory) => factory,
            Production::Instance(instance) => {
                Arc::new(move |_: &ResolverContext<'_>| -> DiResult<AnyArc> { Ok(instance.clone()) })
            }
            Production::Type(implementation) => {
                Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
                    ctx.activate(&implementation, &[])
                })
            }
        };

        let single_runtime = match descriptor.lifetime {
            Lifetime::Singleton => Some(OnceCell::new()),
            _ => None,
        };

        Self {
            key: descriptor.key,
            lifetime: descriptor.lifetime,
            ctor,
            single_runtime,
            scoped_slot: None,
        }
    }
}

/// Service registry holding all registrations in descriptor order
pub(crate) struct Registry {
    pub(crate) entries: Vec<Registration>,
    /// Positions of every registration for a key, in registration order
    index: HashMap<Key, Vec<usize>>,
    /// Total count of scoped registrations for slot allocation
    pub(crate) scoped_count: usize,
}

impl Registry {
    /// Builds the registry and assigns scoped slot indices.
    pub(crate) fn from_descriptors(descriptors: Vec<ServiceDescriptor>) -> Self {
        let mut entries = Vec::with_capacity(descriptors.len());
        let mut index: HashMap<Key, Vec<usize>> = HashMap::new();
        let mut next_scoped_slot = 0;

        for (position, descriptor) in descriptors.into_iter().enumerate() {
            let mut reg = Registration::from_descriptor(descriptor);
            if reg.lifetime == Lifetime::Scoped {
                reg.scoped_slot = Some(next_scoped_slot);
                next_scoped_slot += 1;
            }
            index.entry(reg.key.clone()).or_default().push(position);
            entries.push(reg);
        }

        Self {
            entries,
            index,
            scoped_count: next_scoped_slot,
        }
    }

    /// The registration that wins single resolution: the last one for the key.
    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        self.index
            .get(key)
            .and_then(|positions| positions.last())
            .map(|&i| &self.entries[i])
    }

    /// Every registration for the key, in registration order.
    pub(crate) fn get_all<'a>(&'a self, key: &Key) -> impl Iterator<Item = &'a Registration> + 'a {
        self.index
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
