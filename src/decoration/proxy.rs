//! Proxy keys: hidden identities of decorated originals.

use std::fmt;

use crate::types::TypeRef;

/// Opaque key under which a decorated original stays registered.
///
/// A proxy key wraps the original service type together with the sequence
/// slot its hidden descriptor occupies. Two proxy keys are equal only when
/// both parts match, so every rewritten registration gets its own proxy:
/// fan-out entries never share one, and each decoration layer hides the
/// previous layer under a fresh key.
///
/// Minting is deterministic: the same descriptor sequence always produces
/// the same proxy keys.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{ProxyKey, TypeRef};
///
/// let service = TypeRef::named("Service");
/// let first = ProxyKey::new(service.clone(), 1);
/// let second = ProxyKey::new(service.clone(), 2);
///
/// assert_ne!(first, second);
/// assert_eq!(first.target(), &service);
/// assert_eq!(first.to_string(), "proxy#1(Service)");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProxyKey {
    target: TypeRef,
    slot: usize,
}

impl ProxyKey {
    pub fn new(target: TypeRef, slot: usize) -> Self {
        Self { target, slot }
    }

    /// The original service type this proxy hides.
    pub fn target(&self) -> &TypeRef {
        &self.target
    }

    /// Position of the hidden descriptor in the sequence at minting time.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for ProxyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proxy#{}({})", self.slot, self.target)
    }
}

impl fmt::Debug for ProxyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyKey({})", self)
    }
}
