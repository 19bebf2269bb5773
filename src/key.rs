//! Service key types for the dependency injection container.

use std::fmt;

use crate::decoration::ProxyKey;
use crate::types::TypeRef;

/// Key for service storage and lookup.
///
/// Keys identify services in the descriptor sequence and in the built
/// registry. Each key is one of two kinds:
///
/// - **Service**: a public service type, resolvable by callers
/// - **Proxy**: the hidden home of an original registration that has been
///   decorated; only the decorator factory that owns the proxy resolves it
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{Key, TypeRef};
///
/// trait Logger: Send + Sync {}
///
/// let key = Key::of::<dyn Logger>();
/// assert!(!key.is_proxy());
/// assert_eq!(key.service_type(), &TypeRef::of::<dyn Logger>());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Public service key
    Service(TypeRef),
    /// Hidden key for a decorated original
    Proxy(ProxyKey),
}

impl Key {
    /// Key for a Rust service type (concrete or `dyn Trait`).
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key::Service(TypeRef::of::<T>())
    }

    /// The service type this key stands for. For a proxy this is the type of
    /// the original registration it hides.
    pub fn service_type(&self) -> &TypeRef {
        match self {
            Key::Service(ty) => ty,
            Key::Proxy(proxy) => proxy.target(),
        }
    }

    /// Structural check used by the decoration engine to skip hidden entries.
    pub fn is_proxy(&self) -> bool {
        matches!(self, Key::Proxy(_))
    }

    /// Human-readable name for diagnostics and error messages.
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl From<TypeRef> for Key {
    fn from(ty: TypeRef) -> Self {
        Key::Service(ty)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Service(ty) => fmt::Display::fmt(ty, f),
            Key::Proxy(proxy) => fmt::Display::fmt(proxy, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_and_service_keys_differ() {
        let ty = TypeRef::named("Service");
        let service = Key::Service(ty.clone());
        let proxy = Key::Proxy(ProxyKey::new(ty.clone(), 1));

        assert_ne!(service, proxy);
        assert!(proxy.is_proxy());
        assert_eq!(proxy.service_type(), &ty);
        assert_eq!(service.display_name(), "Service");
    }

    #[test]
    fn of_matches_type_ref() {
        assert_eq!(Key::of::<u32>(), Key::from(TypeRef::of::<u32>()));
    }
}
