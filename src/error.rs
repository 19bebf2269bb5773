//! Error types for the dependency injection container.

use crate::types::TypeRef;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur during service
/// registration, decoration, resolution, or container operations.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_decorate::{DiError, ServiceCollection};
///
/// struct Unregistered;
///
/// let mut services = ServiceCollection::new();
/// let err = services.decorate_fn::<Unregistered, _>(|inner| inner).unwrap_err();
/// assert!(matches!(err, DiError::NothingToDecorate(_)));
/// assert!(err.to_string().starts_with("Could not find any registered service to decorate"));
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// Service not registered
    #[error("Service not found: {0}")]
    NotFound(String),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Invalid lifetime resolution (e.g., scoped from root)
    #[error("Lifetime error: {0}")]
    WrongLifetime(&'static str),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// No constructor is registered for an implementation type
    #[error("No constructor registered for: {0}")]
    NotActivatable(String),
    /// A decoration request pairs an open generic with a non-generic type
    #[error("Invalid decoration of '{service}' with '{decorator}': {reason}")]
    InvalidConfiguration {
        service: TypeRef,
        decorator: TypeRef,
        reason: &'static str,
    },
    /// A strict decoration request matched no registration
    #[error("Could not find any registered service to decorate for type '{0}'")]
    NothingToDecorate(TypeRef),
    /// A decoration plan could not be parsed or referenced an unknown type
    #[cfg(feature = "config")]
    #[error("Decoration plan error: {0}")]
    Plan(String),
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
