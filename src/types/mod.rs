//! Runtime type descriptions used as service keys.
//!
//! Rust generics are monomorphized away before runtime, so service types that
//! need open-generic matching are described with explicit [`TypeRef`] values.
//! A `TypeRef` is one of three shapes:
//!
//! - a concrete type, such as `TypeRef::of::<dyn Service>()` or `TypeRef::named("Event")`
//! - an open generic definition, such as `Handler<T>`
//! - a closed generic instantiation, such as `Handler<Event>`

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

mod generic;

pub use generic::{ClosedGeneric, GenericArgumentError, GenericDefinition, TypeParam};

/// A named capability a type can satisfy and a type parameter can require.
///
/// Markers stand in for generic constraints such as `where T: Command`.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{Marker, TypeRef};
///
/// trait Command {}
///
/// let command = Marker::of::<dyn Command>();
/// let ty = TypeRef::named("CreateUser").with_marker(command.clone());
/// assert!(ty.satisfies(&command));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Marker(Arc<str>);

impl Marker {
    /// Creates a marker with an arbitrary name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Marker(name.into())
    }

    /// Creates a marker named after a Rust type, typically a trait object.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Marker(Arc::from(std::any::type_name::<T>()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marker({})", self.0)
    }
}

/// A non-generic type.
///
/// Rust types are identified by their `TypeId`; runtime types created with
/// [`TypeRef::named`] by name alone. Markers are metadata used by constraint
/// checks and take no part in equality or hashing.
#[derive(Clone)]
pub struct ConcreteType {
    id: Option<TypeId>,
    name: Arc<str>,
    markers: Arc<[Marker]>,
}

impl ConcreteType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `TypeId` of a type described with [`TypeRef::of`].
    pub fn type_id(&self) -> Option<TypeId> {
        self.id
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl PartialEq for ConcreteType {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }
}

impl Eq for ConcreteType {}

impl Hash for ConcreteType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.id {
            Some(id) => id.hash(state),
            None => self.name.hash(state),
        }
    }
}

/// Runtime description of a service or implementation type.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{GenericDefinition, TypeRef};
///
/// let handler = GenericDefinition::new("Handler").param("T");
/// let event = TypeRef::named("Event");
///
/// let closed = handler.close(&[event]).unwrap();
/// assert_eq!(closed.to_string(), "Handler<Event>");
/// assert!(!closed.is_open());
/// assert!(TypeRef::from(handler).is_open());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A non-generic type
    Concrete(ConcreteType),
    /// An unbound generic definition such as `Handler<T>`
    Definition(GenericDefinition),
    /// A generic definition with every parameter bound
    Closed(ClosedGeneric),
}

impl TypeRef {
    /// Describes a Rust type, keyed by its `TypeId` and displayed by its
    /// `type_name`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeRef::Concrete(ConcreteType {
            id: Some(TypeId::of::<T>()),
            name: Arc::from(std::any::type_name::<T>()),
            markers: Arc::from(Vec::new()),
        })
    }

    /// Describes a purely runtime type by name.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        TypeRef::Concrete(ConcreteType {
            id: None,
            name: name.into(),
            markers: Arc::from(Vec::new()),
        })
    }

    /// Adds a satisfied marker. Only concrete types carry markers; other
    /// shapes are returned unchanged.
    pub fn with_marker(self, marker: Marker) -> Self {
        self.with_markers(std::iter::once(marker))
    }

    /// Adds several satisfied markers. See [`with_marker`](Self::with_marker).
    pub fn with_markers<I>(self, markers: I) -> Self
    where
        I: IntoIterator<Item = Marker>,
    {
        match self {
            TypeRef::Concrete(concrete) => {
                let mut all = concrete.markers.to_vec();
                for marker in markers {
                    if !all.contains(&marker) {
                        all.push(marker);
                    }
                }
                TypeRef::Concrete(ConcreteType {
                    id: concrete.id,
                    name: concrete.name,
                    markers: all.into(),
                })
            }
            other => other,
        }
    }

    /// Base name without generic arguments.
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Concrete(c) => c.name(),
            TypeRef::Definition(d) => d.name(),
            TypeRef::Closed(c) => c.definition().name(),
        }
    }

    /// True only for unbound generic definitions.
    pub fn is_open(&self) -> bool {
        matches!(self, TypeRef::Definition(_))
    }

    pub fn is_closed_generic(&self) -> bool {
        matches!(self, TypeRef::Closed(_))
    }

    /// The generic definition behind an open or closed generic.
    pub fn definition(&self) -> Option<&GenericDefinition> {
        match self {
            TypeRef::Concrete(_) => None,
            TypeRef::Definition(d) => Some(d),
            TypeRef::Closed(c) => Some(c.definition()),
        }
    }

    /// Type arguments of a closed generic; empty otherwise.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Closed(c) => c.args(),
            _ => &[],
        }
    }

    pub fn markers(&self) -> &[Marker] {
        match self {
            TypeRef::Concrete(c) => c.markers(),
            _ => &[],
        }
    }

    pub fn satisfies(&self, marker: &Marker) -> bool {
        self.markers().contains(marker)
    }
}

impl From<GenericDefinition> for TypeRef {
    fn from(definition: GenericDefinition) -> Self {
        TypeRef::Definition(definition)
    }
}

impl From<ClosedGeneric> for TypeRef {
    fn from(closed: ClosedGeneric) -> Self {
        TypeRef::Closed(closed)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Concrete(c) => f.write_str(c.name()),
            TypeRef::Definition(d) => fmt::Display::fmt(d, f),
            TypeRef::Closed(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self)
    }
}
