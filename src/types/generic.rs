//! Open generic definitions and their closed instantiations.

use std::fmt;
use std::sync::Arc;

use super::{Marker, TypeRef};

/// Why a set of type arguments cannot close a generic definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenericArgumentError {
    #[error("{definition} expects {expected} type arguments, got {found}")]
    Arity {
        definition: String,
        expected: usize,
        found: usize,
    },
    #[error("type argument {argument} for {param} does not satisfy {marker}")]
    Unsatisfied {
        param: String,
        argument: String,
        marker: String,
    },
    #[error("type argument {0} is itself an open generic")]
    OpenArgument(String),
}

/// A named type parameter with the markers an argument must satisfy.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeParam {
    name: Arc<str>,
    constraints: Vec<Marker>,
}

impl TypeParam {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    /// Adds a required marker (`where T: Marker`).
    pub fn requires(mut self, marker: Marker) -> Self {
        if !self.constraints.contains(&marker) {
            self.constraints.push(marker);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraints(&self) -> &[Marker] {
        &self.constraints
    }
}

impl From<&str> for TypeParam {
    fn from(name: &str) -> Self {
        TypeParam::new(name)
    }
}

impl fmt::Debug for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.constraints.is_empty() {
            let names: Vec<&str> = self.constraints.iter().map(Marker::name).collect();
            write!(f, ": {}", names.join(" + "))?;
        }
        Ok(())
    }
}

/// An unbound generic type such as `Handler<T>`.
///
/// Two definitions are equal when they share a name and arity. Parameter
/// constraints are part of the definition but not of its identity, so a
/// service definition and a constrained decorator definition can both be
/// declared independently.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{GenericDefinition, Marker, TypeParam, TypeRef};
///
/// let command = Marker::new("Command");
/// let decorator = GenericDefinition::new("AuditHandler")
///     .param(TypeParam::new("T").requires(command.clone()));
///
/// let create_user = TypeRef::named("CreateUser").with_marker(command);
/// let page_viewed = TypeRef::named("PageViewed");
///
/// assert!(decorator.check_arguments(&[create_user]).is_ok());
/// assert!(decorator.check_arguments(&[page_viewed]).is_err());
/// ```
#[derive(Clone)]
pub struct GenericDefinition {
    name: Arc<str>,
    params: Arc<[TypeParam]>,
}

impl GenericDefinition {
    /// Creates a definition with no parameters; add them with [`param`](Self::param).
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            params: Arc::from(Vec::new()),
        }
    }

    pub fn param(mut self, param: impl Into<TypeParam>) -> Self {
        let mut params = self.params.to_vec();
        params.push(param.into());
        self.params = params.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeParam] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Checks that `args` could close this definition.
    pub fn check_arguments(&self, args: &[TypeRef]) -> Result<(), GenericArgumentError> {
        if args.len() != self.params.len() {
            return Err(GenericArgumentError::Arity {
                definition: self.to_string(),
                expected: self.params.len(),
                found: args.len(),
            });
        }

        for (param, arg) in self.params.iter().zip(args) {
            if arg.is_open() {
                return Err(GenericArgumentError::OpenArgument(arg.to_string()));
            }
            if let Some(missing) = param.constraints().iter().find(|m| !arg.satisfies(m)) {
                return Err(GenericArgumentError::Unsatisfied {
                    param: param.name().to_string(),
                    argument: arg.to_string(),
                    marker: missing.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Binds every parameter, producing a closed instantiation.
    pub fn close(&self, args: &[TypeRef]) -> Result<TypeRef, GenericArgumentError> {
        self.check_arguments(args)?;
        Ok(TypeRef::Closed(ClosedGeneric {
            definition: self.clone(),
            args: Arc::from(args.to_vec()),
        }))
    }
}

impl PartialEq for GenericDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params.len() == other.params.len()
    }
}

impl Eq for GenericDefinition {}

impl std::hash::Hash for GenericDefinition {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.params.len().hash(state);
    }
}

impl fmt::Display for GenericDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            let names: Vec<&str> = self.params.iter().map(TypeParam::name).collect();
            write!(f, "<{}>", names.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Debug for GenericDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericDefinition")
            .field("name", &&*self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// A generic definition with all parameters bound to concrete arguments.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClosedGeneric {
    definition: GenericDefinition,
    args: Arc<[TypeRef]>,
}

impl ClosedGeneric {
    pub fn definition(&self) -> &GenericDefinition {
        &self.definition
    }

    pub fn args(&self) -> &[TypeRef] {
        &self.args
    }
}

impl fmt::Display for ClosedGeneric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.definition.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(">")
    }
}
