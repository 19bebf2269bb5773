//! Declarative decoration plans.
//!
//! A plan lists service/decorator type pairs by name, so decoration can be
//! driven from JSON or YAML configuration. Names are resolved through a
//! [`TypeCatalog`], which also understands closed generic syntax such as
//! `Handler<Event>` when `Handler` is a registered definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decoration::DecorationStrategy;
use crate::error::{DiError, DiResult};
use crate::types::TypeRef;
use crate::ServiceCollection;

/// Maps configuration names to runtime types.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::{GenericDefinition, TypeCatalog, TypeRef};
///
/// let mut catalog = TypeCatalog::new();
/// catalog
///     .insert("Handler", GenericDefinition::new("Handler").param("T").into())
///     .insert("Event", TypeRef::named("Event"));
///
/// let closed = catalog.resolve("Handler<Event>").unwrap();
/// assert_eq!(closed.to_string(), "Handler<Event>");
/// assert!(catalog.resolve("Unknown").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, TypeRef>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: TypeRef) -> &mut Self {
        self.types.insert(name.into(), ty);
        self
    }

    /// Registers a Rust type under its short name (the last path segment).
    pub fn insert_type<T: ?Sized + 'static>(&mut self) -> &mut Self {
        let ty = TypeRef::of::<T>();
        let short = short_name(ty.name()).to_string();
        self.insert(short, ty)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up a type by name, closing generic definitions written as
    /// `Name<Arg, ...>`.
    pub fn resolve(&self, name: &str) -> DiResult<TypeRef> {
        let name = name.trim();
        if let Some(ty) = self.types.get(name) {
            return Ok(ty.clone());
        }

        let (base, args) = split_generic(name).ok_or_else(|| DiError::Plan(format!("unknown type '{}'", name)))?;
        let definition = match self.types.get(base) {
            Some(TypeRef::Definition(definition)) => definition,
            Some(_) => return Err(DiError::Plan(format!("'{}' is not a generic definition", base))),
            None => return Err(DiError::Plan(format!("unknown type '{}'", base))),
        };
        let args = args
            .into_iter()
            .map(|arg| self.resolve(arg))
            .collect::<DiResult<Vec<_>>>()?;
        definition
            .close(&args)
            .map_err(|e| DiError::Plan(format!("cannot close '{}': {}", name, e)))
    }
}

fn short_name(full: &str) -> &str {
    let head = full.split('<').next().unwrap_or(full);
    let start = head.rfind("::").map(|i| i + 2).unwrap_or(0);
    &full[start..]
}

/// Splits `Base<A, B<C>>` into `("Base", ["A", "B<C>"])`.
fn split_generic(name: &str) -> Option<(&str, Vec<&str>)> {
    let open = name.find('<')?;
    let inner = name.strip_suffix('>')?.get(open + 1..)?;
    let base = name[..open].trim();

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    args.push(inner[start..].trim());

    if base.is_empty() || args.iter().any(|a| a.is_empty()) {
        return None;
    }
    Some((base, args))
}

/// One decoration request in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationEntry {
    pub service: String,
    pub decorator: String,
    /// Strict entries fail the plan when nothing matches
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// An ordered list of decorations; later entries wrap earlier ones.
///
/// # Examples
///
/// ```rust
/// use ferrous_decorate::DecorationPlan;
///
/// let plan = DecorationPlan::from_yaml_str(
///     "decorations:\n  - service: Service\n    decorator: Logger\n  - service: Cache\n    decorator: Tracing\n    required: false\n",
/// ).unwrap();
/// assert_eq!(plan.decorations.len(), 2);
/// assert!(plan.decorations[0].required);
/// assert!(!plan.decorations[1].required);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationPlan {
    #[serde(default)]
    pub decorations: Vec<DecorationEntry>,
}

/// A plan entry that was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDecoration {
    pub service: String,
    pub decorator: String,
    pub count: usize,
}

/// Outcome of applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    pub applied: Vec<AppliedDecoration>,
    /// Optional entries that matched nothing
    pub skipped: Vec<String>,
}

impl DecorationPlan {
    pub fn from_json_str(source: &str) -> DiResult<Self> {
        serde_json::from_str(source).map_err(|e| DiError::Plan(e.to_string()))
    }

    pub fn from_yaml_str(source: &str) -> DiResult<Self> {
        serde_yaml::from_str(source).map_err(|e| DiError::Plan(e.to_string()))
    }

    /// Applies every entry in order.
    ///
    /// Name and shape errors abort the plan; entries applied before the
    /// failing one stay applied.
    pub fn apply(&self, services: &mut ServiceCollection, catalog: &TypeCatalog) -> DiResult<PlanReport> {
        let mut report = PlanReport::default();

        for entry in &self.decorations {
            let service = catalog.resolve(&entry.service)?;
            let decorator = catalog.resolve(&entry.decorator)?;
            let strategy = DecorationStrategy::for_types(service, decorator)?;

            let count = if entry.required {
                services.apply_decoration(&strategy)?
            } else {
                let before = services.len();
                services.try_apply_decoration(&strategy);
                services.len() - before
            };

            if count == 0 {
                tracing::debug!(service = %entry.service, decorator = %entry.decorator, "optional decoration skipped");
                report.skipped.push(entry.service.clone());
            } else {
                report.applied.push(AppliedDecoration {
                    service: entry.service.clone(),
                    decorator: entry.decorator.clone(),
                    count,
                });
            }
        }

        Ok(report)
    }
}
