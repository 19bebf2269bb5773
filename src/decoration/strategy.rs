//! Decoration strategies: what a request decorates and how.

use std::fmt;
use std::sync::Arc;

use super::ProxyKey;
use crate::descriptors::Factory;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::provider::ResolverContext;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;
use crate::types::{GenericArgumentError, GenericDefinition, TypeRef};

/// Caller-supplied decorator factory: receives the instance being decorated
/// and a resolver, returns the decorator.
pub type DecoratorFactory =
    Arc<dyn for<'a> Fn(AnyArc, &ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// A validated decoration request.
///
/// Each strategy answers two questions: whether a registered service type is
/// a target ([`can_decorate`](Self::can_decorate)), and how to build the
/// factory that replaces it ([`build_factory`](Self::build_factory)).
#[derive(Clone)]
pub enum DecorationStrategy {
    /// Non-generic service wrapped by an activated decorator type
    Closed { service: TypeRef, decorator: TypeRef },
    /// Every compatible closed instantiation of `service` wrapped by the
    /// matching instantiation of `decorator`
    OpenGeneric {
        service: GenericDefinition,
        decorator: GenericDefinition,
    },
    /// Service wrapped by a caller-supplied factory
    Factory {
        service: TypeRef,
        factory: DecoratorFactory,
    },
}

impl DecorationStrategy {
    /// Builds a type-pair strategy, choosing the open-generic form when
    /// `service` is an open definition.
    ///
    /// Both sides must agree on shape: an open generic service needs an open
    /// generic decorator and a closed service needs a closed decorator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_decorate::{DecorationStrategy, DiError, GenericDefinition, TypeRef};
    ///
    /// let handler = GenericDefinition::new("Handler").param("T");
    /// let logging = GenericDefinition::new("LoggingHandler").param("T");
    ///
    /// let open = DecorationStrategy::for_types(handler.clone().into(), logging.into()).unwrap();
    /// assert!(matches!(open, DecorationStrategy::OpenGeneric { .. }));
    ///
    /// let err = DecorationStrategy::for_types(handler.into(), TypeRef::named("Plain")).unwrap_err();
    /// assert!(matches!(err, DiError::InvalidConfiguration { .. }));
    /// ```
    pub fn for_types(service: TypeRef, decorator: TypeRef) -> DiResult<Self> {
        if service.is_open() {
            Self::open_generic(service, decorator)
        } else {
            Self::closed(service, decorator)
        }
    }

    /// Builds a strategy for a non-generic (or closed generic) service.
    pub fn closed(service: TypeRef, decorator: TypeRef) -> DiResult<Self> {
        if service.is_open() {
            return Err(invalid(service, decorator, "service is an open generic definition"));
        }
        if decorator.is_open() {
            return Err(invalid(
                service,
                decorator,
                "decorator is an open generic definition but the service is not",
            ));
        }
        Ok(DecorationStrategy::Closed { service, decorator })
    }

    /// Builds a strategy for an open generic service definition.
    pub fn open_generic(service: TypeRef, decorator: TypeRef) -> DiResult<Self> {
        match (&service, &decorator) {
            (TypeRef::Definition(s), TypeRef::Definition(d)) => Ok(DecorationStrategy::OpenGeneric {
                service: s.clone(),
                decorator: d.clone(),
            }),
            (TypeRef::Definition(_), _) => Err(invalid(
                service,
                decorator,
                "service is an open generic definition but the decorator is not",
            )),
            _ => Err(invalid(service, decorator, "service is not an open generic definition")),
        }
    }

    /// Builds a strategy around a caller-supplied decorator factory.
    pub fn from_factory(service: TypeRef, factory: DecoratorFactory) -> Self {
        DecorationStrategy::Factory { service, factory }
    }

    /// The service type the request targets, for diagnostics.
    pub fn service_type(&self) -> TypeRef {
        match self {
            DecorationStrategy::Closed { service, .. } => service.clone(),
            DecorationStrategy::OpenGeneric { service, .. } => TypeRef::Definition(service.clone()),
            DecorationStrategy::Factory { service, .. } => service.clone(),
        }
    }

    /// Whether a registration of `candidate` is a target of this request.
    ///
    /// For open generics the candidate must be a closed instantiation of the
    /// service definition whose arguments also close the decorator
    /// definition; anything else is simply not a match.
    pub fn can_decorate(&self, candidate: &TypeRef) -> bool {
        match self {
            DecorationStrategy::Closed { service, .. } | DecorationStrategy::Factory { service, .. } => {
                candidate == service
            }
            DecorationStrategy::OpenGeneric { service, decorator } => {
                match probe_open_generic(service, decorator, candidate) {
                    Ok(()) => true,
                    Err(reason) => {
                        if let Some(reason) = reason {
                            tracing::trace!(%candidate, %decorator, %reason, "generic candidate rejected");
                        }
                        false
                    }
                }
            }
        }
    }

    /// Builds the factory that replaces a matched registration.
    ///
    /// The factory resolves the hidden original through `proxy` and wraps it.
    pub fn build_factory(&self, proxy: &ProxyKey) -> Factory {
        let hidden = Key::Proxy(proxy.clone());
        match self {
            DecorationStrategy::Closed { decorator, .. } => {
                let decorator = decorator.clone();
                Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
                    let original = ctx.resolve_any(&hidden)?;
                    ctx.activate(&decorator, &[original])
                })
            }
            DecorationStrategy::OpenGeneric { decorator, .. } => {
                let closed = decorator.close(proxy.target().args());
                Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
                    let decorator = closed
                        .as_ref()
                        .map_err(|e| DiError::NotActivatable(e.to_string()))?;
                    let original = ctx.resolve_any(&hidden)?;
                    ctx.activate(decorator, &[original])
                })
            }
            DecorationStrategy::Factory { factory, .. } => {
                let factory = factory.clone();
                Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
                    let original = ctx.resolve_any(&hidden)?;
                    factory(original, ctx)
                })
            }
        }
    }
}

/// `Ok` when `candidate` can be decorated; `Err(None)` when it is not even an
/// instantiation of `service`, `Err(Some(_))` when its arguments do not fit
/// `decorator`.
fn probe_open_generic(
    service: &GenericDefinition,
    decorator: &GenericDefinition,
    candidate: &TypeRef,
) -> Result<(), Option<GenericArgumentError>> {
    match candidate {
        TypeRef::Closed(closed) if closed.definition() == service => {
            decorator.check_arguments(closed.args()).map_err(Some)
        }
        _ => Err(None),
    }
}

fn invalid(service: TypeRef, decorator: TypeRef, reason: &'static str) -> DiError {
    DiError::InvalidConfiguration {
        service,
        decorator,
        reason,
    }
}

impl fmt::Debug for DecorationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecorationStrategy::Closed { service, decorator } => f
                .debug_struct("Closed")
                .field("service", service)
                .field("decorator", decorator)
                .finish(),
            DecorationStrategy::OpenGeneric { service, decorator } => f
                .debug_struct("OpenGeneric")
                .field("service", &service.to_string())
                .field("decorator", &decorator.to_string())
                .finish(),
            DecorationStrategy::Factory { service, .. } => f
                .debug_struct("Factory")
                .field("service", service)
                .finish_non_exhaustive(),
        }
    }
}
