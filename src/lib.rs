//! # ferrous-decorate
//!
//! Service decoration for a Microsoft.Extensions.DependencyInjection-style container.
//!
//! ## Features
//!
//! - **In-place decoration**: decorated registrations keep their position and lifetime
//! - **Layering**: each decoration call wraps the previous one
//! - **Fan-out**: every registration of a service is decorated, not just the last
//! - **Open generics**: decorate all compatible instantiations of a generic definition
//! - **Factories**: decorate with closures instead of activated types
//! - **Strict or lenient**: `decorate` fails when nothing matched, `try_decorate` reports it
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_decorate::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! trait Repository: Send + Sync {
//!     fn find(&self, id: u32) -> String;
//! }
//!
//! struct SqlRepository;
//! impl Repository for SqlRepository {
//!     fn find(&self, id: u32) -> String { format!("row {}", id) }
//! }
//!
//! struct CachedRepository {
//!     inner: Arc<dyn Repository>,
//! }
//! impl Repository for CachedRepository {
//!     fn find(&self, id: u32) -> String { format!("cached {}", self.inner.find(id)) }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton_trait::<dyn Repository>(Arc::new(SqlRepository));
//! services
//!     .decorate_fn::<dyn Repository, _>(|inner| Arc::new(CachedRepository { inner }))
//!     .unwrap();
//!
//! let provider = services.build();
//! assert_eq!(provider.get_required::<dyn Repository>().find(7), "cached row 7");
//! ```
//!
//! ## Decorating Types
//!
//! Decorators can be activated types. The decorator's constructor asks for
//! the service it wraps and receives the original registration.
//!
//! ```rust
//! use ferrous_decorate::{ActivationContext, DiResult, Injectable, Resolver, ServiceCollection};
//! use std::sync::Arc;
//!
//! trait Mailer: Send + Sync {
//!     fn send(&self) -> Vec<&'static str>;
//! }
//!
//! struct Smtp;
//! impl Injectable<dyn Mailer> for Smtp {
//!     fn construct(_: &ActivationContext<'_>) -> DiResult<Arc<dyn Mailer>> {
//!         Ok(Arc::new(Smtp))
//!     }
//! }
//! impl Mailer for Smtp {
//!     fn send(&self) -> Vec<&'static str> { vec!["smtp"] }
//! }
//!
//! struct Audited(Arc<dyn Mailer>);
//! impl Injectable<dyn Mailer> for Audited {
//!     fn construct(ctx: &ActivationContext<'_>) -> DiResult<Arc<dyn Mailer>> {
//!         Ok(Arc::new(Audited(ctx.arg::<dyn Mailer>()?)))
//!     }
//! }
//! impl Mailer for Audited {
//!     fn send(&self) -> Vec<&'static str> {
//!         let mut trail = self.0.send();
//!         trail.push("audit");
//!         trail
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_type::<dyn Mailer, Smtp>();
//! services.decorate::<dyn Mailer, Audited>().unwrap();
//!
//! let provider = services.build();
//! let scope = provider.create_scope();
//! assert_eq!(scope.get_required::<dyn Mailer>().send(), vec!["smtp", "audit"]);
//! ```
//!
//! ## Strict and Lenient Decoration
//!
//! ```rust
//! use ferrous_decorate::{DiError, ServiceCollection};
//! use std::sync::Arc;
//!
//! struct Missing;
//!
//! let mut services = ServiceCollection::new();
//! let err = services.decorate_fn::<Missing, _>(|inner| inner).unwrap_err();
//! assert!(matches!(err, DiError::NothingToDecorate(_)));
//! assert!(!services.try_decorate_with::<Missing, _>(|inner, _| inner));
//! ```

pub mod activation;
pub mod collection;
pub mod decoration;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod traits;
pub mod types;

#[cfg(feature = "config")]
pub mod plan;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use activation::{ActivationContext, Constructor, Injectable};
pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceCollectionModuleExt, ServiceModule};
pub use decoration::{apply, decorate, try_decorate, DecorationStrategy, DecoratorFactory, ProxyKey};
pub use descriptors::{Factory, Production, ServiceDescriptor};
pub use error::{DiError, DiResult};
pub use internal::CircularPanic;
pub use key::Key;
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use registration::{erase, unerase, AnyArc};
pub use traits::{Resolver, ResolverCore};
pub use types::{ClosedGeneric, ConcreteType, GenericArgumentError, GenericDefinition, Marker, TypeParam, TypeRef};

#[cfg(feature = "config")]
pub use plan::{AppliedDecoration, DecorationEntry, DecorationPlan, PlanReport, TypeCatalog};
