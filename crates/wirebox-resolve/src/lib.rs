//! # wirebox-resolve
//!
//! The resolution engine of the container builder. Given a table of service
//! definitions and a reflection snapshot of the available classes, it
//!
//! 1. resolves the type of every definition, following references and factory
//!    return types and rejecting circular definitions ([`Resolver::resolve_definition`]);
//! 2. completes every definition: each factory and setup statement gets a
//!    canonical entity and a full argument list, autowiring whatever the
//!    configuration left out ([`Resolver::complete_definition`]).
//!
//! [`build`] runs both phases over a [`ServiceTable`](wirebox_model::ServiceTable).
//!
//! ```
//! use wirebox_model::{ClassIndex, ClassInfo, Definition, Parameter, ServiceTable};
//! use wirebox_resolve::{build, BuildConfig};
//!
//! let classes = ClassIndex::new()
//!     .with_class(ClassInfo::class("Db"))
//!     .with_class(ClassInfo::class("Repo").constructor(vec![Parameter::new("db").typed("Db")]));
//! let mut table = ServiceTable::new();
//! table.add(Definition::of_type("Db").named("db")).unwrap();
//! table.add(Definition::of_type("Repo").named("repo")).unwrap();
//!
//! let services = build(&mut table, &classes, &BuildConfig::default()).unwrap();
//! assert_eq!(services.len(), 2);
//! ```

pub mod autowire;
pub mod build;
pub mod config;
pub mod definition;
pub mod error;
pub mod normalize;
pub mod resolver;
pub mod scope;
pub mod stack;
pub mod statement;
pub mod types;

pub use autowire::{autowire_argument, autowire_arguments, ServiceGetter};
pub use build::build;
pub use config::{BuildConfig, ConfigError, CONTAINER_SERVICE};
pub use definition::CompletedDefinition;
pub use error::{ResolveError, ResolveResult};
pub use resolver::Resolver;
pub use scope::ServiceScope;
pub use stack::{ResolutionStack, StackGuard};
