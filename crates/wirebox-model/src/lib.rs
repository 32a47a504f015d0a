//! # wirebox-model
//!
//! Value types shared by every stage of the container builder, plus the
//! interfaces of the collaborators the resolver consumes:
//!
//! - [`Entity`], [`Reference`], [`Statement`] and the argument tree ([`Value`]),
//!   as produced by the configuration loader.
//! - [`Definition`]s and the [`DefinitionTable`] that owns them, addressed by
//!   [`DefinitionId`] handles. [`ServiceTable`] is the in-memory table.
//! - [`CallableSignature`], the single view over functions, methods and closures,
//!   and the [`ClassRegistry`] reflection snapshot ([`ClassIndex`] in memory).

pub mod definition;
pub mod entity;
pub mod error;
pub mod registry;
pub mod signature;
pub mod table;
pub mod value;

pub use definition::{Definition, DefinitionId, DefinitionKind};
pub use entity::{ContainerCall, Entity, Reference, Target};
pub use error::TableError;
pub use registry::{ClassIndex, ClassInfo, ClassKind, ClassRegistry, MethodInfo, PropertyInfo};
pub use signature::{Callable, CallableSignature, Parameter, Visibility};
pub use table::{DefinitionTable, Dependency, ServiceTable};
pub use value::{ArgKey, Arguments, Statement, Value};
