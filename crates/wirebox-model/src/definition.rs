// Service definitions as produced by the configuration loader.

use std::fmt;

use indexmap::IndexMap;

use crate::value::{Statement, Value};

/// Stable handle of a definition inside a definition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a service comes into existence.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    /// Created by the container from a factory statement, then set up.
    Service {
        /// `None` means "instantiate the declared type".
        factory: Option<Statement>,
        setup: Vec<Statement>,
    },
    /// Supplied to the container from outside; only its type is known.
    Imported,
}

/// Declarative description of a service.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Registered name. Anonymous services get a numeric name on registration.
    pub name: Option<String>,
    ty: Option<String>,
    pub kind: DefinitionKind,
    /// Whether the service takes part in autowiring.
    pub autowired: bool,
    pub tags: IndexMap<String, Value>,
}

impl Definition {
    fn with_kind(kind: DefinitionKind) -> Self {
        Self { name: None, ty: None, kind, autowired: true, tags: IndexMap::new() }
    }

    /// A service created by the given factory statement.
    pub fn service(factory: impl Into<Statement>) -> Self {
        Self::with_kind(DefinitionKind::Service { factory: Some(factory.into()), setup: Vec::new() })
    }

    /// A service created by calling the constructor of its declared type.
    pub fn of_type(ty: impl Into<String>) -> Self {
        let mut def = Self::with_kind(DefinitionKind::Service { factory: None, setup: Vec::new() });
        def.ty = Some(ty.into());
        def
    }

    /// A service supplied from outside the container.
    pub fn imported(ty: Option<String>) -> Self {
        let mut def = Self::with_kind(DefinitionKind::Imported);
        def.ty = ty;
        def
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares the type up front, overriding type inference.
    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn with_setup(mut self, statement: impl Into<Statement>) -> Self {
        if let DefinitionKind::Service { setup, .. } = &mut self.kind {
            setup.push(statement.into());
        }
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tags.insert(tag.into(), value.into());
        self
    }

    pub fn not_autowired(mut self) -> Self {
        self.autowired = false;
        self
    }

    /// The resolved type, if known.
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Records the resolved type. A type, once known, never changes.
    pub fn resolve_type_once(&mut self, ty: String) -> &str {
        if let Some(existing) = &self.ty {
            if *existing != ty {
                log::warn!(
                    "ignoring type `{}` for service {:?}, already resolved as `{}`",
                    ty,
                    self.name,
                    existing
                );
            }
        }
        self.ty.get_or_insert(ty)
    }

    pub fn factory(&self) -> Option<&Statement> {
        match &self.kind {
            DefinitionKind::Service { factory, .. } => factory.as_ref(),
            DefinitionKind::Imported => None,
        }
    }

    /// True when the name was assigned automatically on registration.
    pub fn is_anonymous(&self) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Name used in diagnostics.
    pub fn label(&self) -> String {
        match (&self.name, &self.ty) {
            (Some(name), _) => name.clone(),
            (None, Some(ty)) => ty.clone(),
            (None, None) => "<anonymous>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    #[test]
    fn test_type_is_set_once() {
        let mut def = Definition::service(Entity::class("Mailer"));
        assert_eq!(def.ty(), None);
        assert_eq!(def.resolve_type_once("Mailer".to_string()), "Mailer");
        assert_eq!(def.resolve_type_once("Other".to_string()), "Mailer");
        assert_eq!(def.ty(), Some("Mailer"));
    }

    #[test]
    fn test_anonymous_names() {
        assert!(Definition::of_type("A").is_anonymous());
        assert!(Definition::of_type("A").named("12").is_anonymous());
        assert!(!Definition::of_type("A").named("a1").is_anonymous());
    }
}
