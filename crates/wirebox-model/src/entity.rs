// Entities: the things a statement instantiates or invokes.

use std::fmt;

use crate::definition::DefinitionId;
use crate::value::Statement;

/// Name of the self reference in textual notation (`@self`).
pub const SELF: &str = "self";

/// Reserved entity name of the negation operator.
pub const NEGATION: &str = "not";

/// Reserved entity name of the "all services assignable to type" query.
pub const TYPED: &str = "typed";

/// Reserved entity name of the "all services carrying tag" query.
pub const TAGGED: &str = "tagged";

/// Marks an entity text as a raw expression that is passed through verbatim.
pub const RAW_EXPRESSION_MARKER: char = '?';

/// Leading marker of a property member (`$name`).
pub const PROPERTY_MARKER: char = '$';

/// Trailing marker of an appending property member (`$items[]`).
pub const APPEND_MARKER: &str = "[]";

/// Leading marker of a textual service reference (`@service`).
pub const REFERENCE_MARKER: char = '@';

/// Separator between a service and its member in textual notation.
pub const MEMBER_SEPARATOR: &str = "::";

/// Namespace separator inside class names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// A pointer to another service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// The service currently being completed.
    This,
    /// A service registered under the given name.
    Name(String),
    /// The (single) autowired service of the given type.
    Type(String),
}

impl Reference {
    /// Interprets the target of a textual reference.
    ///
    /// `self` is the current service, a target containing a namespace separator
    /// is a type, anything else is a service name.
    pub fn from_target(target: &str) -> Self {
        if target == SELF {
            Reference::This
        } else if target.contains(NAMESPACE_SEPARATOR) {
            Reference::Type(target.to_string())
        } else {
            Reference::Name(target.to_string())
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Reference::Name(name.into())
    }

    pub fn of_type(ty: impl Into<String>) -> Self {
        Reference::Type(ty.into())
    }

    /// The raw target text (`self`, the service name or the type).
    pub fn value(&self) -> &str {
        match self {
            Reference::This => SELF,
            Reference::Name(name) => name,
            Reference::Type(ty) => ty,
        }
    }

    pub fn is_self(&self) -> bool {
        matches!(self, Reference::This)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", REFERENCE_MARKER, self.value())
    }
}

/// Delegation to the generated container itself.
///
/// Produced only by completion; the code generator decides how the container
/// exposes these operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerCall {
    /// Invoke the container's factory for the named service (a fresh instance).
    Create(String),
    /// Fetch the shared instance of the named service.
    Get(String),
}

impl ContainerCall {
    pub fn service(&self) -> &str {
        match self {
            ContainerCall::Create(name) | ContainerCall::Get(name) => name,
        }
    }
}

/// The left-hand side of a member call `target::member`.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// No target: `member` names a global function.
    Global,
    /// A static member of a class.
    Class(String),
    /// A member of another service.
    Reference(Reference),
    /// A member of a raw definition, normalized to a reference.
    Definition(DefinitionId),
    /// A member of whatever the nested statement produces.
    Statement(Statement),
}

/// What a statement instantiates or invokes.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A raw expression passed through verbatim.
    Literal(String),
    /// A class to instantiate (or a reserved keyword such as `not`).
    Class(String),
    /// Another service used as a factory.
    Reference(Reference),
    /// A raw definition handle, normalized to a name reference.
    Definition(DefinitionId),
    /// A function, method or property access.
    Call { target: Box<Target>, member: String },
    /// Delegation to the container's own accessors.
    Container(ContainerCall),
}

impl Entity {
    pub fn class(name: impl Into<String>) -> Self {
        Entity::Class(name.into())
    }

    pub fn call(target: Target, member: impl Into<String>) -> Self {
        Entity::Call { target: Box::new(target), member: member.into() }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Entity::call(Target::Global, name)
    }

    /// A method or property of the referenced service.
    pub fn member_of(reference: Reference, member: impl Into<String>) -> Self {
        Entity::call(Target::Reference(reference), member)
    }

    /// True for the reserved collection-query entities (`typed`, `tagged`).
    pub fn is_collection_query(&self) -> bool {
        matches!(self, Entity::Class(name) if name == TYPED || name == TAGGED)
    }
}

impl From<Reference> for Entity {
    fn from(reference: Reference) -> Self {
        Entity::Reference(reference)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Literal(text) | Entity::Class(text) => f.write_str(text),
            Entity::Reference(reference) => write!(f, "{}", reference),
            Entity::Definition(id) => write!(f, "{}", id),
            Entity::Call { target, member } => match target.as_ref() {
                Target::Global => write!(f, "{}", member),
                Target::Class(class) => write!(f, "{}{}{}", class, MEMBER_SEPARATOR, member),
                Target::Reference(reference) => {
                    write!(f, "{}{}{}", reference, MEMBER_SEPARATOR, member)
                }
                Target::Definition(id) => write!(f, "{}{}{}", id, MEMBER_SEPARATOR, member),
                Target::Statement(statement) => {
                    write!(f, "({}){}{}", statement.entity, MEMBER_SEPARATOR, member)
                }
            },
            Entity::Container(call) => write!(f, "{}{}", REFERENCE_MARKER, call.service()),
        }
    }
}

/// Checks that `member` looks like a function, method or property name.
///
/// Accepts an optional leading property marker, one or more identifiers each
/// optionally preceded by a namespace separator, and an optional trailing
/// appender marker.
pub fn is_member_name(member: &str) -> bool {
    let rest = member.strip_prefix(PROPERTY_MARKER).unwrap_or(member);
    let rest = rest.strip_suffix(APPEND_MARKER).unwrap_or(rest);
    let rest = rest.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(rest);
    if rest.is_empty() {
        return false;
    }
    rest.split(NAMESPACE_SEPARATOR).all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() || !first.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric() || !c.is_ascii())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_target() {
        assert_eq!(Reference::from_target("self"), Reference::This);
        assert_eq!(Reference::from_target("mailer"), Reference::name("mailer"));
        assert_eq!(Reference::from_target("App\\Mailer"), Reference::of_type("App\\Mailer"));
    }

    #[test]
    fn test_member_names() {
        assert!(is_member_name("create"));
        assert!(is_member_name("$items"));
        assert!(is_member_name("$items[]"));
        assert!(is_member_name("App\\helper"));
        assert!(is_member_name("\\strlen"));
        assert!(!is_member_name("!"));
        assert!(!is_member_name("1abc"));
        assert!(!is_member_name("a b"));
        assert!(!is_member_name("$"));
        assert!(!is_member_name("App\\\\x"));
    }

    #[test]
    fn test_entity_display() {
        let entity = Entity::member_of(Reference::name("db"), "connect");
        assert_eq!(entity.to_string(), "@db::connect");
        assert_eq!(Entity::function("strlen").to_string(), "strlen");
        assert!(Entity::class("typed").is_collection_query());
        assert!(!Entity::class("Typed").is_collection_query());
    }
}
