// Statements and their argument trees.

use std::fmt;

use indexmap::IndexMap;

use crate::definition::DefinitionId;
use crate::entity::{Entity, Reference};

/// Key of a statement argument: by position or by parameter name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Pos(usize),
    Name(String),
}

impl fmt::Display for ArgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKey::Pos(index) => write!(f, "{}", index),
            ArgKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for ArgKey {
    fn from(index: usize) -> Self {
        ArgKey::Pos(index)
    }
}

impl From<&str> for ArgKey {
    fn from(name: &str) -> Self {
        ArgKey::Name(name.to_string())
    }
}

/// Ordered argument map of a statement.
pub type Arguments = IndexMap<ArgKey, Value>;

/// True when the keys are exactly `0, 1, .., n-1` in that order.
pub fn is_list(arguments: &Arguments) -> bool {
    arguments
        .keys()
        .enumerate()
        .all(|(index, key)| *key == ArgKey::Pos(index))
}

/// Builds positional arguments from a sequence of values.
pub fn positional<I>(values: I) -> Arguments
where
    I: IntoIterator<Item = Value>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| (ArgKey::Pos(index), value))
        .collect()
}

/// A node of an argument tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Raw expression text, emitted verbatim by the code generator.
    Literal(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Reference(Reference),
    Definition(DefinitionId),
    Statement(Box<Statement>),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn statement(statement: Statement) -> Self {
        Value::Statement(Box::new(statement))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Value::Reference(reference)
    }
}

impl From<Statement> for Value {
    fn from(statement: Statement) -> Self {
        Value::statement(statement)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Int(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

/// An entity together with its (possibly partial) arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub entity: Entity,
    pub arguments: Arguments,
}

impl Statement {
    pub fn new(entity: Entity) -> Self {
        Self { entity, arguments: Arguments::new() }
    }

    pub fn with_arguments(entity: Entity, arguments: Arguments) -> Self {
        Self { entity, arguments }
    }

    /// Appends a positional argument after the existing positional ones.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        let index = self.arguments.keys().filter(|key| matches!(key, ArgKey::Pos(_))).count();
        self.arguments.insert(ArgKey::Pos(index), value.into());
        self
    }

    /// Adds a named argument.
    pub fn named(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(ArgKey::Name(name.to_string()), value.into());
        self
    }
}

impl From<Entity> for Statement {
    fn from(entity: Entity) -> Self {
        Statement::new(entity)
    }
}
