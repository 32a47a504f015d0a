// Uniform view of anything callable: functions, methods and closures.

use std::fmt;

use crate::value::Value;

/// Type names that never denote a class or interface.
pub const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "resource", "static", "string", "true", "void",
];

/// Returns true for builtin (non-class) type names, case-insensitively.
pub fn is_builtin_type(ty: &str) -> bool {
    BUILTIN_TYPES.iter().any(|builtin| builtin.eq_ignore_ascii_case(ty))
}

/// Strips the leading namespace separator of a fully qualified class name.
pub fn normalize_class_name(name: &str) -> &str {
    name.trim_start_matches('\\')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        })
    }
}

/// A declared parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Declared type, builtin or class.
    pub ty: Option<String>,
    /// Declared as accepting null (`?Type`).
    pub nullable: bool,
    pub optional: bool,
    pub variadic: bool,
    /// Default value expression, if one is declared.
    pub default: Option<Value>,
    /// Element type documented for array parameters (`Type[]`).
    pub element_type: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            nullable: false,
            optional: false,
            variadic: false,
            default: None,
            element_type: None,
        }
    }

    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Optional without a default expression (internal signatures do this).
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self.optional = true;
        self
    }

    /// Declares a default; the parameter becomes optional.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.optional = true;
        self
    }

    /// Documents the element type of an `array` parameter.
    pub fn of_elements(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some("array".to_string());
        self.element_type = Some(ty.into());
        self
    }

    /// The declared type when it names a class or interface.
    pub fn class_type(&self) -> Option<&str> {
        self.ty
            .as_deref()
            .filter(|ty| !is_builtin_type(ty))
            .map(normalize_class_name)
    }

    pub fn is_array(&self) -> bool {
        self.ty.as_deref().map_or(false, |ty| ty.eq_ignore_ascii_case("array"))
    }

    /// Whether null is an acceptable value for this parameter.
    pub fn allows_null(&self) -> bool {
        self.ty.is_none() || self.nullable || matches!(self.default, Some(Value::Null))
    }

    /// The value used when nothing is supplied: the default, else null.
    pub fn default_or_null(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}

/// Identity of a callable, used in diagnostics and dependency records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callable {
    Function(String),
    Method { class: String, name: String },
    Closure,
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(name) => f.write_str(name),
            Callable::Method { class, name } => write!(f, "{}::{}", class, name),
            Callable::Closure => f.write_str("{closure}"),
        }
    }
}

/// Ordered parameters and declared return type of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct CallableSignature {
    pub callable: Callable,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
}

impl CallableSignature {
    pub fn function(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self { callable: Callable::Function(name.into()), parameters, return_type: None }
    }

    pub fn method(class: impl Into<String>, name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            callable: Callable::Method { class: class.into(), name: name.into() },
            parameters,
            return_type: None,
        }
    }

    pub fn closure(parameters: Vec<Parameter>) -> Self {
        Self { callable: Callable::Closure, parameters, return_type: None }
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }
}

impl fmt::Display for CallableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.callable)
    }
}
