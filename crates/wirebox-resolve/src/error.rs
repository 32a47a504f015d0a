use thiserror::Error;
use miette::Diagnostic;
use wirebox_model::{Definition, TableError};

/// Errors raised while resolving or completing service definitions.
///
/// Every variant carries a human-readable message. Context is layered onto the
/// message as the error travels up (the call site it was used in, the parameter
/// that needed it, the service being built) while the kind stays the same.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The configuration describes a service that cannot be built.
    #[error("{message}")]
    #[diagnostic(code(wirebox_resolve::service_creation))]
    ServiceCreation {
        message: String,
    },

    /// A service was looked up by name or type and is not there.
    #[error("{message}")]
    #[diagnostic(
        code(wirebox_resolve::missing_service),
        help("Register the service, or reference it by a name that exists")
    )]
    MissingService {
        message: String,
    },

    /// Resolving a service's type requires resolving that same service first.
    #[error("{message}")]
    #[diagnostic(
        code(wirebox_resolve::circular_reference),
        help("Break the cycle by declaring the type of one of the services explicitly")
    )]
    CircularReference {
        /// The services on the resolution stack, outermost first.
        services: Vec<String>,
        message: String,
    },
}

/// Shorthand for results within the resolver.
pub type ResolveResult<T> = Result<T, ResolveError>;

const USED_IN: &str = " (used in";
const SERVICE_PREFIX: &str = "Service '";

impl ResolveError {
    pub fn creation(message: impl Into<String>) -> Self {
        ResolveError::ServiceCreation { message: message.into() }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        ResolveError::MissingService { message: message.into() }
    }

    pub fn circular(services: Vec<String>) -> Self {
        let message = format!("Circular reference detected for services: {}.", services.join(", "));
        ResolveError::CircularReference { services, message }
    }

    pub fn message(&self) -> &str {
        match self {
            ResolveError::ServiceCreation { message }
            | ResolveError::MissingService { message }
            | ResolveError::CircularReference { message, .. } => message,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ResolveError::MissingService { .. })
    }

    /// Rewrites the message, keeping the kind.
    pub fn map_message(mut self, f: impl FnOnce(&str) -> String) -> Self {
        let message = match &mut self {
            ResolveError::ServiceCreation { message }
            | ResolveError::MissingService { message }
            | ResolveError::CircularReference { message, .. } => message,
        };
        *message = f(message);
        self
    }

    /// Appends `(used in <site>)` unless a usage site is already named.
    pub fn used_in(self, site: &str) -> Self {
        if self.message().contains(USED_IN) {
            return self;
        }
        self.map_message(|message| format!("{}{} {})", message, USED_IN, site))
    }

    /// Prefixes the message with the identity of the service being built.
    ///
    /// Applied at most once: a message that already names a service is left alone.
    pub fn in_service(self, definition: &Definition, entity: Option<String>) -> Self {
        if self.message().starts_with(SERVICE_PREFIX) {
            return self;
        }
        let ty = definition.ty();
        let mut prefix = match (&definition.name, ty) {
            (Some(name), ty) if !definition.is_anonymous() => match ty {
                Some(ty) => format!("Service '{}' (type of {}): ", name, ty),
                None => format!("Service '{}': ", name),
            },
            (_, Some(ty)) => format!("Service of type {}: ", ty),
            (_, None) => match entity {
                Some(entity) => format!("Service ({}): ", entity),
                None => String::new(),
            },
        };
        self.map_message(|message| {
            match ty {
                Some(ty) => {
                    let short = ty.rsplit('\\').next().unwrap_or(ty);
                    prefix.push_str(&message.replace(&format!("{}::", ty), &format!("{}::", short)));
                }
                None => prefix.push_str(message),
            }
            prefix
        })
    }
}

impl From<TableError> for ResolveError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingService { message } => ResolveError::MissingService { message },
            other => ResolveError::ServiceCreation { message: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebox_model::Entity;

    #[test]
    fn test_used_in_is_appended_once() {
        let err = ResolveError::creation("Class Foo not found.")
            .used_in("Bar::__construct()")
            .used_in("@baz");
        assert_eq!(err.message(), "Class Foo not found. (used in Bar::__construct())");
    }

    #[test]
    fn test_in_service_shortens_type_prefix() {
        let def = Definition::service(Entity::class("App\\Mailer"))
            .named("mailer")
            .typed("App\\Mailer");
        let err = ResolveError::creation("App\\Mailer::send() is not callable.").in_service(&def, None);
        assert_eq!(
            err.message(),
            "Service 'mailer' (type of App\\Mailer): Mailer::send() is not callable."
        );
        let again = err.clone().in_service(&def, None);
        assert_eq!(again, err);
    }

    #[test]
    fn test_in_service_for_anonymous_services() {
        let typed = Definition::of_type("Mailer").named("01");
        let err = ResolveError::missing("boom").in_service(&typed, None);
        assert_eq!(err.message(), "Service of type Mailer: boom");
        assert!(err.is_missing());

        let untyped = Definition::service(Entity::class("Mailer"));
        let err = ResolveError::creation("boom").in_service(&untyped, Some("Mailer::__construct()".into()));
        assert_eq!(err.message(), "Service (Mailer::__construct()): boom");
    }

    #[test]
    fn test_circular_keeps_services_when_wrapped() {
        let def = Definition::of_type("A").named("a");
        let err = ResolveError::circular(vec!["a".into(), "b".into()]).in_service(&def, None);
        match err {
            ResolveError::CircularReference { services, message } => {
                assert_eq!(services, vec!["a", "b"]);
                assert_eq!(message, "Service 'a' (type of A): Circular reference detected for services: a, b.");
            }
            other => panic!("expected circular reference, got {:?}", other),
        }
    }
}
