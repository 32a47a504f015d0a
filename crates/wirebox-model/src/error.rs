use thiserror::Error;
use miette::Diagnostic;

/// Errors reported by a definition table lookup.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No definition answers to the requested name or type.
    #[error("{message}")]
    #[diagnostic(code(wirebox_model::missing_service))]
    MissingService {
        message: String,
    },

    /// More than one autowired definition matches the requested type.
    #[error("Multiple services of type {ty} found: {}", .candidates.join(", "))]
    #[diagnostic(
        code(wirebox_model::ambiguous_service),
        help("Disable autowiring of all but one of them, or reference the service by name")
    )]
    AmbiguousService {
        ty: String,
        /// Candidate service names, sorted.
        candidates: Vec<String>,
    },

    /// A definition with the same name is already registered.
    #[error("Service '{name}' has already been added.")]
    #[diagnostic(code(wirebox_model::duplicate_service))]
    DuplicateService {
        name: String,
    },

    /// Autowiring lookups are unavailable until all types are resolved.
    #[error("Autowiring by type is not available while service types are being resolved.")]
    #[diagnostic(code(wirebox_model::not_allowed_during_resolving))]
    NotAllowedDuringResolving,
}

impl TableError {
    pub fn missing(message: impl Into<String>) -> Self {
        TableError::MissingService { message: message.into() }
    }
}
