//! Type inference: what type of object does an entity produce?
//!
//! Types of referenced services are resolved on demand, which may recursively
//! resolve further definitions through [`Resolver::resolve_definition`].

use wirebox_model::entity::{APPEND_MARKER, PROPERTY_MARKER};
use wirebox_model::signature::normalize_class_name;
use wirebox_model::{ClassKind, DefinitionId, Dependency, Entity, Reference, Target, Visibility};

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use crate::scope::ServiceScope;

impl Resolver<'_> {
    /// The definition a reference points to.
    pub fn resolve_reference(&self, reference: &Reference, scope: &ServiceScope) -> ResolveResult<DefinitionId> {
        match reference {
            Reference::This => scope.service.ok_or_else(|| {
                ResolveError::creation("Reference to @self used outside of a registered service.")
            }),
            Reference::Name(name) => Ok(self.table.get_definition(name)?),
            Reference::Type(ty) => {
                let found = self.get_by_type(ty, scope)?;
                self.resolve_reference(&found, scope)
            }
        }
    }

    /// The type of the service a reference points to.
    ///
    /// `self` yields the current service's type and a type reference its own
    /// type name; a name reference resolves the target definition first if its
    /// type is still unknown.
    pub fn resolve_reference_type(&mut self, reference: &Reference, scope: &ServiceScope) -> ResolveResult<Option<String>> {
        match reference {
            Reference::This => Ok(scope.ty.clone()),
            Reference::Type(ty) => Ok(Some(normalize_class_name(ty).to_string())),
            Reference::Name(_) => {
                let id = self.resolve_reference(reference, scope)?;
                if self.table.definition(id).ty().is_none() {
                    self.resolve_definition(id)?;
                }
                Ok(self.table.definition(id).ty().map(str::to_string))
            }
        }
    }

    /// The type of object the entity produces, or `None` when it cannot be known
    /// before the code runs.
    pub fn resolve_entity_type(&mut self, entity: &Entity, scope: &ServiceScope) -> ResolveResult<Option<String>> {
        let classes = self.classes;
        match self.normalize_entity(entity, scope)? {
            Entity::Call { target, member } => {
                let class = match *target {
                    Target::Global => None,
                    Target::Class(class) => Some(class),
                    Target::Reference(reference) => match self.resolve_reference_type(&reference, scope)? {
                        Some(ty) => Some(ty),
                        None => return Ok(None),
                    },
                    Target::Statement(inner) => match self.resolve_entity_type(&inner.entity, scope)? {
                        Some(ty) => Some(ty),
                        None => return Ok(None),
                    },
                    Target::Definition(_) => return Ok(None),
                };
                self.resolve_member_type(class.as_deref(), &member)
            }
            Entity::Reference(reference) => self.resolve_reference_type(&reference, scope),
            Entity::Container(call) => {
                self.resolve_reference_type(&Reference::Name(call.service().to_string()), scope)
            }
            Entity::Class(name) => {
                if classes.class_exists(&name) {
                    Ok(Some(normalize_class_name(&name).to_string()))
                } else if classes.interface_exists(&name) {
                    Err(ResolveError::creation(format!(
                        "Interface {} can not be used as 'factory', did you mean 'implement'?",
                        name
                    )))
                } else {
                    Err(ResolveError::creation(format!("Class {} not found.", name)))
                }
            }
            Entity::Literal(_) | Entity::Definition(_) => Ok(None),
        }
    }

    /// Declared type produced by `class::member` (or the global function `member`).
    fn resolve_member_type(&mut self, class: Option<&str>, member: &str) -> ResolveResult<Option<String>> {
        let classes = self.classes;
        let rendered = match class {
            Some(class) => format!("{}::{}", class, member),
            None => member.to_string(),
        };

        let (descriptor, declared, declaring) = match class {
            None => {
                let signature = classes.function(member).ok_or_else(|| {
                    ResolveError::creation(format!("Function {}() doesn't exist.", member))
                })?;
                (signature.to_string(), signature.return_type.clone(), None)
            }
            Some(class) => {
                if let Some(property) = member.strip_prefix(PROPERTY_MARKER) {
                    let property = property.strip_suffix(APPEND_MARKER).unwrap_or(property);
                    let info = classes
                        .find_property(class, property)
                        .filter(|info| info.visibility == Visibility::Public)
                        .ok_or_else(|| {
                            ResolveError::creation(format!("Property {} is not accessible.", rendered))
                        })?;
                    (rendered.clone(), info.ty.clone(), Some(class.to_string()))
                } else {
                    let (declaring, method) = classes
                        .find_method(class, member)
                        .filter(|(declaring, method)| {
                            method.is_public() && (declaring.kind != ClassKind::Trait || method.is_static)
                        })
                        .ok_or_else(|| {
                            ResolveError::creation(format!("Method {}() is not callable.", rendered))
                        })?;
                    (
                        method.signature.to_string(),
                        method.signature.return_type.clone(),
                        Some(declaring.name.clone()),
                    )
                }
            }
        };
        self.add_dependency(Dependency::Callable(descriptor));

        let Some(declared) = declared else {
            return Ok(None);
        };
        let declared = declared.trim_start_matches('?');
        if matches!(declared, "object" | "mixed") {
            return Ok(None);
        }
        let ty = match (declared, declaring) {
            ("self" | "static", Some(declaring)) => declaring,
            _ => normalize_class_name(declared).to_string(),
        };
        if !classes.class_or_interface_exists(&ty) {
            return Err(ResolveError::creation(format!(
                "Class or interface '{}' not found. Is return type of {}() correct?",
                ty, rendered
            )));
        }
        Ok(Some(ty))
    }
}
