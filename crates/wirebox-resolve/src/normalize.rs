//! Canonicalization of entities and references.
//!
//! After normalization an entity is a class name, a literal, a reference in
//! `self`/name form (or type form while autowiring is unavailable), or a call
//! whose target is one of those. Raw definition handles are replaced by name
//! references.

use wirebox_model::entity::RAW_EXPRESSION_MARKER;
use wirebox_model::{DefinitionId, Entity, Reference, TableError, Target};

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use crate::scope::ServiceScope;

enum TypeLookup {
    Found(Reference),
    NotAllowed,
}

impl Resolver<'_> {
    pub fn normalize_entity(&self, entity: &Entity, scope: &ServiceScope) -> ResolveResult<Entity> {
        Ok(match entity {
            Entity::Class(text) if text.contains(RAW_EXPRESSION_MARKER) => Entity::Literal(text.clone()),
            Entity::Definition(id) => Entity::Reference(self.definition_reference(*id, scope)?),
            Entity::Reference(reference) => Entity::Reference(self.normalize_reference(reference, scope)?),
            Entity::Call { target, member } => {
                let target = match target.as_ref() {
                    Target::Definition(id) => Target::Reference(self.definition_reference(*id, scope)?),
                    Target::Reference(reference) => {
                        Target::Reference(self.normalize_reference(reference, scope)?)
                    }
                    other => other.clone(),
                };
                Entity::call(target, member.clone())
            }
            other => other.clone(),
        })
    }

    /// Canonical form of a reference.
    ///
    /// A name reference must exist and becomes `self` when it names the current
    /// service. A type reference is autowired to a name when lookups by type are
    /// available and stays a type reference otherwise.
    pub fn normalize_reference(&self, reference: &Reference, scope: &ServiceScope) -> ResolveResult<Reference> {
        match reference {
            Reference::This => Ok(Reference::This),
            Reference::Name(name) => {
                if !self.table.has_definition(name) {
                    Err(ResolveError::creation(format!("Reference to missing service '{}'.", name)))
                } else if scope.is_current_name(name) {
                    Ok(Reference::This)
                } else {
                    Ok(reference.clone())
                }
            }
            Reference::Type(ty) => match self.lookup_by_type(ty, scope)? {
                TypeLookup::Found(found) => Ok(found),
                TypeLookup::NotAllowed => Ok(reference.clone()),
            },
        }
    }

    /// The autowired service of the given type.
    ///
    /// Resolves to `self` when the current service may autowire itself and is
    /// of a matching type. Otherwise the table decides; the current service is
    /// never returned while self-autowiring is disallowed.
    pub fn get_by_type(&self, ty: &str, scope: &ServiceScope) -> ResolveResult<Reference> {
        match self.lookup_by_type(ty, scope)? {
            TypeLookup::Found(found) => Ok(found),
            TypeLookup::NotAllowed => Err(TableError::NotAllowedDuringResolving.into()),
        }
    }

    fn lookup_by_type(&self, ty: &str, scope: &ServiceScope) -> ResolveResult<TypeLookup> {
        if scope.service.is_some() && scope.self_allowed {
            if let Some(current) = &scope.ty {
                if self.classes.is_subtype(current, ty) {
                    return Ok(TypeLookup::Found(Reference::This));
                }
            }
        }

        let name = match self.table.get_by_type(ty, true) {
            Ok(Some(name)) => name,
            Ok(None) => {
                return Err(ResolveError::missing(format!("Service of type '{}' not found.", ty)));
            }
            Err(TableError::NotAllowedDuringResolving) => return Ok(TypeLookup::NotAllowed),
            Err(err) => return Err(err.into()),
        };
        if !scope.self_allowed && scope.service == Some(self.table.get_definition(&name)?) {
            return Err(ResolveError::missing(format!(
                "Service of type '{}' not found, except the service itself.",
                ty
            )));
        }
        Ok(TypeLookup::Found(Reference::Name(name)))
    }

    /// Name reference to a raw definition handle.
    pub(crate) fn definition_reference(&self, id: DefinitionId, scope: &ServiceScope) -> ResolveResult<Reference> {
        let Some(name) = self.table.name_of(id).map(str::to_string) else {
            return Err(ResolveError::creation(format!(
                "Service '{}' not found in definitions.",
                self.table.definition(id).label()
            )));
        };
        self.normalize_reference(&Reference::Name(name), scope)
    }
}
