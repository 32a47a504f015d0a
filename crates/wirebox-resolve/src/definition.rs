//! Per-definition drivers: type resolution and completion.

use wirebox_model::entity::{NAMESPACE_SEPARATOR, RAW_EXPRESSION_MARKER, REFERENCE_MARKER};
use wirebox_model::{
    ContainerCall, Definition, DefinitionId, DefinitionKind, Dependency, Entity, Reference, Statement,
};

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use crate::scope::ServiceScope;

/// A definition after completion, ready for code generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedDefinition {
    pub id: DefinitionId,
    pub name: Option<String>,
    pub ty: String,
    /// `None` for services supplied from outside the container.
    pub factory: Option<Statement>,
    pub setup: Vec<Statement>,
}

impl Resolver<'_> {
    /// Determines the type of a definition, resolving whatever it depends on.
    ///
    /// Fails with a circular reference when the definition is already being
    /// resolved further up the stack.
    pub fn resolve_definition(&mut self, id: DefinitionId) -> ResolveResult<()> {
        let label = self.table.definition(id).label();
        let _guard = self.stack.enter(id, &label)?;
        log::debug!("resolving type of service `{}`", label);

        let result = match self.resolve_definition_type(id) {
            Ok(()) if self.table.definition(id).ty().is_none() => {
                Err(ResolveError::creation("Type of service is unknown."))
            }
            other => other,
        };
        result.map_err(|err| self.wrap_for(id, err))
    }

    fn resolve_definition_type(&mut self, id: DefinitionId) -> ResolveResult<()> {
        let definition = self.table.definition(id);
        let DefinitionKind::Service { factory, .. } = &definition.kind else {
            return Ok(());
        };
        let factory = factory.as_ref().map(|factory| factory.entity.clone());
        let has_type = definition.ty().is_some();

        match (&factory, has_type) {
            (None, false) => {
                return Err(ResolveError::creation(
                    "Factory and type are missing in definition of service.",
                ));
            }
            (Some(entity), false) => {
                let ty = self
                    .resolve_entity_type(entity, &ServiceScope::detached())?
                    .ok_or_else(|| {
                        ResolveError::creation(
                            "Unknown type of service, declare return type of factory method.",
                        )
                    })?;
                self.table.definition_mut(id).resolve_type_once(ty.clone());
                self.add_dependency(Dependency::Type(ty));
            }
            _ => {}
        }

        let definition = self.table.definition_mut(id);
        if definition.autowired && matches!(factory, Some(Entity::Reference(_))) {
            log::debug!("service `{}` is an alias, autowiring disabled", definition.label());
            definition.autowired = false;
        }
        Ok(())
    }

    /// Completes the factory and setup of a definition whose type is resolved.
    ///
    /// The stored definition is left as it is.
    pub fn complete_definition(&mut self, id: DefinitionId) -> ResolveResult<CompletedDefinition> {
        let definition = self.table.definition(id).clone();
        let scope = ServiceScope {
            service: self.table.is_registered(id).then_some(id),
            name: self.table.name_of(id).map(str::to_string),
            ty: definition.ty().map(str::to_string),
            self_allowed: false,
        };
        log::debug!("completing service `{}`", definition.label());

        match self.complete_service(id, &definition, &scope) {
            Ok(completed) => {
                self.add_dependency(Dependency::Type(completed.ty.clone()));
                Ok(completed)
            }
            Err(err) => Err(self.wrap_for(id, err)),
        }
    }

    fn complete_service(
        &mut self,
        id: DefinitionId,
        definition: &Definition,
        scope: &ServiceScope,
    ) -> ResolveResult<CompletedDefinition> {
        let ty = scope.ty.clone();
        let (factory, setup) = match &definition.kind {
            DefinitionKind::Imported => (None, Vec::new()),
            DefinitionKind::Service { factory, setup } => {
                let factory = match (factory, &ty) {
                    (Some(factory), _) => factory.clone(),
                    (None, Some(ty)) => Statement::new(Entity::Class(ty.clone())),
                    (None, None) => {
                        return Err(ResolveError::creation(
                            "Factory and type are missing in definition of service.",
                        ));
                    }
                };
                let alias = match &factory.entity {
                    Entity::Reference(reference) if factory.arguments.is_empty() && setup.is_empty() => {
                        Some(self.normalize_reference(reference, scope)?)
                    }
                    _ => None,
                };
                let factory = match alias {
                    Some(Reference::This) => {
                        let service = scope.name.clone().unwrap_or_else(|| Reference::This.value().to_string());
                        Statement::new(Entity::Container(ContainerCall::Get(service)))
                    }
                    Some(target) => Statement::new(Entity::Container(ContainerCall::Get(target.value().to_string()))),
                    None => factory,
                };
                let factory = self.complete_statement(&factory, scope)?;

                let setup_scope = scope.allowing_self(true);
                let setup = setup
                    .iter()
                    .map(|statement| self.complete_statement(&prepend_self(statement), &setup_scope))
                    .collect::<ResolveResult<Vec<_>>>()?;
                (Some(factory), setup)
            }
        };

        let ty = ty.ok_or_else(|| ResolveError::creation("Type of service is unknown."))?;
        Ok(CompletedDefinition { id, name: scope.name.clone(), ty, factory, setup })
    }

    /// Prefixes an error with the identity of the definition it occurred in.
    fn wrap_for(&self, id: DefinitionId, err: ResolveError) -> ResolveError {
        let definition = self.table.definition(id);
        let entity = definition
            .factory()
            .map(|factory| self.entity_to_string(&factory.entity, &ServiceScope::detached()));
        err.in_service(definition, entity)
    }
}

/// A setup entry naming a bare method (`setLogger`) or property (`$debug`) is a
/// call on the service itself.
fn prepend_self(statement: &Statement) -> Statement {
    match &statement.entity {
        Entity::Class(member) if !member.contains(is_qualifying_char) => {
            Statement::with_arguments(Entity::member_of(Reference::This, member.clone()), statement.arguments.clone())
        }
        _ => statement.clone(),
    }
}

fn is_qualifying_char(c: char) -> bool {
    c == ':' || c == REFERENCE_MARKER || c == RAW_EXPRESSION_MARKER || c == NAMESPACE_SEPARATOR
}
