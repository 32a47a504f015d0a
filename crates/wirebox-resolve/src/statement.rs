//! Statement completion.
//!
//! Turns a statement as written in the configuration into one the code
//! generator can emit directly: the entity is canonical, the callee is known to
//! exist and be callable, every argument is present, and nested statements and
//! references inside the arguments are completed the same way.

use indexmap::IndexMap;
use wirebox_model::entity::{
    is_member_name, APPEND_MARKER, MEMBER_SEPARATOR, NEGATION, PROPERTY_MARKER, REFERENCE_MARKER, SELF,
    TYPED,
};
use wirebox_model::value::is_list;
use wirebox_model::{
    ArgKey, Arguments, ClassKind, ContainerCall, Dependency, Entity, Reference, Statement, Target, Value,
};

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use crate::scope::ServiceScope;

impl Resolver<'_> {
    /// Completes a statement on behalf of the service in `scope`.
    ///
    /// The input is left untouched; a new statement is returned.
    pub fn complete_statement(&mut self, statement: &Statement, scope: &ServiceScope) -> ResolveResult<Statement> {
        let entity = self.normalize_entity(&statement.entity, scope)?;
        let arguments = self.convert_references(&statement.arguments, scope)?;
        let (entity, arguments) = self.complete_entity(entity, arguments, scope)?;

        let arguments = match self.complete_arguments(&arguments, scope) {
            Ok(arguments) => arguments,
            Err(err @ ResolveError::ServiceCreation { .. }) => {
                return Err(err.used_in(&self.entity_to_string(&entity, scope)));
            }
            Err(err) => return Err(err),
        };
        Ok(Statement::with_arguments(entity, arguments))
    }

    fn complete_entity(
        &mut self,
        entity: Entity,
        arguments: Arguments,
        scope: &ServiceScope,
    ) -> ResolveResult<(Entity, Arguments)> {
        let classes = self.classes;
        match entity {
            Entity::Class(name) if name == NEGATION => {
                if arguments.len() != 1 {
                    return Err(ResolveError::creation(format!(
                        "Function {}() expects 1 parameter, {} given.",
                        NEGATION,
                        arguments.len()
                    )));
                }
                Ok((Entity::function("!"), arguments))
            }

            Entity::Class(name) => {
                let info = classes
                    .class(&name)
                    .filter(|info| info.kind == ClassKind::Class)
                    .ok_or_else(|| ResolveError::creation(format!("Class {} not found.", name)))?;
                if info.is_abstract {
                    return Err(ResolveError::creation(format!("Class {} is abstract.", name)));
                }
                let arguments = match classes.find_constructor(&name) {
                    Some(constructor) if !constructor.is_public() => {
                        return Err(ResolveError::creation(format!(
                            "Class {} has {} constructor.",
                            name, constructor.visibility
                        )));
                    }
                    Some(constructor) => {
                        let arguments = self.autowire(&constructor.signature, &arguments, scope)?;
                        self.add_dependency(Dependency::Callable(constructor.signature.to_string()));
                        arguments
                    }
                    None if !arguments.is_empty() => {
                        return Err(ResolveError::creation(format!(
                            "Unable to pass arguments, class {} has no constructor.",
                            name
                        )));
                    }
                    None => arguments,
                };
                Ok((Entity::Class(name), arguments))
            }

            Entity::Reference(reference) => {
                let service = match reference {
                    Reference::This => scope.name.clone().unwrap_or_else(|| SELF.to_string()),
                    other => other.value().to_string(),
                };
                Ok((Entity::Container(ContainerCall::Create(service)), arguments))
            }

            Entity::Call { target, member } => {
                if !is_member_name(&member) {
                    return Err(ResolveError::creation(format!(
                        "Expected function, method or property name, '{}' given.",
                        member
                    )));
                }
                self.complete_call(*target, member, arguments, scope)
            }

            other @ (Entity::Literal(_) | Entity::Container(_) | Entity::Definition(_)) => Ok((other, arguments)),
        }
    }

    fn complete_call(
        &mut self,
        target: Target,
        member: String,
        arguments: Arguments,
        scope: &ServiceScope,
    ) -> ResolveResult<(Entity, Arguments)> {
        let classes = self.classes;

        if let Target::Global = target {
            if !is_list(&arguments) {
                return Err(ResolveError::creation(format!(
                    "Unable to pass specified arguments to {}().",
                    member
                )));
            }
            let signature = classes
                .function(&member)
                .ok_or_else(|| ResolveError::creation(format!("Function {}() doesn't exist.", member)))?;
            let arguments = self.autowire(signature, &arguments, scope)?;
            self.add_dependency(Dependency::Callable(signature.to_string()));
            return Ok((Entity::function(member), arguments));
        }

        let target = match target {
            Target::Statement(inner) => Target::Statement(self.complete_statement(&inner, scope)?),
            other => other,
        };

        if member.starts_with(PROPERTY_MARKER) {
            if !is_list(&arguments) || arguments.len() > 1 {
                return Err(ResolveError::creation(format!(
                    "Setup arguments for '{}' must be a list of at most one value.",
                    Entity::call(target, member)
                )));
            }
            if arguments.is_empty() && member.ends_with(APPEND_MARKER) {
                return Err(ResolveError::creation(format!("Missing argument for {}.", member)));
            }
            return Ok((Entity::call(target, member), arguments));
        }

        let ty = match &target {
            Target::Reference(reference) => self.resolve_reference_type(reference, scope)?,
            Target::Statement(inner) => self.resolve_entity_type(&inner.entity, scope)?,
            Target::Class(class) => self.resolve_entity_type(&Entity::Class(class.clone()), scope)?,
            Target::Global | Target::Definition(_) => None,
        };
        let Some(ty) = ty else {
            return Ok((Entity::call(target, member), arguments));
        };

        let arguments = match classes.find_method(&ty, &member) {
            Some((_, method)) if !method.is_public() => {
                return Err(ResolveError::creation(format!("{}::{}() is not callable.", ty, member)));
            }
            Some((_, method)) => {
                let arguments = self.autowire(&method.signature, &arguments, scope)?;
                self.add_dependency(Dependency::Callable(method.signature.to_string()));
                arguments
            }
            None if !is_list(&arguments) => {
                return Err(ResolveError::creation(format!(
                    "Unable to pass specified arguments to {}::{}().",
                    ty, member
                )));
            }
            None => arguments,
        };
        Ok((Entity::call(target, member), arguments))
    }

    /// Completes every value of an argument tree.
    pub fn complete_arguments(&mut self, arguments: &Arguments, scope: &ServiceScope) -> ResolveResult<Arguments> {
        arguments
            .iter()
            .map(|(key, value)| -> ResolveResult<(ArgKey, Value)> {
                Ok((key.clone(), self.complete_value(value, scope)?))
            })
            .collect()
    }

    fn complete_value(&mut self, value: &Value, scope: &ServiceScope) -> ResolveResult<Value> {
        Ok(match value {
            Value::Statement(statement) => match &statement.entity {
                Entity::Class(query) if statement.entity.is_collection_query() => {
                    let services = self.collect_services(query, &statement.arguments, scope)?;
                    self.complete_value(&Value::List(services), scope)?
                }
                _ => Value::statement(self.complete_statement(statement, scope)?),
            },
            Value::Definition(id) => Value::Reference(self.definition_reference(*id, scope)?),
            Value::Reference(reference) => Value::Reference(self.normalize_reference(reference, scope)?),
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.complete_value(item, scope))
                    .collect::<ResolveResult<Vec<_>>>()?,
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(key, item)| -> ResolveResult<(String, Value)> {
                        Ok((key.clone(), self.complete_value(item, scope)?))
                    })
                    .collect::<ResolveResult<IndexMap<_, _>>>()?,
            ),
            other => other.clone(),
        })
    }

    /// References to every service of the given types or with the given tags,
    /// leaving out the current service.
    fn collect_services(&self, query: &str, arguments: &Arguments, scope: &ServiceScope) -> ResolveResult<Vec<Value>> {
        let mut services = Vec::new();
        for argument in arguments.values() {
            let Some(key) = argument.as_str() else {
                return Err(ResolveError::creation(format!(
                    "Arguments of '{}' must be type or tag names.",
                    query
                )));
            };
            let names: Vec<String> = if query == TYPED {
                self.table.find_autowired(key)?.into_keys().collect()
            } else {
                self.table.find_by_tag(key).into_keys().collect()
            };
            services.extend(
                names
                    .into_iter()
                    .filter(|name| !scope.is_current_name(name))
                    .map(|name| Value::Reference(Reference::Name(name))),
            );
        }
        Ok(services)
    }

    /// Expands the textual reference shorthand inside an argument tree.
    ///
    /// `@service` is a reference, `@service::CONSTANT` a class constant of the
    /// service's type, `@service::property` a property read, and `@@` escapes a
    /// literal `@`. Nested statements are left for their own completion.
    pub fn convert_references(&mut self, arguments: &Arguments, scope: &ServiceScope) -> ResolveResult<Arguments> {
        arguments
            .iter()
            .map(|(key, value)| -> ResolveResult<(ArgKey, Value)> {
                Ok((key.clone(), self.convert_value(value, scope)?))
            })
            .collect()
    }

    fn convert_value(&mut self, value: &Value, scope: &ServiceScope) -> ResolveResult<Value> {
        Ok(match value {
            Value::String(text) => self.convert_text(text, scope)?,
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.convert_value(item, scope))
                    .collect::<ResolveResult<Vec<_>>>()?,
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(key, item)| -> ResolveResult<(String, Value)> {
                        Ok((key.clone(), self.convert_value(item, scope)?))
                    })
                    .collect::<ResolveResult<IndexMap<_, _>>>()?,
            ),
            other => other.clone(),
        })
    }

    fn convert_text(&mut self, text: &str, scope: &ServiceScope) -> ResolveResult<Value> {
        let Some(rest) = text.strip_prefix(REFERENCE_MARKER) else {
            return Ok(Value::string(text));
        };
        if rest.starts_with(REFERENCE_MARKER) {
            return Ok(Value::string(rest));
        }
        if rest.is_empty() {
            return Ok(Value::string(text));
        }

        let Some((target, member)) = rest.split_once(MEMBER_SEPARATOR) else {
            return Ok(Value::Reference(Reference::from_target(rest)));
        };
        let reference = Reference::from_target(target);
        if is_constant_name(member) {
            let ty = self.resolve_reference_type(&reference, scope)?.ok_or_else(|| {
                ResolveError::creation(format!(
                    "Unable to resolve constant {}, type of service '{}' is unknown.",
                    text, target
                ))
            })?;
            Ok(Value::Literal(format!("{}{}{}", ty, MEMBER_SEPARATOR, member)))
        } else {
            Ok(Value::statement(Statement::new(Entity::member_of(
                reference,
                format!("{}{}", PROPERTY_MARKER, member),
            ))))
        }
    }

    /// Human-readable call site of an entity, used in error messages.
    pub fn entity_to_string(&self, entity: &Entity, scope: &ServiceScope) -> String {
        let reference_to_text = |reference: &Reference| match (reference, &scope.name) {
            (Reference::This, Some(name)) if scope.service.is_some() => format!("{}{}", REFERENCE_MARKER, name),
            _ => reference.to_string(),
        };
        match entity {
            Entity::Class(class) => format!("{}{}__construct()", class, MEMBER_SEPARATOR),
            Entity::Reference(reference) => reference_to_text(reference),
            Entity::Call { target, member } => {
                let member = if member.contains(PROPERTY_MARKER) {
                    member.clone()
                } else {
                    format!("{}()", member)
                };
                match target.as_ref() {
                    Target::Class(class) => format!("{}{}{}", class, MEMBER_SEPARATOR, member),
                    Target::Reference(reference) => {
                        format!("{}{}{}", reference_to_text(reference), MEMBER_SEPARATOR, member)
                    }
                    Target::Global | Target::Definition(_) | Target::Statement(_) => member,
                }
            }
            Entity::Literal(text) => text.clone(),
            Entity::Definition(id) => id.to_string(),
            Entity::Container(call) => format!("{}{}", REFERENCE_MARKER, call.service()),
        }
    }
}

/// `CONSTANT`-style member names: an upper-case letter, then upper-case
/// letters, digits and underscores.
fn is_constant_name(member: &str) -> bool {
    let mut chars = member.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_names() {
        assert!(is_constant_name("MAX_SIZE"));
        assert!(is_constant_name("V2"));
        assert!(!is_constant_name("maxSize"));
        assert!(!is_constant_name("Max"));
        assert!(!is_constant_name(""));
    }
}
