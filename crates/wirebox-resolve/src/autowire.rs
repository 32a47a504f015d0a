//! Argument autowiring: filling in the arguments a configuration left out.
//!
//! Supplied arguments win. Missing class-typed parameters are looked up by
//! type, documented arrays of services collect every autowired service of the
//! element type, and everything else falls back to its declared default.

use wirebox_model::{ArgKey, Arguments, CallableSignature, ClassRegistry, Parameter, Reference, Value};

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use crate::scope::ServiceScope;

/// Source of services for autowiring.
pub trait ServiceGetter {
    /// The single autowired service of the type.
    ///
    /// Fails with a missing-service error when there is none, and with a
    /// creation error when the type is ambiguous.
    fn by_type(&mut self, ty: &str) -> ResolveResult<Value>;

    /// Every autowired service of the type.
    fn all_of_type(&mut self, ty: &str) -> ResolveResult<Vec<Value>>;
}

/// Matches supplied arguments to the parameters of `signature` and autowires
/// the rest.
///
/// Named arguments bind by parameter name (never to a variadic parameter),
/// positional ones by index. Positional extras after the last declared
/// parameter are appended. Trailing optional parameters whose value equals
/// their own default are dropped from the result, so that the callee applies
/// them itself; appended extras are never dropped. The output is keyed by
/// position only.
pub fn autowire_arguments(
    signature: &CallableSignature,
    arguments: &Arguments,
    getter: &mut dyn ServiceGetter,
    classes: &dyn ClassRegistry,
) -> ResolveResult<Arguments> {
    let mut remaining = arguments.clone();
    let mut resolved = Vec::with_capacity(signature.parameters.len());
    let mut optional_run = 0;

    for (index, param) in signature.parameters.iter().enumerate() {
        let name_key = ArgKey::Name(param.name.clone());
        let value = if !param.variadic && remaining.contains_key(&name_key) {
            remaining.shift_remove(&ArgKey::Pos(index));
            remaining.shift_remove(&name_key).unwrap_or(Value::Null)
        } else if let Some(value) = remaining.shift_remove(&ArgKey::Pos(index)) {
            value
        } else {
            autowire_argument(param, signature, getter, classes)?
        };
        optional_run = if param.optional && value == param.default_or_null() {
            optional_run + 1
        } else {
            0
        };
        resolved.push(value);
    }

    // Explicit extras are never trimmed.
    let mut index = signature.parameters.len();
    while let Some(value) = remaining.shift_remove(&ArgKey::Pos(index)) {
        resolved.push(value);
        optional_run = 0;
        index += 1;
    }

    if !remaining.is_empty() {
        return Err(ResolveError::creation(format!(
            "Unable to pass specified arguments to {}().",
            signature
        )));
    }

    resolved.truncate(resolved.len() - optional_run);
    Ok(resolved
        .into_iter()
        .enumerate()
        .map(|(index, value)| (ArgKey::Pos(index), value))
        .collect())
}

/// The value for a parameter nothing was supplied for.
pub fn autowire_argument(
    param: &Parameter,
    signature: &CallableSignature,
    getter: &mut dyn ServiceGetter,
    classes: &dyn ClassRegistry,
) -> ResolveResult<Value> {
    let desc = format!("${} in {}()", param.name, signature);

    if let Some(ty) = param.class_type() {
        let found = match getter.by_type(ty) {
            Ok(value) => Some(value),
            Err(err) if err.is_missing() => None,
            Err(err) => return Err(err.map_message(|message| format!("{} (needed by {})", message, desc))),
        };
        if let Some(value) = found {
            log::trace!("autowired {} with {:?}", desc, value);
            return Ok(value);
        }
        if param.allows_null() {
            return Ok(Value::Null);
        }
        return Err(if classes.class_or_interface_exists(ty) {
            ResolveError::creation(format!(
                "Service of type {} needed by {} not found. Did you register it in configuration file?",
                ty, desc
            ))
        } else {
            ResolveError::creation(format!(
                "Class {} needed by {} not found. Check type hint and 'use' statements.",
                ty, desc
            ))
        });
    }

    if param.is_array() {
        if let Some(element) = param.element_type.as_deref() {
            if classes.class_or_interface_exists(element) {
                let all = getter.all_of_type(element)?;
                log::trace!("autowired {} with {} services of type {}", desc, all.len(), element);
                return Ok(Value::List(all));
            }
        }
    }

    if (param.ty.is_some() && param.allows_null()) || param.optional || param.default.is_some() {
        return Ok(param.default_or_null());
    }

    Err(ResolveError::creation(format!(
        "Parameter {} has no class type hint or default value, so its value must be specified.",
        desc
    )))
}

/// Autowires from the definition table, on behalf of the service in `scope`.
pub(crate) struct ScopedGetter<'r, 'a> {
    pub(crate) resolver: &'r mut Resolver<'a>,
    pub(crate) scope: &'r ServiceScope,
}

impl ServiceGetter for ScopedGetter<'_, '_> {
    fn by_type(&mut self, ty: &str) -> ResolveResult<Value> {
        Ok(Value::Reference(self.resolver.get_by_type(ty, self.scope)?))
    }

    /// The current service is left out: a service never receives itself.
    fn all_of_type(&mut self, ty: &str) -> ResolveResult<Vec<Value>> {
        Ok(self
            .resolver
            .table
            .find_autowired(ty)?
            .into_iter()
            .filter(|(_, id)| !self.scope.is_current(*id))
            .map(|(name, _)| Value::Reference(Reference::Name(name)))
            .collect())
    }
}

impl Resolver<'_> {
    /// [`autowire_arguments`] against the definition table.
    pub fn autowire(
        &mut self,
        signature: &CallableSignature,
        arguments: &Arguments,
        scope: &ServiceScope,
    ) -> ResolveResult<Arguments> {
        let classes = self.classes;
        let mut getter = ScopedGetter { resolver: self, scope };
        autowire_arguments(signature, arguments, &mut getter, classes)
    }
}
