use wirebox_model::DefinitionId;

/// The service a statement is being completed for.
///
/// Passed by reference through every resolution call instead of living on the
/// resolver, so nested resolution of other definitions can never observe or
/// clobber it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceScope {
    /// The definition being completed, if it is registered in the table.
    pub service: Option<DefinitionId>,
    pub name: Option<String>,
    pub ty: Option<String>,
    /// Whether the current service may autowire itself (setup calls may,
    /// factories may not).
    pub self_allowed: bool,
}

impl ServiceScope {
    /// No current service, as used while resolving definition types.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn allowing_self(&self, allowed: bool) -> Self {
        Self { self_allowed: allowed, ..self.clone() }
    }

    /// True when `id` is the service being completed.
    pub fn is_current(&self, id: DefinitionId) -> bool {
        self.service == Some(id)
    }

    pub fn is_current_name(&self, name: &str) -> bool {
        self.service.is_some() && self.name.as_deref() == Some(name)
    }
}
