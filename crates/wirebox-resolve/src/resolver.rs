// The resolver: shared state of one build pass.

use wirebox_model::{ClassRegistry, DefinitionTable, Dependency};

use crate::stack::ResolutionStack;

/// Resolves and completes service definitions against a definition table.
///
/// The resolver borrows the table exclusively for the whole pass. Its only own
/// state is the [`ResolutionStack`]; the service being completed travels
/// explicitly as a [`ServiceScope`](crate::ServiceScope).
///
/// The operations live in the modules that implement them:
/// [`normalize`](crate::normalize), [`types`](crate::types),
/// [`statement`](crate::statement) and [`definition`](crate::definition).
pub struct Resolver<'a> {
    pub(crate) table: &'a mut dyn DefinitionTable,
    pub(crate) classes: &'a dyn ClassRegistry,
    pub(crate) stack: ResolutionStack,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a mut dyn DefinitionTable, classes: &'a dyn ClassRegistry) -> Self {
        Self { table, classes, stack: ResolutionStack::new() }
    }

    pub fn table(&self) -> &dyn DefinitionTable {
        &*self.table
    }

    pub fn classes(&self) -> &'a dyn ClassRegistry {
        self.classes
    }

    /// Definitions whose types are currently being resolved.
    pub fn stack(&self) -> &ResolutionStack {
        &self.stack
    }

    /// Records something the build depended on.
    pub fn add_dependency(&mut self, dependency: Dependency) {
        log::trace!("dependency {:?}", dependency);
        self.table.add_dependency(dependency);
    }

    /// Ends the type-resolution phase: autowiring lookups become available.
    pub fn finish_resolving(&mut self) {
        self.table.finish_resolving(self.classes);
    }
}
