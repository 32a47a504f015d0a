use wirebox_model::{ClassRegistry, Definition, DefinitionTable, ServiceTable};

use crate::config::{BuildConfig, CONTAINER_SERVICE};
use crate::definition::CompletedDefinition;
use crate::error::ResolveResult;
use crate::resolver::Resolver;

/// Runs a whole build over `table`.
///
/// Every registered definition has its type resolved first, in registration
/// order. Only then is autowiring by type enabled and each definition
/// completed. The first failure aborts the build.
pub fn build(
    table: &mut ServiceTable,
    classes: &dyn ClassRegistry,
    config: &BuildConfig,
) -> ResolveResult<Vec<CompletedDefinition>> {
    if let Some(ty) = &config.container_type {
        if !table.has_definition(CONTAINER_SERVICE) {
            table.add(Definition::imported(Some(ty.clone())).named(CONTAINER_SERVICE))?;
        }
    }
    table.exclude_types(&config.excluded_types);

    let mut resolver = Resolver::new(table, classes);
    let definitions = resolver.table().definitions();
    log::debug!("resolving {} service definitions", definitions.len());

    for id in &definitions {
        resolver.resolve_definition(*id)?;
    }
    resolver.finish_resolving();

    let completed = definitions
        .iter()
        .map(|id| resolver.complete_definition(*id))
        .collect::<ResolveResult<Vec<_>>>()?;
    log::debug!("completed {} service definitions", completed.len());
    Ok(completed)
}
