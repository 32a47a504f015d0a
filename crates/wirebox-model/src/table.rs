// The definition table: storage and lookup of service definitions.

use fxhash::FxHashMap;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::definition::{Definition, DefinitionId};
use crate::error::TableError;
use crate::registry::ClassRegistry;
use crate::signature::normalize_class_name;
use crate::value::Value;

/// Something the build depended on, recorded for external cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dependency {
    /// A function or method, by its rendered descriptor (`Class::method`).
    Callable(String),
    /// A class or interface.
    Type(String),
}

/// Storage of service definitions, addressed by stable handles.
///
/// The resolver owns the table exclusively for the duration of a build.
pub trait DefinitionTable {
    fn has_definition(&self, name: &str) -> bool;

    fn get_definition(&self, name: &str) -> Result<DefinitionId, TableError>;

    /// Registered definitions, in registration order.
    fn definitions(&self) -> Vec<DefinitionId>;

    fn definition(&self, id: DefinitionId) -> &Definition;

    fn definition_mut(&mut self, id: DefinitionId) -> &mut Definition;

    /// The name under which the handle is registered, if it is registered.
    fn name_of(&self, id: DefinitionId) -> Option<&str>;

    fn is_registered(&self, id: DefinitionId) -> bool {
        self.name_of(id).is_some()
    }

    /// Name of the single autowired service of the given type.
    ///
    /// Fails when several services match; when none does, fails if
    /// `throw_on_missing` is set and returns `None` otherwise.
    fn get_by_type(&self, ty: &str, throw_on_missing: bool) -> Result<Option<String>, TableError>;

    /// All autowired services of the given type, in registration order.
    fn find_autowired(&self, ty: &str) -> Result<IndexMap<String, DefinitionId>, TableError>;

    /// All services carrying the tag, with the tag's value.
    fn find_by_tag(&self, tag: &str) -> IndexMap<String, Value>;

    fn add_dependency(&mut self, dependency: Dependency);

    /// Ends the type-resolution phase and enables lookups by type.
    fn finish_resolving(&mut self, classes: &dyn ClassRegistry);
}

struct Slot {
    definition: Definition,
    registered: bool,
}

/// In-memory [`DefinitionTable`].
pub struct ServiceTable {
    slots: Vec<Slot>,
    names: FxHashMap<String, DefinitionId>,
    order: Vec<DefinitionId>,
    /// Type -> autowired service names. `None` while types are being resolved.
    autowiring: Option<FxHashMap<String, Vec<String>>>,
    excluded_types: Vec<String>,
    dependencies: IndexSet<Dependency>,
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceTable {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            names: FxHashMap::default(),
            order: Vec::new(),
            autowiring: None,
            excluded_types: Vec::new(),
            dependencies: IndexSet::new(),
        }
    }

    /// Types that are never used as autowiring keys.
    pub fn with_excluded_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_types(types);
        self
    }

    pub fn exclude_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_types.extend(
            types.into_iter().map(|ty| normalize_class_name(ty.as_ref()).to_string()),
        );
        self.autowiring = None;
    }

    /// Registers a definition. Anonymous definitions get the next free numeric name.
    pub fn add(&mut self, mut definition: Definition) -> Result<DefinitionId, TableError> {
        let name = match definition.name.take() {
            Some(name) if self.names.contains_key(&name) => {
                return Err(TableError::DuplicateService { name });
            }
            Some(name) => name,
            None => self.next_anonymous_name(),
        };
        definition.name = Some(name.clone());
        let id = self.push(definition, true);
        self.names.insert(name, id);
        self.order.push(id);
        // New services invalidate the autowiring index.
        self.autowiring = None;
        Ok(id)
    }

    /// Stores a definition that is not part of the container's service list.
    pub fn add_detached(&mut self, definition: Definition) -> DefinitionId {
        self.push(definition, false)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    pub fn is_resolving(&self) -> bool {
        self.autowiring.is_none()
    }

    fn push(&mut self, definition: Definition, registered: bool) -> DefinitionId {
        let id = DefinitionId(self.slots.len() as u32);
        self.slots.push(Slot { definition, registered });
        id
    }

    fn next_anonymous_name(&self) -> String {
        let mut counter = self.order.len() + 1;
        loop {
            let candidate = format!("{:02}", counter);
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn autowiring(&self) -> Result<&FxHashMap<String, Vec<String>>, TableError> {
        self.autowiring.as_ref().ok_or(TableError::NotAllowedDuringResolving)
    }
}

impl DefinitionTable for ServiceTable {
    fn has_definition(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    fn get_definition(&self, name: &str) -> Result<DefinitionId, TableError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| TableError::missing(format!("Service '{}' not found.", name)))
    }

    fn definitions(&self) -> Vec<DefinitionId> {
        self.order.clone()
    }

    fn definition(&self, id: DefinitionId) -> &Definition {
        &self.slots[id.index()].definition
    }

    fn definition_mut(&mut self, id: DefinitionId) -> &mut Definition {
        &mut self.slots[id.index()].definition
    }

    fn name_of(&self, id: DefinitionId) -> Option<&str> {
        let slot = self.slots.get(id.index())?;
        if slot.registered {
            slot.definition.name.as_deref()
        } else {
            None
        }
    }

    fn get_by_type(&self, ty: &str, throw_on_missing: bool) -> Result<Option<String>, TableError> {
        let ty = normalize_class_name(ty);
        let candidates = self.autowiring()?.get(ty).map(Vec::as_slice).unwrap_or(&[]);
        match candidates {
            [] if throw_on_missing => {
                Err(TableError::missing(format!("Service of type '{}' not found.", ty)))
            }
            [] => Ok(None),
            [single] => Ok(Some(single.clone())),
            many => {
                let mut candidates = many.to_vec();
                candidates.sort();
                Err(TableError::AmbiguousService { ty: ty.to_string(), candidates })
            }
        }
    }

    fn find_autowired(&self, ty: &str) -> Result<IndexMap<String, DefinitionId>, TableError> {
        let ty = normalize_class_name(ty);
        let names = self.autowiring()?.get(ty).cloned().unwrap_or_default();
        Ok(names
            .into_iter()
            .filter_map(|name| {
                let id = self.names.get(&name).copied()?;
                Some((name, id))
            })
            .collect())
    }

    fn find_by_tag(&self, tag: &str) -> IndexMap<String, Value> {
        self.order
            .iter()
            .filter_map(|id| {
                let definition = self.definition(*id);
                let value = definition.tags.get(tag)?;
                Some((definition.name.clone()?, value.clone()))
            })
            .collect()
    }

    fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies.insert(dependency);
    }

    fn finish_resolving(&mut self, classes: &dyn ClassRegistry) {
        let mut index: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for id in &self.order {
            let definition = &self.slots[id.index()].definition;
            let (Some(name), Some(ty)) = (&definition.name, definition.ty()) else {
                continue;
            };
            if !definition.autowired {
                continue;
            }
            for ancestor in classes.ancestors(ty) {
                if self.excluded_types.contains(&ancestor) {
                    continue;
                }
                index.entry(ancestor).or_default().push(name.clone());
            }
        }
        log::debug!("autowiring index built for {} types", index.len());
        self.autowiring = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::registry::{ClassIndex, ClassInfo};

    fn classes() -> ClassIndex {
        ClassIndex::new()
            .with_class(ClassInfo::interface("Logger"))
            .with_class(ClassInfo::class("FileLogger").extends("Logger"))
            .with_class(ClassInfo::class("NullLogger").extends("Logger"))
    }

    #[test]
    fn test_anonymous_names_and_duplicates() {
        let mut table = ServiceTable::new();
        let first = table.add(Definition::of_type("FileLogger")).unwrap();
        assert_eq!(table.name_of(first), Some("01"));
        table.add(Definition::of_type("FileLogger").named("file")).unwrap();
        let err = table.add(Definition::of_type("FileLogger").named("file")).unwrap_err();
        assert_eq!(err.to_string(), "Service 'file' has already been added.");
    }

    #[test]
    fn test_detached_definitions_are_not_registered() {
        let mut table = ServiceTable::new();
        let id = table.add_detached(Definition::service(Entity::class("FileLogger")).named("inner"));
        assert!(!table.is_registered(id));
        assert!(!table.has_definition("inner"));
        assert!(table.definitions().is_empty());
    }

    #[test]
    fn test_lookup_by_type_requires_finished_resolving() {
        let mut table = ServiceTable::new();
        table.add(Definition::of_type("FileLogger").named("file")).unwrap();
        assert_eq!(
            table.get_by_type("Logger", true),
            Err(TableError::NotAllowedDuringResolving)
        );
        table.finish_resolving(&classes());
        assert_eq!(table.get_by_type("\\Logger", true), Ok(Some("file".to_string())));
        assert_eq!(table.get_by_type("NullLogger", false), Ok(None));
        assert!(matches!(
            table.get_by_type("NullLogger", true),
            Err(TableError::MissingService { .. })
        ));
    }

    #[test]
    fn test_ambiguous_and_excluded_types() {
        let mut table = ServiceTable::new().with_excluded_types(["Logger"]);
        table.add(Definition::of_type("NullLogger").named("null")).unwrap();
        table.add(Definition::of_type("FileLogger").named("file")).unwrap();
        table.add(Definition::of_type("FileLogger").named("hidden").not_autowired()).unwrap();
        table.finish_resolving(&classes());
        assert_eq!(table.get_by_type("Logger", false), Ok(None));

        let mut table = ServiceTable::new();
        table.add(Definition::of_type("NullLogger").named("null")).unwrap();
        table.add(Definition::of_type("FileLogger").named("file")).unwrap();
        table.finish_resolving(&classes());
        let err = table.get_by_type("Logger", true).unwrap_err();
        assert_eq!(err.to_string(), "Multiple services of type Logger found: file, null");
        let all = table.find_autowired("Logger").unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["null", "file"]);
    }

    #[test]
    fn test_find_by_tag() {
        let mut table = ServiceTable::new();
        table.add(Definition::of_type("FileLogger").named("file").with_tag("log", true)).unwrap();
        table.add(Definition::of_type("NullLogger").named("null")).unwrap();
        let tagged = table.find_by_tag("log");
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged["file"], Value::Bool(true));
    }
}
