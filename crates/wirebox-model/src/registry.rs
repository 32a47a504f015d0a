// Reflection snapshot of the classes and functions visible to the build.

use fxhash::{FxHashMap, FxHashSet};
use indexmap::IndexMap;

use crate::signature::{normalize_class_name, Callable, CallableSignature, Parameter, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

/// A method as seen through reflection.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub visibility: Visibility,
    pub is_static: bool,
    pub signature: CallableSignature,
}

impl MethodInfo {
    pub fn public(class: &str, name: &str, parameters: Vec<Parameter>) -> Self {
        Self {
            visibility: Visibility::Public,
            is_static: false,
            signature: CallableSignature::method(class, name, parameters),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.signature.return_type = Some(ty.into());
        self
    }

    pub fn name(&self) -> &str {
        match &self.signature.callable {
            Callable::Method { name, .. } | Callable::Function(name) => name,
            Callable::Closure => "{closure}",
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub visibility: Visibility,
    pub ty: Option<String>,
}

/// A class, interface or trait.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    /// Direct supertypes: the parent class and implemented or extended interfaces.
    pub parents: Vec<String>,
    pub constructor: Option<MethodInfo>,
    pub methods: IndexMap<String, MethodInfo>,
    pub properties: IndexMap<String, PropertyInfo>,
}

impl ClassInfo {
    fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: normalize_class_name(name).to_string(),
            kind,
            is_abstract: matches!(kind, ClassKind::Interface),
            parents: Vec::new(),
            constructor: None,
            methods: IndexMap::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn trait_(name: &str) -> Self {
        Self::new(name, ClassKind::Trait)
    }

    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Adds a direct supertype (parent class or interface).
    pub fn extends(mut self, parent: &str) -> Self {
        self.parents.push(normalize_class_name(parent).to_string());
        self
    }

    /// Declares a public constructor with the given parameters.
    pub fn constructor(self, parameters: Vec<Parameter>) -> Self {
        self.constructor_with(Visibility::Public, parameters)
    }

    pub fn constructor_with(mut self, visibility: Visibility, parameters: Vec<Parameter>) -> Self {
        let ctor = MethodInfo::public(&self.name, "__construct", parameters).with_visibility(visibility);
        self.constructor = Some(ctor);
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.insert(method.name().to_string(), method);
        self
    }

    pub fn property(mut self, name: &str, visibility: Visibility, ty: Option<&str>) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertyInfo { visibility, ty: ty.map(str::to_string) },
        );
        self
    }
}

/// Read access to the classes and functions known to the build.
///
/// Only [`class`](ClassRegistry::class) and [`function`](ClassRegistry::function)
/// must be provided; the remaining queries walk supertypes on top of them.
pub trait ClassRegistry {
    /// Looks up a class, interface or trait by (possibly fully qualified) name.
    fn class(&self, name: &str) -> Option<&ClassInfo>;

    /// Looks up a global function.
    fn function(&self, name: &str) -> Option<&CallableSignature>;

    fn class_exists(&self, name: &str) -> bool {
        self.class(name).map_or(false, |info| info.kind == ClassKind::Class)
    }

    fn interface_exists(&self, name: &str) -> bool {
        self.class(name).map_or(false, |info| info.kind == ClassKind::Interface)
    }

    fn class_or_interface_exists(&self, name: &str) -> bool {
        self.class_exists(name) || self.interface_exists(name)
    }

    /// The type itself followed by all of its supertypes, breadth first.
    fn ancestors(&self, name: &str) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(normalize_class_name(name).to_string());
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(info) = self.class(&current) {
                queue.extend(info.parents.iter().cloned());
            }
            out.push(current);
        }
        out
    }

    /// Whether a value of type `ty` is an instance of `of`.
    fn is_subtype(&self, ty: &str, of: &str) -> bool {
        let of = normalize_class_name(of);
        self.ancestors(ty).iter().any(|ancestor| ancestor == of)
    }

    /// Finds a method on the type or its supertypes, with its declaring type.
    fn find_method(&self, class: &str, method: &str) -> Option<(&ClassInfo, &MethodInfo)> {
        self.ancestors(class).into_iter().find_map(|ancestor| {
            let info = self.class(&ancestor)?;
            info.methods.get(method).map(|found| (info, found))
        })
    }

    /// The constructor declared by the class or inherited from a parent class.
    fn find_constructor(&self, class: &str) -> Option<&MethodInfo> {
        self.ancestors(class).into_iter().find_map(|ancestor| {
            let info = self.class(&ancestor)?;
            match info.kind {
                ClassKind::Class => info.constructor.as_ref(),
                _ => None,
            }
        })
    }

    fn find_property(&self, class: &str, property: &str) -> Option<&PropertyInfo> {
        self.ancestors(class)
            .into_iter()
            .find_map(|ancestor| self.class(&ancestor)?.properties.get(property))
    }
}

/// In-memory [`ClassRegistry`].
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    classes: FxHashMap<String, ClassInfo>,
    functions: FxHashMap<String, CallableSignature>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, info: ClassInfo) -> Self {
        self.add_class(info);
        self
    }

    pub fn with_function(mut self, signature: CallableSignature) -> Self {
        self.add_function(signature);
        self
    }

    pub fn add_class(&mut self, info: ClassInfo) {
        self.classes.insert(info.name.clone(), info);
    }

    pub fn add_function(&mut self, signature: CallableSignature) {
        let name = signature.callable.to_string();
        self.functions.insert(normalize_class_name(&name).to_string(), signature);
    }
}

impl ClassRegistry for ClassIndex {
    fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(normalize_class_name(name))
    }

    fn function(&self, name: &str) -> Option<&CallableSignature> {
        self.functions.get(normalize_class_name(name))
    }
}
