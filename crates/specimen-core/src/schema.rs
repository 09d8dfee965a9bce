//! Composite type catalog and resolved type descriptors.
//!
//! ## Type Hierarchy
//!
//! **Definitions** (as written by the user, may contain type parameters):
//! - `FieldDef` - Single field with its declared type and tags
//! - `CompositeDef` - Named composite with parameters, supertypes and fields
//! - `TypeCatalog` - Collection of composites loaded from YAML
//!
//! **Descriptors** (resolved, concrete):
//! - `TypeDescriptor` - Kind of a concrete `TypeRef` with substituted members
//!
//! `TypeRegistry::describe` derives a descriptor once per distinct type
//! expression and caches it, so every node of the same shape shares one
//! `Arc<TypeDescriptor>`.

use crate::error::{ConfigError, TypeError};
use crate::types::{CollectionKind, ScalarKind, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

// ============================================================================
// Definitions
// ============================================================================

/// Field of a composite definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Declared type, may reference the owner's type parameters
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Free-form tags usable by `tagged` selectors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FieldDef {
    /// Create a new untagged field.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag to this field.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Composite (record-like) type definition.
///
/// ```yaml
/// name: Tree
/// params: [E]
/// fields:
///   - name: value
///     type: E
///   - name: children
///     type: List<Tree<E>>
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositeDef {
    /// Type name
    pub name: String,

    /// Generic type parameter names
    #[serde(default)]
    pub params: Vec<String>,

    /// Abstract types need a subtype before they can be generated
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Names of the composites this type can stand in for
    #[serde(default)]
    pub implements: Vec<String>,

    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl CompositeDef {
    /// Create an empty, concrete, non-generic composite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            is_abstract: false,
            implements: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Declare a type parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Mark the type abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Declare a supertype.
    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.implements.push(name.into());
        self
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Append a prepared field (e.g. one carrying tags).
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Rewrite bare parameter names in field types into `TypeRef::Param`.
    fn normalized(mut self) -> Self {
        for field in &mut self.fields {
            field.ty = field.ty.bind_params(&self.params);
        }
        self
    }
}

/// Catalog of composite definitions, the YAML form of a `TypeRegistry`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeCatalog {
    /// Catalog format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Composite definitions
    #[serde(default)]
    pub types: Vec<CompositeDef>,
}

fn default_version() -> u32 {
    1
}

// ============================================================================
// Descriptors
// ============================================================================

/// Member of a described composite, with type parameters substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub tags: Vec<String>,
}

/// Raw kind of a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Scalar(ScalarKind),
    Array {
        element: TypeRef,
    },
    Collection {
        kind: CollectionKind,
        element: TypeRef,
    },
    Map {
        key: TypeRef,
        value: TypeRef,
    },
    Composite {
        name: String,
        is_abstract: bool,
        members: Vec<MemberDescriptor>,
    },
}

/// Structural description of a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// The described type expression
    pub ty: TypeRef,

    /// Raw kind with resolved members / element types
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Members of a composite; empty for every other kind.
    pub fn members(&self) -> &[MemberDescriptor] {
        match &self.kind {
            TypeKind::Composite { members, .. } => members,
            _ => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Composite { .. })
    }

    /// Arrays, collections and maps.
    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Array { .. } | TypeKind::Collection { .. } | TypeKind::Map { .. }
        )
    }

    pub fn is_abstract(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Composite {
                is_abstract: true,
                ..
            }
        )
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Registry of composite definitions with a descriptor cache.
///
/// The registry is built once and then shared read-only between sessions;
/// the cache is the only interior mutability and is safe to fill from
/// concurrent sessions.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Composite definitions by name
    defs: HashMap<String, CompositeDef>,

    /// Descriptors derived so far (not serialized)
    cache: RwLock<HashMap<TypeRef, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Create an empty registry; built-in types need no registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a YAML catalog file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a registry from a YAML catalog string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let catalog: TypeCatalog = serde_yaml::from_str(yaml)?;
        Self::from_catalog(catalog)
    }

    /// Build a registry from an in-memory catalog.
    pub fn from_catalog(catalog: TypeCatalog) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for def in catalog.types {
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Register a composite definition.
    pub fn register(&mut self, def: CompositeDef) -> Result<(), ConfigError> {
        if TypeRef::is_builtin_name(&def.name) {
            return Err(ConfigError::ReservedTypeName(def.name));
        }
        if self.defs.contains_key(&def.name) {
            return Err(ConfigError::DuplicateType(def.name));
        }
        self.defs.insert(def.name.clone(), def.normalized());
        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    /// Builder-style [`TypeRegistry::register`].
    pub fn with_type(mut self, def: CompositeDef) -> Result<Self, ConfigError> {
        self.register(def)?;
        Ok(self)
    }

    /// Get a composite definition by name.
    pub fn get(&self, name: &str) -> Option<&CompositeDef> {
        self.defs.get(name)
    }

    /// Names of all registered composites, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a concrete type expression into its (cached) descriptor.
    pub fn describe(&self, ty: &TypeRef) -> Result<Arc<TypeDescriptor>, TypeError> {
        if let Some(descriptor) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ty)
        {
            return Ok(Arc::clone(descriptor));
        }

        let descriptor = Arc::new(self.compute_descriptor(ty)?);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ty.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn compute_descriptor(&self, ty: &TypeRef) -> Result<TypeDescriptor, TypeError> {
        if let Some(param) = ty.first_param() {
            return Err(TypeError::UnresolvedTypeParameter {
                param: param.to_string(),
                location: format!("type '{ty}'"),
            });
        }

        let kind = match ty {
            TypeRef::Scalar(kind) => TypeKind::Scalar(*kind),
            TypeRef::Array(element) => TypeKind::Array {
                element: (**element).clone(),
            },
            TypeRef::Collection { kind, element } => TypeKind::Collection {
                kind: *kind,
                element: (**element).clone(),
            },
            TypeRef::Map { key, value } => TypeKind::Map {
                key: (**key).clone(),
                value: (**value).clone(),
            },
            TypeRef::Named { name, args } => self.describe_composite(ty, name, args)?,
            TypeRef::Param(param) => {
                return Err(TypeError::UnresolvedTypeParameter {
                    param: param.clone(),
                    location: format!("type '{ty}'"),
                })
            }
        };

        Ok(TypeDescriptor {
            ty: ty.clone(),
            kind,
        })
    }

    fn describe_composite(
        &self,
        ty: &TypeRef,
        name: &str,
        args: &[TypeRef],
    ) -> Result<TypeKind, TypeError> {
        let def = self
            .defs
            .get(name)
            .ok_or_else(|| TypeError::UnknownType(name.to_string()))?;

        if args.len() > def.params.len() {
            return Err(TypeError::Arity {
                name: name.to_string(),
                expected: def.params.len(),
                actual: args.len(),
            });
        }

        let bindings: HashMap<&str, &TypeRef> = def
            .params
            .iter()
            .map(String::as_str)
            .zip(args.iter())
            .collect();

        let members = def
            .fields
            .iter()
            .map(|field| {
                let member_ty = field.ty.substitute(&bindings).map_err(|param| {
                    TypeError::UnresolvedTypeParameter {
                        param,
                        location: format!("field '{}' of '{ty}'", field.name),
                    }
                })?;
                Ok(MemberDescriptor {
                    name: field.name.clone(),
                    ty: member_ty,
                    tags: field.tags.clone(),
                })
            })
            .collect::<Result<Vec<_>, TypeError>>()?;

        Ok(TypeKind::Composite {
            name: name.to_string(),
            is_abstract: def.is_abstract,
            members,
        })
    }

    /// Whether composite `name` is, or transitively implements, `target`.
    pub fn implements(&self, name: &str, target: &str) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![name];
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(def) = self.defs.get(current) {
                pending.extend(def.implements.iter().map(String::as_str));
            }
        }
        false
    }

    /// Whether a node declared as `declared` may be generated as `subtype`.
    ///
    /// Composites must implement the declared composite (type arguments are
    /// not compared); collections may switch between list and set when the
    /// element type is unchanged.
    pub fn is_assignable(&self, subtype: &TypeRef, declared: &TypeRef) -> bool {
        if subtype == declared {
            return true;
        }
        match (subtype, declared) {
            (TypeRef::Named { name: sub, .. }, TypeRef::Named { name: sup, .. }) => {
                self.implements(sub, sup)
            }
            (
                TypeRef::Collection { element: sub, .. },
                TypeRef::Collection { element: sup, .. },
            ) => sub == sup,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tree_registry() -> TypeRegistry {
        let yaml = r#"
version: 1
types:
  - name: Tree
    params: [E]
    fields:
      - name: value
        type: E
      - name: children
        type: List<Tree<E>>

  - name: Animal
    abstract: true
    fields:
      - name: name
        type: String

  - name: Dog
    implements: [Animal]
    fields:
      - name: name
        type: String
        tags: [display]
      - name: good
        type: bool

  - name: Puppy
    implements: [Dog]
"#;
        TypeRegistry::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_describe_substitutes_params() {
        let registry = tree_registry();
        let ty: TypeRef = "Tree<String>".parse().unwrap();

        let descriptor = registry.describe(&ty).unwrap();
        let members = descriptor.members();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "value");
        assert_eq!(members[0].ty, TypeRef::from(ScalarKind::String));
        assert_eq!(members[1].ty, "List<Tree<String>>".parse().unwrap());
    }

    #[test]
    fn test_describe_is_cached() {
        let registry = tree_registry();
        let ty: TypeRef = "Tree<i32>".parse().unwrap();

        let first = registry.describe(&ty).unwrap();
        let second = registry.describe(&ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unresolved_param() {
        let registry = tree_registry();
        let raw = TypeRef::named("Tree");

        let err = registry.describe(&raw).unwrap_err();
        assert_eq!(
            err,
            TypeError::UnresolvedTypeParameter {
                param: "E".to_string(),
                location: "field 'value' of 'Tree'".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_type_and_arity() {
        let registry = tree_registry();

        assert_eq!(
            registry.describe(&TypeRef::named("Cat")).unwrap_err(),
            TypeError::UnknownType("Cat".to_string())
        );
        assert!(matches!(
            registry.describe(&"Tree<i32, i64>".parse().unwrap()),
            Err(TypeError::Arity {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_param_at_root_is_unresolved() {
        let registry = tree_registry();
        let err = registry.describe(&TypeRef::list(TypeRef::param("E")));
        assert!(matches!(
            err,
            Err(TypeError::UnresolvedTypeParameter { .. })
        ));
    }

    #[test]
    fn test_assignability() {
        let registry = tree_registry();
        let animal = TypeRef::named("Animal");

        assert!(registry.is_assignable(&TypeRef::named("Dog"), &animal));
        assert!(registry.is_assignable(&TypeRef::named("Puppy"), &animal));
        assert!(!registry.is_assignable(&animal, &TypeRef::named("Dog")));
        assert!(registry.is_assignable(
            &TypeRef::set(ScalarKind::Int32),
            &TypeRef::list(ScalarKind::Int32)
        ));
        assert!(!registry.is_assignable(
            &TypeRef::set(ScalarKind::Int64),
            &TypeRef::list(ScalarKind::Int32)
        ));
    }

    #[test]
    fn test_abstract_and_tags() {
        let registry = tree_registry();

        assert!(registry.describe(&TypeRef::named("Animal")).unwrap().is_abstract());
        let dog = registry.describe(&TypeRef::named("Dog")).unwrap();
        assert!(!dog.is_abstract());
        assert_eq!(dog.members()[0].tags, vec!["display".to_string()]);
    }

    #[test]
    fn test_register_rejects_duplicates_and_builtins() {
        let mut registry = tree_registry();

        assert!(matches!(
            registry.register(CompositeDef::new("Tree")),
            Err(ConfigError::DuplicateType(_))
        ));
        assert!(matches!(
            registry.register(CompositeDef::new("List")),
            Err(ConfigError::ReservedTypeName(_))
        ));
        assert!(matches!(
            registry.register(CompositeDef::new("i32")),
            Err(ConfigError::ReservedTypeName(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "types:\n  - name: Point\n    fields:\n      - name: x\n        type: i32"
        )
        .unwrap();

        let registry = TypeRegistry::from_file(file.path()).unwrap();
        assert_eq!(registry.type_names(), vec!["Point"]);
    }

    #[test]
    fn test_builder_definitions_bind_params() {
        let registry = TypeRegistry::new()
            .with_type(
                CompositeDef::new("Pair")
                    .param("A")
                    .param("B")
                    .field("left", "A".parse::<TypeRef>().unwrap())
                    .field("right", TypeRef::param("B")),
            )
            .unwrap();

        let descriptor = registry
            .describe(&"Pair<i32, String>".parse().unwrap())
            .unwrap();
        assert_eq!(descriptor.members()[0].ty, ScalarKind::Int32.into());
        assert_eq!(descriptor.members()[1].ty, ScalarKind::String.into());
    }
}
