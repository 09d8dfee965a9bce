//! Immutable generation context shared by all sessions of a builder.

use crate::node::{NodeGraph, NodeRole};
use crate::select::Selector;
use crate::selector_map::SelectorMap;
use crate::subtype_map::SubtypeSelectorMap;
use specimen_core::{ConfigError, Settings, TypeRef, TypeRegistry, Value};
use specimen_generator::{ContainerSpec, EmitGenerator, ValueGenerator};
use std::fmt;
use std::sync::Arc;

/// What a selector does to the nodes it matches.
#[derive(Clone)]
pub enum Override {
    /// User generator
    Generator(Arc<dyn ValueGenerator>),
    /// Values from an emit queue
    Emit(Arc<EmitGenerator>),
    /// Literal value
    Value(Value),
    /// Size and subtype of an array, collection or map
    Container(ContainerSpec),
    /// Generate `null`
    Ignore,
}

impl Override {
    /// Subtype implied by this override, if any.
    pub fn declared_subtype(&self) -> Option<TypeRef> {
        match self {
            Self::Generator(generator) => generator.declared_subtype(),
            Self::Container(spec) => spec.declared_subtype().cloned(),
            Self::Emit(_) | Self::Value(_) | Self::Ignore => None,
        }
    }

    /// Composite named by a literal object value.
    pub fn assigned_subtype(&self) -> Option<TypeRef> {
        match self {
            Self::Value(Value::Object(object)) => Some(TypeRef::named(object.type_name.clone())),
            _ => None,
        }
    }
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generator(generator) => f
                .debug_struct("Generator")
                .field("subtype", &generator.declared_subtype())
                .finish_non_exhaustive(),
            Self::Emit(emit) => f.debug_tuple("Emit").field(emit).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Container(spec) => f.debug_tuple("Container").field(spec).finish(),
            Self::Ignore => write!(f, "Ignore"),
        }
    }
}

/// Registry, settings and rules of a builder.
///
/// The context is `Send + Sync`; sessions only borrow it.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub(crate) registry: Arc<TypeRegistry>,
    pub(crate) root: TypeRef,
    pub(crate) settings: Settings,
    pub(crate) overrides: SelectorMap<Override>,
    subtype_selectors: Vec<(Selector, TypeRef)>,
    pub(crate) subtypes: SubtypeSelectorMap,
}

impl GenerationContext {
    pub fn new(registry: Arc<TypeRegistry>, root: TypeRef) -> Self {
        Self {
            registry,
            root,
            settings: Settings::default(),
            overrides: SelectorMap::new(),
            subtype_selectors: Vec::new(),
            subtypes: SubtypeSelectorMap::default(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn root(&self) -> &TypeRef {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn overrides(&self) -> &SelectorMap<Override> {
        &self.overrides
    }

    pub fn subtypes(&self) -> &SubtypeSelectorMap {
        &self.subtypes
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub(crate) fn put_override(&mut self, selector: Selector, value: Override) {
        self.overrides.put(selector, value);
        self.rebuild_subtypes();
    }

    pub(crate) fn put_subtype(&mut self, selector: Selector, subtype: TypeRef) {
        self.subtype_selectors.push((selector, subtype));
        self.rebuild_subtypes();
    }

    fn rebuild_subtypes(&mut self) {
        let entries = self.overrides.entries();
        let generator_subtypes = entries
            .iter()
            .filter_map(|e| Some((e.selector.clone(), e.value.declared_subtype()?)))
            .collect();
        let assignment_subtypes = entries
            .iter()
            .filter_map(|e| Some((e.selector.clone(), e.value.assigned_subtype()?)))
            .collect();
        self.subtypes = SubtypeSelectorMap::new(
            self.subtype_selectors.clone(),
            generator_subtypes,
            assignment_subtypes,
        );
    }

    /// Whether `selector` matches a map key anywhere in the graph.
    pub(crate) fn targets_map_key(&self, selector: &Selector) -> bool {
        self.first_map_key_match(&[selector]).is_some()
    }

    /// Fail if an emit rule with `null` items reaches a map key under the
    /// current subtypes and settings.
    pub(crate) fn check_null_map_keys(&self) -> Result<(), ConfigError> {
        let nullable: Vec<&Selector> = self
            .overrides
            .entries()
            .iter()
            .filter(|e| matches!(&e.value, Override::Emit(emit) if emit.has_null_items()))
            .map(|e| &e.selector)
            .collect();
        if nullable.is_empty() {
            return Ok(());
        }

        match self.first_map_key_match(&nullable) {
            Some(selector) => Err(ConfigError::NullMapKey {
                selector: selector.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// First of `selectors` that matches a map key node.
    ///
    /// Walks the full graph of the root type; branches that fail to resolve
    /// are skipped, their errors surface at generation time.
    fn first_map_key_match<'s>(&self, selectors: &[&'s Selector]) -> Option<&'s Selector> {
        let mut graph = NodeGraph::new(&self.registry, &self.subtypes, self.settings.max_depth);
        let root = graph.build(&self.root).ok()?;

        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            if graph.node(id).role == NodeRole::MapKey {
                if let Some(selector) = selectors.iter().copied().find(|s| s.matches(&graph, id)) {
                    return Some(selector);
                }
            }
            if let Ok(children) = graph.children(id) {
                pending.extend(children);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select;
    use specimen_core::{CompositeDef, Object, ScalarKind};
    use specimen_generator::from_fn;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_send_sync() {
        assert_send_sync::<GenerationContext>();
    }

    #[test]
    fn test_subtypes_follow_overrides() {
        let mut ctx = GenerationContext::new(Arc::new(TypeRegistry::new()), ScalarKind::Int32.into());
        ctx.put_subtype(select::all(TypeRef::named("A")), TypeRef::named("B"));
        ctx.put_override(
            select::field("X", "y"),
            Override::Container(ContainerSpec::new().subtype(TypeRef::set(ScalarKind::Int32))),
        );
        ctx.put_override(
            select::field("X", "z"),
            Override::Value(Value::Object(Object::new("C"))),
        );
        ctx.put_override(
            select::field("X", "w"),
            Override::Generator(Arc::new(
                from_fn(|_: &mut specimen_generator::Random| 1).with_subtype(TypeRef::named("D")),
            )),
        );

        assert_eq!(ctx.subtypes().len(), 4);
        assert_eq!(ctx.subtypes().explicit_entries().len(), 1);
    }

    #[test]
    fn test_targets_map_key() {
        let registry = TypeRegistry::new()
            .with_type(
                CompositeDef::new("Index")
                    .field("entries", TypeRef::map(ScalarKind::String, ScalarKind::Int32))
                    .field("name", ScalarKind::String),
            )
            .unwrap();
        let ctx = GenerationContext::new(Arc::new(registry), TypeRef::named("Index"));

        assert!(ctx.targets_map_key(&select::all(ScalarKind::String)));
        assert!(!ctx.targets_map_key(&select::all(ScalarKind::Int32)));
        assert!(!ctx.targets_map_key(&select::field("Index", "name")));
    }

    #[test]
    fn test_check_null_map_keys() {
        let registry = TypeRegistry::new()
            .with_type(
                CompositeDef::new("Index")
                    .field("entries", TypeRef::map(ScalarKind::String, ScalarKind::Int32))
                    .field("label", ScalarKind::Char),
            )
            .unwrap();
        let mut ctx = GenerationContext::new(Arc::new(registry), TypeRef::named("Index"));
        assert!(ctx.check_null_map_keys().is_ok());

        // Null items away from map keys are fine
        ctx.put_override(
            select::all(ScalarKind::Char),
            Override::Emit(Arc::new(EmitGenerator::new().item(Value::Null, 1))),
        );
        // Map keys without null items are fine
        ctx.put_override(
            select::all(ScalarKind::String),
            Override::Emit(Arc::new(EmitGenerator::new().items(["k"]))),
        );
        assert!(ctx.check_null_map_keys().is_ok());

        ctx.put_override(
            select::all(ScalarKind::String),
            Override::Emit(Arc::new(EmitGenerator::new().items([Some("k"), None]))),
        );
        match ctx.check_null_map_keys() {
            Err(ConfigError::NullMapKey { selector }) => assert_eq!(selector, "all(String)"),
            other => panic!("Expected NullMapKey, got {other:?}"),
        }
    }
}
