//! Selectors: predicates over nodes.
//!
//! ```rust
//! use specimen::select::{self, Scope};
//! use specimen_core::{ScalarKind, TypeRef};
//!
//! // Every String below an `Address`, at any depth
//! let selector = select::all(ScalarKind::String).within(Scope::of(TypeRef::named("Address")));
//! assert_eq!(selector.to_string(), "all(String).within(Address)");
//! ```

use crate::node::{NodeGraph, NodeId};
use specimen_core::TypeRef;
use std::fmt;

/// What a selector targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The root node
    Root,
    /// Member `field` of composite `owner` (or of a composite implementing it)
    Field { owner: String, field: String },
    /// Nodes declared as, or generated as, the given type
    Type(TypeRef),
    /// Members carrying a tag
    Tagged(String),
    /// Every node
    Any,
    /// Nodes matched by any of the selectors
    Group(Vec<Selector>),
}

/// Ancestor constraint of a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    Type(TypeRef),
    Field { owner: String, field: String },
}

impl Scope {
    /// Ancestor of the given type.
    pub fn of(ty: impl Into<TypeRef>) -> Self {
        Self::Type(ty.into())
    }

    /// Ancestor that is the given member.
    pub fn field(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            owner: owner.into(),
            field: field.into(),
        }
    }

    fn matches(&self, graph: &NodeGraph<'_>, id: NodeId) -> bool {
        match self {
            Self::Type(ty) => type_matches(graph, id, ty),
            Self::Field { owner, field } => field_matches(graph, id, owner, field),
        }
    }
}

/// Ranking tier of a selector, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    Global,
    Group,
    Type,
    Field,
}

/// Node predicate with optional scopes and depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    target: Target,
    scopes: Vec<Scope>,
    depth: Option<usize>,
}

impl Selector {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            scopes: Vec::new(),
            depth: None,
        }
    }

    /// Require an ancestor matching `scope`.
    ///
    /// Repeated calls list scopes from the outermost to the innermost.
    pub fn within(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Only match nodes at exactly this depth (the root is at depth 0).
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn specificity(&self) -> Specificity {
        match self.target {
            Target::Root | Target::Field { .. } => Specificity::Field,
            Target::Type(_) => Specificity::Type,
            Target::Tagged(_) | Target::Group(_) => Specificity::Group,
            Target::Any => Specificity::Global,
        }
    }

    /// Number of narrowing constraints (scopes and depth).
    pub fn constraints(&self) -> usize {
        self.scopes.len() + usize::from(self.depth.is_some())
    }

    /// Whether this selector applies to a node.
    pub fn matches(&self, graph: &NodeGraph<'_>, id: NodeId) -> bool {
        let node = graph.node(id);
        if self.depth.is_some_and(|depth| depth != node.depth) {
            return false;
        }

        let target_matches = match &self.target {
            Target::Root => node.parent.is_none(),
            Target::Field { owner, field } => field_matches(graph, id, owner, field),
            Target::Type(ty) => type_matches(graph, id, ty),
            Target::Tagged(tag) => node.has_tag(tag),
            Target::Any => true,
            Target::Group(selectors) => selectors.iter().any(|s| s.matches(graph, id)),
        };

        target_matches && self.scopes_match(graph, id)
    }

    fn scopes_match(&self, graph: &NodeGraph<'_>, id: NodeId) -> bool {
        if self.scopes.is_empty() {
            return true;
        }

        let mut ancestors: Vec<NodeId> = graph.ancestors(id).collect();
        ancestors.reverse();

        let mut remaining = ancestors.into_iter();
        self.scopes
            .iter()
            .all(|scope| remaining.any(|ancestor| scope.matches(graph, ancestor)))
    }
}

fn type_matches(graph: &NodeGraph<'_>, id: NodeId, ty: &TypeRef) -> bool {
    let node = graph.node(id);
    let same = |candidate: &TypeRef| match ty {
        // A bare composite name matches every instantiation.
        TypeRef::Named { name, args } if args.is_empty() => {
            candidate.composite_name() == Some(name.as_str())
        }
        _ => candidate == ty,
    };
    same(&node.declared) || same(&node.ty)
}

fn field_matches(graph: &NodeGraph<'_>, id: NodeId, owner: &str, field: &str) -> bool {
    let node = graph.node(id);
    if node.member_name() != Some(field) {
        return false;
    }
    let Some(parent) = node.parent.map(|p| graph.node(p)) else {
        return false;
    };
    let registry = graph.registry();
    [&parent.ty, &parent.declared]
        .into_iter()
        .filter_map(TypeRef::composite_name)
        .any(|name| registry.implements(name, owner))
}

/// Select every node of a type.
pub fn all(ty: impl Into<TypeRef>) -> Selector {
    Selector::new(Target::Type(ty.into()))
}

/// Select a member of a composite.
pub fn field(owner: impl Into<String>, field: impl Into<String>) -> Selector {
    Selector::new(Target::Field {
        owner: owner.into(),
        field: field.into(),
    })
}

/// Select the root node.
pub fn root() -> Selector {
    Selector::new(Target::Root)
}

/// Select members carrying a tag.
pub fn tagged(tag: impl Into<String>) -> Selector {
    Selector::new(Target::Tagged(tag.into()))
}

/// Select every node.
pub fn any() -> Selector {
    Selector::new(Target::Any)
}

/// Select nodes matched by any of the given selectors.
pub fn group(selectors: impl IntoIterator<Item = Selector>) -> Selector {
    Selector::new(Target::Group(selectors.into_iter().collect()))
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Field { owner, field } => write!(f, "{owner}.{field}"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Root => write!(f, "root()")?,
            Target::Field { owner, field } => write!(f, "field({owner}, {field})")?,
            Target::Type(ty) => write!(f, "all({ty})")?,
            Target::Tagged(tag) => write!(f, "tagged({tag})")?,
            Target::Any => write!(f, "any()")?,
            Target::Group(selectors) => {
                write!(f, "group(")?;
                for (i, selector) in selectors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{selector}")?;
                }
                write!(f, ")")?;
            }
        }
        for scope in &self.scopes {
            write!(f, ".within({scope})")?;
        }
        if let Some(depth) = self.depth {
            write!(f, ".at_depth({depth})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtype_map::SubtypeSelectorMap;
    use specimen_core::{CompositeDef, FieldDef, ScalarKind, TypeRegistry};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(
                CompositeDef::new("Address")
                    .field("street", ScalarKind::String)
                    .with_field(FieldDef::new("city", ScalarKind::String).tag("geo")),
            )
            .unwrap()
            .with_type(
                CompositeDef::new("Person")
                    .field("name", ScalarKind::String)
                    .field("home", TypeRef::named("Address"))
                    .field("work", TypeRef::named("Address")),
            )
            .unwrap()
    }

    /// Expands the whole Person graph and hands out node ids by path.
    fn with_person_graph(check: impl FnOnce(&NodeGraph<'_>, &dyn Fn(&str) -> NodeId)) {
        let registry = registry();
        let subtypes = SubtypeSelectorMap::default();
        let mut graph = NodeGraph::new(&registry, &subtypes, 8);
        let root = graph.build(&TypeRef::named("Person")).unwrap();

        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            pending.extend(graph.children(id).unwrap());
        }

        let at = |path: &str| {
            graph
                .ids()
                .find(|id| graph.path(*id) == path)
                .unwrap_or_else(|| panic!("no node at {path}"))
        };
        check(&graph, &at);
    }

    #[test]
    fn test_field_and_type_targets() {
        with_person_graph(|graph, at| {
            let name = at("root.name");
            let street = at("root.home.street");

            assert!(field("Person", "name").matches(graph, name));
            assert!(!field("Address", "name").matches(graph, name));
            assert!(all(ScalarKind::String).matches(graph, name));
            assert!(all(ScalarKind::String).matches(graph, street));
            assert!(all(TypeRef::named("Address")).matches(graph, at("root.home")));
            assert!(root().matches(graph, at("root")));
            assert!(!root().matches(graph, name));
            assert!(any().matches(graph, street));
        });
    }

    #[test]
    fn test_scopes_and_depth() {
        with_person_graph(|graph, at| {
            let home_street = at("root.home.street");
            let name = at("root.name");

            let in_address = all(ScalarKind::String).within(Scope::of(TypeRef::named("Address")));
            assert!(in_address.matches(graph, home_street));
            assert!(!in_address.matches(graph, name));

            let in_home = all(ScalarKind::String).within(Scope::field("Person", "home"));
            assert!(in_home.matches(graph, home_street));
            assert!(!in_home.matches(graph, at("root.work.street")));

            // Scopes are ordered outer to inner
            let ordered = all(ScalarKind::String)
                .within(Scope::of(TypeRef::named("Person")))
                .within(Scope::of(TypeRef::named("Address")));
            assert!(ordered.matches(graph, home_street));
            let reversed = all(ScalarKind::String)
                .within(Scope::of(TypeRef::named("Address")))
                .within(Scope::of(TypeRef::named("Person")));
            assert!(!reversed.matches(graph, home_street));

            assert!(all(ScalarKind::String).at_depth(1).matches(graph, name));
            assert!(!all(ScalarKind::String).at_depth(1).matches(graph, home_street));
        });
    }

    #[test]
    fn test_tags_and_groups() {
        with_person_graph(|graph, at| {
            assert!(tagged("geo").matches(graph, at("root.work.city")));
            assert!(!tagged("geo").matches(graph, at("root.work.street")));

            let either = group([field("Person", "name"), tagged("geo")]);
            assert!(either.matches(graph, at("root.name")));
            assert!(either.matches(graph, at("root.home.city")));
            assert!(!either.matches(graph, at("root.home.street")));
        });
    }

    #[test]
    fn test_specificity_and_display() {
        assert!(field("A", "b").specificity() > all(ScalarKind::Int32).specificity());
        assert!(all(ScalarKind::Int32).specificity() > tagged("x").specificity());
        assert!(group([root()]).specificity() > any().specificity());
        assert_eq!(root().specificity(), Specificity::Field);

        let selector = field("Person", "home")
            .within(Scope::field("Root", "people"))
            .at_depth(2);
        assert_eq!(selector.constraints(), 2);
        assert_eq!(
            selector.to_string(),
            "field(Person, home).within(Root.people).at_depth(2)"
        );
        assert_eq!(
            group([all(ScalarKind::Bool), any()]).to_string(),
            "group(all(bool), any())"
        );
    }
}
