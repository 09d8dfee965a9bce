//! Node graph of a generated type.
//!
//! Every position in a generated value (the root, each composite member, the
//! element slot of an array or collection, the key and value slots of a map)
//! is a [`Node`]. Nodes live in an arena owned by [`NodeGraph`] and refer to
//! their parent by [`NodeId`]; children are expanded lazily the first time
//! they are requested, so branches that are overridden never get built.
//!
//! Expansion stops at two guards:
//! - a composite or container whose effective type already appears on the
//!   path from the root is a [`Termination::Cycle`] node;
//! - a composite or container at `max_depth` is a [`Termination::MaxDepth`]
//!   node.
//!
//! Terminal nodes have no children.

use crate::error::GenerationError;
use crate::subtype_map::SubtypeSelectorMap;
use specimen_core::{TypeDescriptor, TypeKind, TypeRef, TypeRegistry};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Index of a node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Position of a node relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    Member { name: String, tags: Vec<String> },
    Element,
    MapKey,
    MapValue,
}

/// Why a node has no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Effective type already present on the path from the root
    Cycle,
    /// Node sits at the maximum depth
    MaxDepth,
}

/// One position in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub role: NodeRole,
    /// Type as declared by the parent
    pub declared: TypeRef,
    /// Type actually generated (declared or subtype)
    pub ty: TypeRef,
    pub descriptor: Arc<TypeDescriptor>,
    /// Distance from the root
    pub depth: usize,
    pub termination: Option<Termination>,
    children: Option<Vec<NodeId>>,
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        self.termination.is_some()
    }

    /// Member name, if this node is a composite member.
    pub fn member_name(&self) -> Option<&str> {
        match &self.role {
            NodeRole::Member { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        match &self.role {
            NodeRole::Member { tags, .. } => tags.iter().any(|t| t == tag),
            _ => false,
        }
    }
}

/// Arena of lazily expanded nodes for one generation session.
#[derive(Debug)]
pub struct NodeGraph<'a> {
    registry: &'a TypeRegistry,
    subtypes: &'a SubtypeSelectorMap,
    max_depth: usize,
    nodes: Vec<Node>,
    used_subtypes: HashSet<usize>,
}

impl<'a> NodeGraph<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        subtypes: &'a SubtypeSelectorMap,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            subtypes,
            max_depth,
            nodes: Vec::new(),
            used_subtypes: HashSet::new(),
        }
    }

    /// Create the root node for `root`.
    pub fn build(&mut self, root: &TypeRef) -> Result<NodeId, GenerationError> {
        self.create_node(None, NodeRole::Root, root.clone())
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Get a node by id.
    ///
    /// Ids are only handed out by this graph, so indexing cannot fail.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all nodes created so far, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Subtype map entries that re-typed at least one node.
    pub fn used_subtypes(&self) -> &HashSet<usize> {
        &self.used_subtypes
    }

    /// Children of a node, expanding them on first request.
    pub fn children(&mut self, id: NodeId) -> Result<Vec<NodeId>, GenerationError> {
        if let Some(children) = &self.nodes[id.0].children {
            return Ok(children.clone());
        }

        let node = &self.nodes[id.0];
        let mut pending: Vec<(NodeRole, TypeRef)> = Vec::new();
        if !node.is_terminal() {
            match &node.descriptor.kind {
                TypeKind::Scalar(_) => {}
                TypeKind::Array { element } | TypeKind::Collection { element, .. } => {
                    pending.push((NodeRole::Element, element.clone()));
                }
                TypeKind::Map { key, value } => {
                    pending.push((NodeRole::MapKey, key.clone()));
                    pending.push((NodeRole::MapValue, value.clone()));
                }
                TypeKind::Composite { members, .. } => {
                    pending.extend(members.iter().map(|member| {
                        (
                            NodeRole::Member {
                                name: member.name.clone(),
                                tags: member.tags.clone(),
                            },
                            member.ty.clone(),
                        )
                    }));
                }
            }
        }

        let mut children = Vec::with_capacity(pending.len());
        for (role, declared) in pending {
            children.push(self.create_node(Some(id), role, declared)?);
        }
        self.nodes[id.0].children = Some(children.clone());
        Ok(children)
    }

    /// Strict ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, 'a> {
        Ancestors {
            graph: self,
            next: self.nodes[id.0].parent,
        }
    }

    /// Human-readable path from the root, e.g. `root.items[*].name`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments: Vec<String> = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            segments.push(match &node.role {
                NodeRole::Root => "root".to_string(),
                NodeRole::Member { name, .. } => format!(".{name}"),
                NodeRole::Element => "[*]".to_string(),
                NodeRole::MapKey => "<key>".to_string(),
                NodeRole::MapValue => "<value>".to_string(),
            });
            current = node.parent;
        }
        segments.reverse();
        segments.concat()
    }

    fn create_node(
        &mut self,
        parent: Option<NodeId>,
        role: NodeRole,
        declared: TypeRef,
    ) -> Result<NodeId, GenerationError> {
        let depth = parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        let descriptor = self.registry.describe(&declared)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            role,
            declared: declared.clone(),
            ty: declared.clone(),
            descriptor,
            depth,
            termination: None,
            children: None,
        });

        self.apply_subtype(id, &declared)?;

        let node = &self.nodes[id.0];
        let termination = if node.descriptor.is_composite() || node.descriptor.is_container() {
            if self.ancestors(id).any(|a| self.nodes[a.0].ty == node.ty) {
                Some(Termination::Cycle)
            } else if depth >= self.max_depth {
                Some(Termination::MaxDepth)
            } else {
                None
            }
        } else {
            None
        };

        if let Some(termination) = termination {
            trace!("Node {} is terminal: {:?}", self.path(id), termination);
        }
        self.nodes[id.0].termination = termination;
        Ok(id)
    }

    fn apply_subtype(&mut self, id: NodeId, declared: &TypeRef) -> Result<(), GenerationError> {
        let subtypes = self.subtypes;
        let Some(entry) = subtypes.resolve_entry(self, id) else {
            return Ok(());
        };
        self.used_subtypes.insert(entry.index);

        let subtype = &entry.value;
        // Same composite under another instantiation keeps the declared arguments.
        if subtype == declared
            || (subtype.composite_name().is_some()
                && subtype.composite_name() == declared.composite_name())
        {
            return Ok(());
        }

        if !self.registry.is_assignable(subtype, declared) {
            return Err(GenerationError::InvalidSubtype {
                path: self.path(id),
                declared: declared.clone(),
                subtype: subtype.clone(),
            });
        }

        let descriptor = self.registry.describe(subtype)?;
        trace!("Node {} generated as {}", self.path(id), subtype);
        let node = &mut self.nodes[id.0];
        node.ty = subtype.clone();
        node.descriptor = descriptor;
        Ok(())
    }
}

/// Iterator over the strict ancestors of a node.
pub struct Ancestors<'g, 'a> {
    graph: &'g NodeGraph<'a>,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.graph.node(id).parent;
        Some(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specimen_core::{CompositeDef, ScalarKind};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(
                CompositeDef::new("Tree")
                    .field("name", ScalarKind::String)
                    .field("children", TypeRef::list(TypeRef::named("Tree"))),
            )
            .unwrap()
            .with_type(
                CompositeDef::new("Box")
                    .param("E")
                    .field("item", TypeRef::param("E"))
                    .field("items", TypeRef::list(TypeRef::param("E"))),
            )
            .unwrap()
            .with_type(
                CompositeDef::new("Person")
                    .field("name", ScalarKind::String)
                    .field("scores", TypeRef::map(ScalarKind::String, ScalarKind::Int32)),
            )
            .unwrap()
    }

    #[test]
    fn test_generic_members_are_substituted() {
        let registry = registry();
        let subtypes = SubtypeSelectorMap::default();
        let mut graph = NodeGraph::new(&registry, &subtypes, 8);

        let root = graph
            .build(&TypeRef::generic("Box", vec![ScalarKind::String.into()]))
            .unwrap();
        let children = graph.children(root).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(graph.node(children[0]).ty, TypeRef::from(ScalarKind::String));
        assert_eq!(
            graph.node(children[1]).ty,
            TypeRef::list(ScalarKind::String)
        );

        let element = graph.children(children[1]).unwrap()[0];
        assert_eq!(graph.node(element).role, NodeRole::Element);
        assert_eq!(graph.path(element), "root.items[*]");
    }

    #[test]
    fn test_unresolved_parameter() {
        let registry = registry();
        let subtypes = SubtypeSelectorMap::default();
        let mut graph = NodeGraph::new(&registry, &subtypes, 8);

        let err = graph.build(&TypeRef::named("Box")).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Type(specimen_core::TypeError::UnresolvedTypeParameter { .. })
        ));
    }

    #[test]
    fn test_cycle_terminates() {
        let registry = registry();
        let subtypes = SubtypeSelectorMap::default();
        let mut graph = NodeGraph::new(&registry, &subtypes, 8);

        let root = graph.build(&TypeRef::named("Tree")).unwrap();
        let children = graph.children(root).unwrap();
        let list = children[1];
        assert!(!graph.node(list).is_terminal());

        let element = graph.children(list).unwrap()[0];
        assert_eq!(graph.node(element).termination, Some(Termination::Cycle));
        assert!(graph.children(element).unwrap().is_empty());
        assert_eq!(graph.path(element), "root.children[*]");
    }

    #[test]
    fn test_max_depth() {
        let registry = registry();
        let subtypes = SubtypeSelectorMap::default();
        let mut graph = NodeGraph::new(&registry, &subtypes, 1);

        let root = graph.build(&TypeRef::named("Person")).unwrap();
        let children = graph.children(root).unwrap();
        let scores = children[1];
        assert_eq!(graph.node(scores).depth, 1);
        assert_eq!(graph.node(scores).termination, Some(Termination::MaxDepth));
        assert!(graph.children(scores).unwrap().is_empty());
        // Scalars at the limit are regular leaves
        assert!(!graph.node(children[0]).is_terminal());
    }

    #[test]
    fn test_map_children_and_ancestors() {
        let registry = registry();
        let subtypes = SubtypeSelectorMap::default();
        let mut graph = NodeGraph::new(&registry, &subtypes, 8);

        let root = graph.build(&TypeRef::named("Person")).unwrap();
        let scores = graph.children(root).unwrap()[1];
        let entries = graph.children(scores).unwrap();
        assert_eq!(graph.node(entries[0]).role, NodeRole::MapKey);
        assert_eq!(graph.node(entries[1]).role, NodeRole::MapValue);
        assert_eq!(graph.path(entries[0]), "root.scores<key>");

        let ancestors: Vec<NodeId> = graph.ancestors(entries[1]).collect();
        assert_eq!(ancestors, vec![scores, root]);

        // Second request returns the same nodes
        assert_eq!(graph.children(scores).unwrap(), entries);
        assert_eq!(graph.len(), 5);
    }
}
