//! Subtype resolution.
//!
//! Subtypes come from three places, merged into one [`SelectorMap`] in this
//! order so that later sources win ties:
//!
//! 1. explicit `Specimen::subtype(selector, type)` calls,
//! 2. generators and container specs that declare a subtype,
//! 3. literal `set(selector, object)` values of a composite type.

use crate::node::{NodeGraph, NodeId};
use crate::select::Selector;
use crate::selector_map::{SelectorMap, SelectorMapEntry};
use specimen_core::TypeRef;

/// Read-only selector → subtype map.
#[derive(Debug, Clone, Default)]
pub struct SubtypeSelectorMap {
    map: SelectorMap<TypeRef>,
    /// Entries that came from explicit subtype calls
    explicit: usize,
}

impl SubtypeSelectorMap {
    pub fn new(
        subtype_selectors: Vec<(Selector, TypeRef)>,
        generator_subtypes: Vec<(Selector, TypeRef)>,
        assignment_subtypes: Vec<(Selector, TypeRef)>,
    ) -> Self {
        let explicit = subtype_selectors.len();
        let mut map = SelectorMap::new();
        map.extend(subtype_selectors);
        map.extend(generator_subtypes);
        map.extend(assignment_subtypes);
        Self { map, explicit }
    }

    /// Subtype for a node, if any selector applies.
    pub fn get_subtype(&self, graph: &NodeGraph<'_>, id: NodeId) -> Option<&TypeRef> {
        self.map.resolve(graph, id)
    }

    pub fn resolve_entry(
        &self,
        graph: &NodeGraph<'_>,
        id: NodeId,
    ) -> Option<&SelectorMapEntry<TypeRef>> {
        self.map.resolve_entry(graph, id)
    }

    /// Entries declared through explicit subtype calls.
    pub fn explicit_entries(&self) -> &[SelectorMapEntry<TypeRef>] {
        &self.map.entries()[..self.explicit]
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
