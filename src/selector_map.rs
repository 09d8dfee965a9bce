//! Ordered selector → value map with specificity ranking.
//!
//! Entries are only ever appended. Resolving a node collects every entry
//! whose selector matches and keeps the one ranked highest by
//!
//! 1. selector specificity (`field`/`root` > `all` > `tagged`/`group` > `any`),
//! 2. number of scopes and depth constraints,
//! 3. declaration order, later entries winning.

use crate::node::{NodeGraph, NodeId};
use crate::select::Selector;

/// One declared rule.
#[derive(Debug, Clone)]
pub struct SelectorMapEntry<V> {
    pub selector: Selector,
    pub value: V,
    /// Declaration index, unique within the map
    pub index: usize,
}

/// Selector map.
#[derive(Debug, Clone)]
pub struct SelectorMap<V> {
    entries: Vec<SelectorMapEntry<V>>,
}

impl<V> Default for SelectorMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> SelectorMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, returning its declaration index.
    pub fn put(&mut self, selector: Selector, value: V) -> usize {
        let index = self.entries.len();
        self.entries.push(SelectorMapEntry {
            selector,
            value,
            index,
        });
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SelectorMapEntry<V>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SelectorMapEntry<V>> {
        self.entries.get(index)
    }

    /// Winning entry for a node.
    pub fn resolve_entry(&self, graph: &NodeGraph<'_>, id: NodeId) -> Option<&SelectorMapEntry<V>> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .filter(|entry| entry.selector.matches(graph, id))
            .max_by_key(|entry| {
                (
                    entry.selector.specificity(),
                    entry.selector.constraints(),
                    entry.index,
                )
            })
    }

    /// Winning value for a node.
    pub fn resolve(&self, graph: &NodeGraph<'_>, id: NodeId) -> Option<&V> {
        self.resolve_entry(graph, id).map(|entry| &entry.value)
    }
}

impl<V> Extend<(Selector, V)> for SelectorMap<V> {
    fn extend<I: IntoIterator<Item = (Selector, V)>>(&mut self, iter: I) {
        for (selector, value) in iter {
            self.put(selector, value);
        }
    }
}
