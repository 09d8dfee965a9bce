//! One generation run: node graph, random source and emit queues.

use crate::context::{GenerationContext, Override};
use crate::error::GenerationError;
use crate::node::{NodeGraph, NodeId, Termination};
use specimen_core::{CollectionKind, EmitScope, Mode, Object, TypeKind, Value};
use specimen_generator::{generate_scalar, ContainerSpec, EmitGenerator, Emitted, EmitQueue, Random};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace, warn};

/// Extra attempts per requested set element or map entry before giving up
/// on producing a distinct one.
const DISTINCT_ATTEMPTS_FACTOR: usize = 10;

/// Cap on up-front allocation for generated containers.
const PREALLOC_LIMIT: usize = 1024;

/// Result of generating one node.
enum Produced {
    Value(Value),
    /// Emit queue of override `entry` ran out at `node`
    Exhausted { node: NodeId, entry: usize },
}

/// Emit queue identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum QueueKey {
    Global {
        entry: usize,
    },
    PerContainer {
        entry: usize,
        node: NodeId,
        instance: usize,
    },
}

impl QueueKey {
    fn entry(self) -> usize {
        match self {
            Self::Global { entry } | Self::PerContainer { entry, .. } => entry,
        }
    }
}

/// Run one session and return the root value.
pub(crate) fn run(ctx: &GenerationContext, seed: u64) -> Result<Value, GenerationError> {
    debug!("Generating {} with seed {}", ctx.root, seed);
    let mut session = Session::new(ctx, seed);
    let result = session.generate_root();
    if let Err(e) = &result {
        warn!("Failed to generate {} (seed {}): {}", ctx.root, seed, e);
    }
    result
}

struct Session<'c> {
    ctx: &'c GenerationContext,
    graph: NodeGraph<'c>,
    random: Random,
    queues: BTreeMap<QueueKey, EmitQueue>,
    used_overrides: HashSet<usize>,
    /// Last container instance id handed out; 0 is the session itself
    instances: usize,
}

impl<'c> Session<'c> {
    fn new(ctx: &'c GenerationContext, seed: u64) -> Self {
        Self {
            ctx,
            graph: NodeGraph::new(&ctx.registry, &ctx.subtypes, ctx.settings.max_depth),
            random: Random::new(seed),
            queues: BTreeMap::new(),
            used_overrides: HashSet::new(),
            instances: 0,
        }
    }

    fn generate_root(&mut self) -> Result<Value, GenerationError> {
        let root = self.graph.build(&self.ctx.root)?;
        let value = match self.generate(root, 0)? {
            Produced::Value(value) => value,
            Produced::Exhausted { node, entry } => return Err(self.exhausted(node, entry)),
        };
        self.finish()?;
        Ok(value)
    }

    /// Session-end checks: leftover emit items and, in strict mode, unused
    /// selectors.
    fn finish(&self) -> Result<(), GenerationError> {
        for (key, queue) in &self.queues {
            if queue.has_unused() {
                return Err(GenerationError::UnusedEmitItems {
                    selector: self.selector_name(key.entry()),
                    remaining: queue.remaining(),
                });
            }
        }

        if self.ctx.settings.mode == Mode::Strict {
            let used_subtypes = self.graph.used_subtypes();
            let mut unused: Vec<String> = self
                .ctx
                .overrides
                .entries()
                .iter()
                .filter(|entry| !self.used_overrides.contains(&entry.index))
                .map(|entry| entry.selector.to_string())
                .collect();
            unused.extend(
                self.ctx
                    .subtypes
                    .explicit_entries()
                    .iter()
                    .filter(|entry| !used_subtypes.contains(&entry.index))
                    .map(|entry| format!("subtype {}", entry.selector)),
            );
            if !unused.is_empty() {
                return Err(GenerationError::UnusedSelectors(unused));
            }
        }
        Ok(())
    }

    fn generate(&mut self, id: NodeId, instance: usize) -> Result<Produced, GenerationError> {
        let ctx = self.ctx;
        let mut spec = None;

        if let Some(entry) = ctx.overrides.resolve_entry(&self.graph, id) {
            trace!("{} resolved by {}", self.graph.path(id), entry.selector);
            self.used_overrides.insert(entry.index);
            match &entry.value {
                Override::Ignore => return Ok(Produced::Value(Value::Null)),
                Override::Value(value) => return Ok(Produced::Value(value.clone())),
                Override::Generator(generator) => {
                    return Ok(Produced::Value(generator.generate_value(&mut self.random)))
                }
                Override::Emit(emit) => return Ok(self.emit(id, entry.index, emit, instance)),
                Override::Container(container) => spec = Some(container),
            }
        }

        let node = self.graph.node(id);
        let descriptor = node.descriptor.clone();
        let termination = node.termination;
        let ty = node.ty.clone();

        let value = match &descriptor.kind {
            TypeKind::Scalar(kind) => generate_scalar(*kind, &ctx.settings, &mut self.random),

            TypeKind::Composite { .. } if termination.is_some() => Value::Null,

            TypeKind::Composite { is_abstract: true, .. } => {
                debug!("No subtype for abstract {} at {}", ty, self.graph.path(id));
                Value::Null
            }

            TypeKind::Composite { name, .. } => {
                let mut object = Object::new(name.clone());
                for child in self.graph.children(id)? {
                    let field = match self.generate(child, instance)? {
                        Produced::Value(value) => value,
                        Produced::Exhausted { node, entry } => {
                            return Err(self.exhausted(node, entry))
                        }
                    };
                    if let Some(name) = self.graph.node(child).member_name() {
                        object.fields.insert(name.to_string(), field);
                    }
                }
                Value::Object(object)
            }

            TypeKind::Array { .. } => {
                let settings = &ctx.settings;
                let elements = match self.element(id)? {
                    Some(element) => {
                        let length = spec.cloned().unwrap_or_default().pick_size(
                            settings.array_min_length,
                            settings.array_max_length,
                            &mut self.random,
                        );
                        let instance = self.next_instance();
                        let mut elements = Vec::with_capacity(length.min(PREALLOC_LIMIT));
                        for _ in 0..length {
                            match self.generate(element, instance)? {
                                Produced::Value(value) => elements.push(value),
                                Produced::Exhausted { node, entry } => {
                                    return Err(self.exhausted(node, entry))
                                }
                            }
                        }
                        elements
                    }
                    None => Vec::new(),
                };
                Value::Array(elements)
            }

            TypeKind::Collection { kind, .. } => {
                let elements = match self.element(id)? {
                    Some(element) => self.collection(id, element, *kind, spec)?,
                    None => Vec::new(),
                };
                match kind {
                    CollectionKind::List => Value::List(elements),
                    CollectionKind::Set => Value::Set(elements),
                }
            }

            TypeKind::Map { .. } => {
                let children = self.graph.children(id)?;
                let entries = match children.as_slice() {
                    [key, value] if !self.is_cycle(*key) && !self.is_cycle(*value) => {
                        self.map(id, *key, *value, spec)?
                    }
                    _ => Vec::new(),
                };
                Value::Map(entries)
            }
        };

        Ok(Produced::Value(value))
    }

    /// Element node of an array or collection, `None` if the container is
    /// terminal or its element closes a cycle.
    fn element(&mut self, id: NodeId) -> Result<Option<NodeId>, GenerationError> {
        let children = self.graph.children(id)?;
        Ok(children.first().copied().filter(|e| !self.is_cycle(*e)))
    }

    fn is_cycle(&self, id: NodeId) -> bool {
        self.graph.node(id).termination == Some(Termination::Cycle)
    }

    fn collection(
        &mut self,
        id: NodeId,
        element: NodeId,
        kind: CollectionKind,
        spec: Option<&ContainerSpec>,
    ) -> Result<Vec<Value>, GenerationError> {
        let settings = &self.ctx.settings;
        let size = spec.cloned().unwrap_or_default().pick_size(
            settings.collection_min_size,
            settings.collection_max_size,
            &mut self.random,
        );
        let instance = self.next_instance();
        let distinct = kind == CollectionKind::Set;
        let mut attempts = size.saturating_mul(DISTINCT_ATTEMPTS_FACTOR);

        let mut elements: Vec<Value> = Vec::with_capacity(size.min(PREALLOC_LIMIT));
        while elements.len() < size {
            let value = match self.generate(element, instance)? {
                Produced::Value(value) => value,
                Produced::Exhausted { .. } => {
                    debug!(
                        "Emit exhausted, {} terminated at {} of {} element(s)",
                        self.graph.path(id),
                        elements.len(),
                        size
                    );
                    break;
                }
            };

            if distinct && elements.contains(&value) {
                if attempts == 0 {
                    debug!(
                        "Gave up on distinct elements for {} at {} of {}",
                        self.graph.path(id),
                        elements.len(),
                        size
                    );
                    break;
                }
                attempts -= 1;
                continue;
            }
            elements.push(value);
        }
        Ok(elements)
    }

    fn map(
        &mut self,
        id: NodeId,
        key_node: NodeId,
        value_node: NodeId,
        spec: Option<&ContainerSpec>,
    ) -> Result<Vec<(Value, Value)>, GenerationError> {
        let settings = &self.ctx.settings;
        let size = spec.cloned().unwrap_or_default().pick_size(
            settings.map_min_size,
            settings.map_max_size,
            &mut self.random,
        );
        let instance = self.next_instance();
        let mut attempts = size.saturating_mul(DISTINCT_ATTEMPTS_FACTOR);

        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(size.min(PREALLOC_LIMIT));
        while entries.len() < size {
            let key = match self.generate(key_node, instance)? {
                Produced::Value(key) => key,
                Produced::Exhausted { .. } => break,
            };

            // Rejected keys must not consume a value
            if key.is_null() || entries.iter().any(|(k, _)| *k == key) {
                if attempts == 0 {
                    debug!(
                        "Gave up on distinct keys for {} at {} of {}",
                        self.graph.path(id),
                        entries.len(),
                        size
                    );
                    break;
                }
                attempts -= 1;
                continue;
            }

            let value = match self.generate(value_node, instance)? {
                Produced::Value(value) => value,
                Produced::Exhausted { .. } => break,
            };
            entries.push((key, value));
        }

        if entries.len() < size {
            debug!(
                "{} terminated at {} of {} entries",
                self.graph.path(id),
                entries.len(),
                size
            );
        }
        Ok(entries)
    }

    fn emit(&mut self, id: NodeId, entry: usize, emit: &EmitGenerator, instance: usize) -> Produced {
        let key = match self.ctx.settings.emit_scope {
            EmitScope::Global => QueueKey::Global { entry },
            EmitScope::PerContainer => QueueKey::PerContainer {
                entry,
                node: id,
                instance,
            },
        };

        let random = &mut self.random;
        let queue = self
            .queues
            .entry(key)
            .or_insert_with(|| emit.queue(random));

        match queue.poll() {
            Emitted::Value(value) => Produced::Value(value),
            Emitted::Exhausted => Produced::Exhausted { node: id, entry },
        }
    }

    fn next_instance(&mut self) -> usize {
        self.instances += 1;
        self.instances
    }

    fn selector_name(&self, entry: usize) -> String {
        self.ctx
            .overrides
            .get(entry)
            .map(|e| e.selector.to_string())
            .unwrap_or_default()
    }

    fn exhausted(&self, node: NodeId, entry: usize) -> GenerationError {
        GenerationError::EmitExhausted {
            path: self.graph.path(node),
            selector: self.selector_name(entry),
        }
    }
}
