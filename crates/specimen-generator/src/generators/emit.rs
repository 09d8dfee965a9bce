//! Emit generator: hands out caller-supplied values in order.
//!
//! An [`EmitGenerator`] is the immutable recipe configured on the builder;
//! each generation session turns it into one or more [`EmitQueue`]s that are
//! consumed as nodes request values.
//!
//! ```rust
//! use specimen_generator::{EmitGenerator, Emitted, Random};
//! use specimen_core::Value;
//!
//! let emit = EmitGenerator::new().items(["a", "b"]).item("c", 2);
//! let mut queue = emit.queue(&mut Random::new(42));
//!
//! let mut out = Vec::new();
//! while let Emitted::Value(value) = queue.poll() {
//!     out.push(value);
//! }
//! assert_eq!(out, vec![Value::from("a"), "b".into(), "c".into(), "c".into()]);
//! ```

use crate::random::Random;
use specimen_core::Value;
use std::collections::VecDeque;
use tracing::trace;

/// Ordered values to emit, with their repeat counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitGenerator {
    items: Vec<(Value, usize)>,
    shuffle: bool,
    ignore_unused: bool,
    when_empty_emit_null: bool,
}

impl EmitGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append values, each emitted once, in iteration order.
    pub fn items<I, V>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.items
            .extend(items.into_iter().map(|item| (item.into(), 1)));
        self
    }

    /// Append one value emitted `count` consecutive times. A zero count adds
    /// nothing.
    pub fn item(mut self, item: impl Into<Value>, count: usize) -> Self {
        if count > 0 {
            self.items.push((item.into(), count));
        }
        self
    }

    /// Emit the flattened values in random order.
    pub fn shuffle(mut self) -> Self {
        self.shuffle = true;
        self
    }

    /// Leftover values do not fail the session.
    pub fn ignore_unused(mut self) -> Self {
        self.ignore_unused = true;
        self
    }

    /// Emit `null` once the values run out instead of reporting exhaustion.
    pub fn when_empty_emit_null(mut self) -> Self {
        self.when_empty_emit_null = true;
        self
    }

    /// Number of values emitted before exhaustion.
    pub fn total_items(&self) -> usize {
        self.items.iter().map(|(_, count)| count).sum()
    }

    pub fn has_null_items(&self) -> bool {
        self.items.iter().any(|(item, _)| item.is_null())
    }

    pub fn is_ignore_unused(&self) -> bool {
        self.ignore_unused
    }

    pub fn is_when_empty_emit_null(&self) -> bool {
        self.when_empty_emit_null
    }

    /// Create a fresh queue for one session; shuffles if configured.
    pub fn queue(&self, random: &mut Random) -> EmitQueue {
        let entries = if self.shuffle {
            let mut flat: Vec<Value> = self
                .items
                .iter()
                .flat_map(|(item, count)| std::iter::repeat(item).take(*count).cloned())
                .collect();
            random.shuffle(&mut flat);
            flat.into_iter().map(|item| (item, 1)).collect()
        } else {
            self.items.iter().cloned().collect()
        };

        let queue = EmitQueue {
            entries,
            consumed: 0,
            ignore_unused: self.ignore_unused,
            when_empty_emit_null: self.when_empty_emit_null,
        };
        trace!(
            "Created emit queue with {} item(s), shuffled: {}",
            queue.remaining(),
            self.shuffle
        );
        queue
    }
}

/// Outcome of polling an [`EmitQueue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Emitted {
    Value(Value),
    Exhausted,
}

/// Session-owned queue of values to emit.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitQueue {
    entries: VecDeque<(Value, usize)>,
    consumed: usize,
    ignore_unused: bool,
    when_empty_emit_null: bool,
}

impl EmitQueue {
    /// Pop the next value; `None` once exhausted.
    pub fn next_value(&mut self) -> Option<Value> {
        let (item, remaining) = self.entries.front_mut()?;
        self.consumed += 1;
        if *remaining > 1 {
            *remaining -= 1;
            return Some(item.clone());
        }
        self.entries.pop_front().map(|(item, _)| item)
    }

    /// Next value, `null` fallback or exhaustion.
    pub fn poll(&mut self) -> Emitted {
        match self.next_value() {
            Some(item) => Emitted::Value(item),
            None if self.when_empty_emit_null => Emitted::Value(Value::Null),
            None => Emitted::Exhausted,
        }
    }

    /// Values left before exhaustion.
    pub fn remaining(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether leftovers should fail the session.
    pub fn has_unused(&self) -> bool {
        !self.ignore_unused && !self.is_exhausted()
    }
}
