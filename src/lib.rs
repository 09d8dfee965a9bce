//! Specimen: rule-driven test fixture generation.
//!
//! Given a type description, specimen builds a graph of every reachable
//! member, element and nested structure, then fills each leaf with a random
//! value, or with the value of whichever selector rule applies to it.
//!
//! # Crates
//!
//! - `specimen_core` - type model, [`Value`], [`Settings`], configuration errors
//! - `specimen_generator` - random source, leaf generators, emit queues
//! - `specimen` (this crate) - selectors, node graph, sessions, the [`Specimen`] builder
//!
//! # Example
//!
//! ```rust
//! use specimen::{select, EmitGenerator, Specimen};
//! use specimen_core::{ScalarKind, TypeRef, Value};
//!
//! let names = Specimen::of(TypeRef::list(ScalarKind::String))
//!     .emit(
//!         select::all(ScalarKind::String),
//!         EmitGenerator::new().items(["a", "b", "c"]).ignore_unused(),
//!     )
//!     .unwrap()
//!     .with_seed(7)
//!     .create()
//!     .unwrap();
//!
//! // Values are emitted in order; the list stops growing when they run out
//! let names: Vec<&str> = names.as_elements().unwrap().iter().filter_map(Value::as_str).collect();
//! assert!(["a", "b", "c"].starts_with(&names));
//! ```
//!
//! # Rule resolution
//!
//! When several selectors match a node, the most specific one wins:
//! `field`/`root` over `all`, `all` over `tagged`/`group`, and those over
//! `any`. Scoped selectors win over unscoped ones of the same kind; among
//! equals the rule declared last wins.

pub mod context;
pub mod error;
pub mod node;
pub mod select;
pub mod selector_map;
mod session;
pub mod specimen;
pub mod subtype_map;

pub use context::{GenerationContext, Override};
pub use error::{Error, GenerationError, Result};
pub use node::{Node, NodeGraph, NodeId, NodeRole, Termination};
pub use select::{Scope, Selector, Specificity, Target};
pub use selector_map::{SelectorMap, SelectorMapEntry};
pub use specimen::{Specimen, SpecimenIter};
pub use subtype_map::SubtypeSelectorMap;

pub use specimen_core::{
    ConfigError, EmitScope, Mode, Object, Period, ScalarKind, Settings, TypeError, TypeRef,
    TypeRegistry, Value,
};
pub use specimen_generator::{
    from_fn, ContainerSpec, EmitGenerator, Generator, IntGenerator, PeriodGenerator, Random,
    StringGenerator,
};
