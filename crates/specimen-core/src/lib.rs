//! Core types for the specimen fixture generator.
//!
//! This crate provides the foundational types shared by the generator and the
//! engine, including:
//!
//! - [`TypeRef`] - Type expressions (`i32`, `List<Tree<String>>`, `Map<String, i64>`)
//! - [`TypeRegistry`] - Composite type catalog with cached [`TypeDescriptor`]s
//! - [`Value`] - Dynamic generated values
//! - [`Settings`] - Session configuration loaded from code or YAML
//!
//! # Architecture
//!
//! ```text
//! specimen-core (this crate)
//!    │
//!    ├─── specimen-generator  (random source, leaf generators, emit queues)
//!    │
//!    └─── specimen            (selectors, node graph, generation sessions)
//! ```
//!
//! # Example
//!
//! ```rust
//! use specimen_core::{CompositeDef, ScalarKind, TypeRef, TypeRegistry};
//!
//! let registry = TypeRegistry::new()
//!     .with_type(
//!         CompositeDef::new("Holder")
//!             .param("E")
//!             .field("value", TypeRef::param("E")),
//!     )
//!     .unwrap();
//!
//! let ty: TypeRef = "Holder<String>".parse().unwrap();
//! let descriptor = registry.describe(&ty).unwrap();
//! assert_eq!(descriptor.members()[0].ty, TypeRef::from(ScalarKind::String));
//! ```

pub mod error;
pub mod schema;
pub mod settings;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use error::{ensure_range, ConfigError, TypeError};
pub use schema::{
    CompositeDef, FieldDef, MemberDescriptor, TypeCatalog, TypeDescriptor, TypeKind, TypeRegistry,
};
pub use settings::{EmitScope, Mode, Settings};
pub use types::{CollectionKind, ScalarKind, TypeRef};
pub use values::{Object, Period, Value};
