//! Shared helpers for the integration tests.

#![allow(dead_code)]

use specimen::{Specimen, TypeRef, TypeRegistry};
use std::sync::Arc;

pub const SEED: u64 = 42;

pub const CATALOG: &str = "tests/fixtures/catalog.yaml";

/// Initialize logging once per test binary.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("specimen=debug,specimen_generator=debug")
        .try_init()
        .ok(); // Ignore if already initialized
}

/// Registry loaded from the fixture catalog.
pub fn registry() -> Arc<TypeRegistry> {
    Arc::new(TypeRegistry::from_file(CATALOG).expect("Failed to load test catalog"))
}

/// Seeded builder for a catalog type expression.
pub fn specimen(ty: &str) -> Specimen {
    init_logging();
    let ty: TypeRef = ty.parse().expect("Invalid type expression");
    Specimen::new(registry(), ty).with_seed(SEED)
}
