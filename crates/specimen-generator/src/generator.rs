//! The generator capability.

use crate::random::Random;
use specimen_core::{TypeRef, Value};
use std::fmt;

/// Produces one value per invocation from a random source.
///
/// Implementations must be deterministic for a given random state: the
/// engine relies on this to make seeded sessions reproducible.
pub trait Generator: Send + Sync {
    type Output: Into<Value>;

    fn generate(&self, random: &mut Random) -> Self::Output;

    /// Type the target node should be re-typed to, if any.
    fn subtype(&self) -> Option<TypeRef> {
        None
    }
}

/// Object-safe view of a [`Generator`], used to store user generators
/// behind `Arc<dyn ValueGenerator>`.
pub trait ValueGenerator: Send + Sync {
    fn generate_value(&self, random: &mut Random) -> Value;

    fn declared_subtype(&self) -> Option<TypeRef>;
}

impl<G: Generator> ValueGenerator for G {
    fn generate_value(&self, random: &mut Random) -> Value {
        self.generate(random).into()
    }

    fn declared_subtype(&self) -> Option<TypeRef> {
        Generator::subtype(self)
    }
}

/// Generator backed by a closure. See [`from_fn`].
pub struct FnGenerator<F> {
    f: F,
    subtype: Option<TypeRef>,
}

impl<F> FnGenerator<F> {
    /// Re-type the target node when this generator is used.
    pub fn with_subtype(mut self, subtype: TypeRef) -> Self {
        self.subtype = Some(subtype);
        self
    }
}

impl<F> fmt::Debug for FnGenerator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGenerator")
            .field("subtype", &self.subtype)
            .finish_non_exhaustive()
    }
}

impl<F, T> Generator for FnGenerator<F>
where
    F: Fn(&mut Random) -> T + Send + Sync,
    T: Into<Value>,
{
    type Output = T;

    fn generate(&self, random: &mut Random) -> T {
        (self.f)(random)
    }

    fn subtype(&self) -> Option<TypeRef> {
        self.subtype.clone()
    }
}

/// Wrap a closure as a generator.
///
/// ```rust
/// use specimen_generator::{from_fn, Generator, Random};
///
/// let dice = from_fn(|random: &mut Random| random.int_range(1, 6));
/// let roll = dice.generate(&mut Random::new(1));
/// assert!((1..=6).contains(&roll));
/// ```
pub fn from_fn<F, T>(f: F) -> FnGenerator<F>
where
    F: Fn(&mut Random) -> T + Send + Sync,
    T: Into<Value>,
{
    FnGenerator { f, subtype: None }
}
