//! Fluent builder and terminal operations.

use crate::context::{GenerationContext, Override};
use crate::error::{Error, GenerationError};
use crate::select::Selector;
use crate::session;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use specimen_core::{ConfigError, Settings, TypeRef, TypeRegistry, Value};
use specimen_generator::{ContainerSpec, EmitGenerator, Generator, Random};
use std::sync::Arc;
use tracing::debug;

/// Builder for generated instances of one root type.
///
/// Rules are declared with selectors and applied to every instance the
/// builder creates:
///
/// ```rust
/// use specimen::{select, Specimen};
/// use specimen_core::{CompositeDef, ScalarKind, TypeRef, TypeRegistry};
/// use std::sync::Arc;
///
/// let registry = TypeRegistry::new()
///     .with_type(
///         CompositeDef::new("Person")
///             .field("name", ScalarKind::String)
///             .field("age", ScalarKind::Int32),
///     )
///     .unwrap();
///
/// let person = Specimen::new(Arc::new(registry), TypeRef::named("Person"))
///     .set(select::field("Person", "name"), "Ada")
///     .with_seed(42)
///     .create()
///     .unwrap();
///
/// assert_eq!(person.get("name").and_then(|v| v.as_str()), Some("Ada"));
/// assert!(person.get("age").and_then(|v| v.as_i32()).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Specimen {
    ctx: GenerationContext,
    seed: Option<u64>,
}

impl Specimen {
    /// Builder for a type that only uses built-in types.
    pub fn of(root: impl Into<TypeRef>) -> Self {
        Self::new(Arc::new(TypeRegistry::new()), root)
    }

    /// Builder for a type described by `registry`.
    pub fn new(registry: Arc<TypeRegistry>, root: impl Into<TypeRef>) -> Self {
        Self {
            ctx: GenerationContext::new(registry, root.into()),
            seed: None,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.ctx.set_settings(settings);
        self
    }

    /// Fix the seed; takes precedence over `Settings::seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate matching nodes with a custom generator.
    pub fn generate<G>(mut self, selector: Selector, generator: G) -> Self
    where
        G: Generator + 'static,
    {
        self.ctx
            .put_override(selector, Override::Generator(Arc::new(generator)));
        self
    }

    /// Assign a literal value to matching nodes.
    ///
    /// An object literal of another composite than the declared one also
    /// re-types the node to that composite.
    pub fn set(mut self, selector: Selector, value: impl Into<Value>) -> Self {
        self.ctx.put_override(selector, Override::Value(value.into()));
        self
    }

    /// Emit the given values, in order, to matching nodes.
    ///
    /// Fails if the emitter holds `null` items and the selector targets a map
    /// key.
    pub fn emit(mut self, selector: Selector, emit: EmitGenerator) -> Result<Self, ConfigError> {
        if emit.has_null_items() && self.ctx.targets_map_key(&selector) {
            return Err(ConfigError::NullMapKey {
                selector: selector.to_string(),
            });
        }
        self.ctx.put_override(selector, Override::Emit(Arc::new(emit)));
        Ok(self)
    }

    /// Size (and optionally re-type) matching arrays, collections and maps.
    pub fn container(mut self, selector: Selector, spec: ContainerSpec) -> Self {
        self.ctx.put_override(selector, Override::Container(spec));
        self
    }

    /// Generate matching nodes as `subtype`.
    ///
    /// The subtype must be resolvable; assignability to each matched node is
    /// checked during generation. Fails if the new type exposes a map key to
    /// an earlier emit rule with `null` items.
    pub fn subtype(mut self, selector: Selector, subtype: impl Into<TypeRef>) -> Result<Self, ConfigError> {
        let subtype = subtype.into();
        self.ctx.registry().describe(&subtype)?;
        self.ctx.put_subtype(selector, subtype);
        self.ctx.check_null_map_keys()?;
        Ok(self)
    }

    /// Generate `null` for matching nodes.
    pub fn ignore(mut self, selector: Selector) -> Self {
        self.ctx.put_override(selector, Override::Ignore);
        self
    }

    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    /// Create one instance.
    pub fn create(&self) -> Result<Value, Error> {
        self.ctx.check_null_map_keys()?;
        Ok(session::run(&self.ctx, self.base_seed())?)
    }

    /// Create one instance and convert it into a Rust type.
    pub fn create_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let value = self.create()?;
        let json = serde_json::to_value(&value).map_err(GenerationError::from)?;
        Ok(serde_json::from_value(json).map_err(GenerationError::from)?)
    }

    /// Lazily create instances, one session per item.
    ///
    /// An invalid rule set yields a single error and ends the iterator.
    pub fn iter(&self) -> SpecimenIter<'_> {
        SpecimenIter {
            ctx: &self.ctx,
            base_seed: self.base_seed(),
            index: 0,
            state: match self.ctx.check_null_map_keys() {
                Ok(()) => IterState::Running,
                Err(e) => IterState::Invalid(e),
            },
        }
    }

    /// Create `count` instances sequentially.
    pub fn create_many(&self, count: usize) -> Result<Vec<Value>, Error> {
        self.iter().take(count).collect()
    }

    /// Create `count` instances in parallel.
    ///
    /// Each item gets the same derived seed as in [`Specimen::create_many`],
    /// so both return identical batches for the same seed.
    pub fn par_create(&self, count: usize) -> Result<Vec<Value>, Error> {
        self.ctx.check_null_map_keys()?;
        let base_seed = self.base_seed();
        debug!("Creating {} instance(s) in parallel", count);
        (0..count)
            .into_par_iter()
            .map(|index| {
                let seed = Random::derive_seed(base_seed, index as u64);
                session::run(&self.ctx, seed).map_err(Error::from)
            })
            .collect()
    }

    fn base_seed(&self) -> u64 {
        self.seed
            .or(self.ctx.settings().seed)
            .unwrap_or_else(rand::random)
    }
}

/// Endless iterator of generated instances. See [`Specimen::iter`].
#[derive(Debug)]
pub struct SpecimenIter<'s> {
    ctx: &'s GenerationContext,
    base_seed: u64,
    index: u64,
    state: IterState,
}

#[derive(Debug)]
enum IterState {
    Running,
    Invalid(ConfigError),
    Done,
}

impl SpecimenIter<'_> {
    /// Seed shared by the whole sequence.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }
}

impl Iterator for SpecimenIter<'_> {
    type Item = Result<Value, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, IterState::Done) {
            IterState::Running => self.state = IterState::Running,
            IterState::Invalid(e) => return Some(Err(e.into())),
            IterState::Done => return None,
        }
        let seed = Random::derive_seed(self.base_seed, self.index);
        self.index += 1;
        Some(session::run(self.ctx, seed).map_err(Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select;
    use specimen_core::ScalarKind;

    #[test]
    fn test_seed_precedence() {
        let settings = Settings::default().with_seed(1);
        let from_settings = Specimen::of(ScalarKind::Int64).with_settings(settings.clone());
        let explicit = Specimen::of(ScalarKind::Int64)
            .with_settings(settings)
            .with_seed(2);

        assert_eq!(from_settings.base_seed(), 1);
        assert_eq!(explicit.base_seed(), 2);
    }

    #[test]
    fn test_iter_matches_create() {
        let specimen = Specimen::of(TypeRef::list(ScalarKind::String)).with_seed(5);
        let first = specimen.iter().next().unwrap().unwrap();
        assert_eq!(first, specimen.create().unwrap());
        assert_eq!(specimen.iter().base_seed(), 5);
    }

    #[test]
    fn test_iter_stops_after_config_error() {
        let mut specimen = Specimen::of(TypeRef::map(ScalarKind::String, ScalarKind::Int32));
        specimen.ctx.put_override(
            select::all(ScalarKind::String),
            Override::Emit(Arc::new(EmitGenerator::new().items([None, Some("a")]))),
        );

        let mut iter = specimen.iter();
        assert!(matches!(
            iter.next(),
            Some(Err(Error::Config(ConfigError::NullMapKey { .. })))
        ));
        assert!(iter.next().is_none());
        assert!(matches!(specimen.create(), Err(Error::Config(_))));
        assert!(matches!(specimen.par_create(2), Err(Error::Config(_))));
    }

    #[test]
    fn test_subtype_must_resolve() {
        let result = Specimen::of(ScalarKind::Int32).subtype(select::root(), TypeRef::named("Missing"));
        assert!(matches!(result, Err(ConfigError::Type(_))));
    }
}
