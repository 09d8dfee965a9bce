//! Size and subtype overrides for arrays, collections and maps.

use crate::random::Random;
use specimen_core::{ensure_range, ConfigError, TypeRef};

/// Container override.
///
/// Unset bounds fall back to the session settings for the container kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    min_size: Option<usize>,
    max_size: Option<usize>,
    subtype: Option<TypeRef>,
}

impl ContainerSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact size.
    pub fn size(mut self, size: usize) -> Self {
        self.min_size = Some(size);
        self.max_size = Some(size);
        self
    }

    /// Inclusive size range.
    pub fn size_range(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        ensure_range("size", min, max)?;
        self.min_size = Some(min);
        self.max_size = Some(max);
        Ok(self)
    }

    pub fn min_size(mut self, min: usize) -> Self {
        self.min_size = Some(min);
        self
    }

    pub fn max_size(mut self, max: usize) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Generate the container as `subtype`, e.g. a `Set` for a `List` node.
    pub fn subtype(mut self, subtype: TypeRef) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn declared_subtype(&self) -> Option<&TypeRef> {
        self.subtype.as_ref()
    }

    /// Effective inclusive bounds given the settings defaults.
    ///
    /// A single configured bound drags the default on the other side.
    pub fn bounds(&self, default_min: usize, default_max: usize) -> (usize, usize) {
        match (self.min_size, self.max_size) {
            (Some(min), Some(max)) => (min, max.max(min)),
            (Some(min), None) => (min, default_max.max(min)),
            (None, Some(max)) => (default_min.min(max), max),
            (None, None) => (default_min, default_max),
        }
    }

    /// Pick a size.
    pub fn pick_size(&self, default_min: usize, default_max: usize, random: &mut Random) -> usize {
        let (min, max) = self.bounds(default_min, default_max);
        random.usize_range(min, max)
    }
}
