//! Session configuration.
//!
//! Settings are owned by the caller and passed into each generation session;
//! the engine only ever reads them.
//!
//! # YAML Format
//!
//! Every key is optional, unknown keys are ignored:
//!
//! ```yaml
//! collection_min_size: 10
//! collection_max_size: 10
//! max_depth: 4
//! emit_scope: global
//! mode: strict
//! seed: 42
//! ```

use crate::error::{ensure_range, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How emit queues are shared between the nodes a selector matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitScope {
    /// One queue per selector, node and instance of the nearest enclosing
    /// array/collection/map.
    #[default]
    PerContainer,

    /// One queue per selector for the whole session.
    Global,
}

/// Strictness of selector bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Selectors that never match are ignored.
    #[default]
    Lenient,

    /// Selectors that never match fail the session.
    Strict,
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum generated list/set size
    pub collection_min_size: usize,
    /// Maximum generated list/set size
    pub collection_max_size: usize,
    /// Minimum generated map size
    pub map_min_size: usize,
    /// Maximum generated map size
    pub map_max_size: usize,
    /// Minimum generated array length
    pub array_min_length: usize,
    /// Maximum generated array length
    pub array_max_length: usize,
    /// Minimum generated string length
    pub string_min_length: usize,
    /// Maximum generated string length
    pub string_max_length: usize,
    /// Lower bound for generated integers
    pub int_min: i64,
    /// Upper bound for generated integers
    pub int_max: i64,
    /// Lower bound for generated floats
    pub float_min: f64,
    /// Upper bound for generated floats
    pub float_max: f64,
    /// Deepest node created below the root (root depth is 0)
    pub max_depth: usize,
    /// Emit queue sharing
    pub emit_scope: EmitScope,
    /// Selector strictness
    pub mode: Mode,
    /// Seed used when the caller does not supply one
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collection_min_size: 2,
            collection_max_size: 6,
            map_min_size: 2,
            map_max_size: 6,
            array_min_length: 2,
            array_max_length: 6,
            string_min_length: 4,
            string_max_length: 10,
            int_min: 1,
            int_max: 10_000,
            float_min: 1.0,
            float_max: 10_000.0,
            max_depth: 8,
            emit_scope: EmitScope::default(),
            mode: Mode::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every min/max pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_range(
            "collection size",
            self.collection_min_size,
            self.collection_max_size,
        )?;
        ensure_range("map size", self.map_min_size, self.map_max_size)?;
        ensure_range(
            "array length",
            self.array_min_length,
            self.array_max_length,
        )?;
        ensure_range(
            "string length",
            self.string_min_length,
            self.string_max_length,
        )?;
        ensure_range("int", self.int_min, self.int_max)?;
        ensure_range("float", self.float_min, self.float_max)?;
        Ok(())
    }

    /// Set the list/set size bounds.
    pub fn with_collection_size(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        ensure_range("collection size", min, max)?;
        self.collection_min_size = min;
        self.collection_max_size = max;
        Ok(self)
    }

    /// Set the map size bounds.
    pub fn with_map_size(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        ensure_range("map size", min, max)?;
        self.map_min_size = min;
        self.map_max_size = max;
        Ok(self)
    }

    /// Set the array length bounds.
    pub fn with_array_length(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        ensure_range("array length", min, max)?;
        self.array_min_length = min;
        self.array_max_length = max;
        Ok(self)
    }

    /// Set the string length bounds.
    pub fn with_string_length(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        ensure_range("string length", min, max)?;
        self.string_min_length = min;
        self.string_max_length = max;
        Ok(self)
    }

    /// Set the integer bounds.
    pub fn with_int_range(mut self, min: i64, max: i64) -> Result<Self, ConfigError> {
        ensure_range("int", min, max)?;
        self.int_min = min;
        self.int_max = max;
        Ok(self)
    }

    /// Set the maximum node depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the emit queue sharing.
    pub fn with_emit_scope(mut self, emit_scope: EmitScope) -> Self {
        self.emit_scope = emit_scope;
        self
    }

    /// Set selector strictness.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the default seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
