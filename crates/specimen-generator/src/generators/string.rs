//! String generator.

use crate::generator::Generator;
use crate::random::Random;
use specimen_core::{ensure_range, ConfigError};

/// Generates uppercase alphabetic strings.
///
/// The length bounds apply to the random body; a configured prefix is
/// prepended on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringGenerator {
    min_length: usize,
    max_length: usize,
    prefix: String,
    allow_empty: bool,
}

impl StringGenerator {
    /// Generator for strings of 4 to 10 characters.
    pub fn new() -> Self {
        Self {
            min_length: 4,
            max_length: 10,
            prefix: String::new(),
            allow_empty: false,
        }
    }

    /// Minimum length; raises the maximum if it is lower.
    pub fn min(mut self, length: usize) -> Self {
        self.min_length = length;
        self.max_length = self.max_length.max(length);
        self
    }

    /// Maximum length; lowers the minimum if it is higher.
    pub fn max(mut self, length: usize) -> Self {
        self.max_length = length;
        self.min_length = self.min_length.min(length);
        self
    }

    /// Set both length bounds.
    pub fn length(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        ensure_range("String length", min, max)?;
        self.min_length = min;
        self.max_length = max;
        Ok(self)
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Occasionally generate an empty string.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }
}

impl Default for StringGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for StringGenerator {
    type Output = String;

    fn generate(&self, random: &mut Random) -> String {
        if self.allow_empty && random.chance(0.1) {
            return String::new();
        }
        let length = random.usize_range(self.min_length, self.max_length);
        let mut out = String::with_capacity(self.prefix.len() + length);
        out.push_str(&self.prefix);
        out.push_str(&random.alphabetic(length));
        out
    }
}
