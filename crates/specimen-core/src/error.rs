//! Error types shared across the specimen crates.

use std::fmt::Display;

/// Structural errors raised while resolving type expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    /// Type expression could not be parsed
    #[error("Invalid type expression '{input}' at position {position}: {reason}")]
    Parse {
        input: String,
        position: usize,
        reason: &'static str,
    },

    /// Composite type not found in the registry
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Type parameter without a concrete binding
    #[error("Cannot resolve type parameter '{param}' in {location}")]
    UnresolvedTypeParameter { param: String, location: String },

    /// More type arguments than declared parameters
    #[error("Type '{name}' expects at most {expected} type argument(s), got {actual}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised synchronously by configuring calls.
///
/// A configuration error means the caller misused the API; it never depends
/// on randomness and is never deferred to generation time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Lower bound greater than upper bound
    #[error("{what} 'min' must be less than or equal 'max': {what}({min}, {max})")]
    InvalidRange {
        what: &'static str,
        min: String,
        max: String,
    },

    /// Null emit item routed to a map key
    #[error("emit() null items are not supported for map keys: {selector}")]
    NullMapKey { selector: String },

    /// Composite registered twice
    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    /// Composite name clashes with a built-in type
    #[error("Type name '{0}' is reserved for a built-in type")]
    ReservedTypeName(String),

    /// Type expression or subtype is invalid
    #[error("Invalid type: {0}")]
    Type(#[from] TypeError),

    /// Error reading a settings or catalog file
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Build an [`ConfigError::InvalidRange`] from any displayable bounds.
    pub fn invalid_range(what: &'static str, min: impl Display, max: impl Display) -> Self {
        Self::InvalidRange {
            what,
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Fail with [`ConfigError::InvalidRange`] unless `min <= max`.
///
/// Incomparable bounds (NaN) are rejected as well.
pub fn ensure_range<T>(what: &'static str, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + Display,
{
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::invalid_range(what, min, max))
    }
}
