//! Generation errors.

use specimen_core::{ConfigError, TypeError, TypeRef};

/// Errors that abort a generation session.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Type could not be resolved
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Emit queue ran out where the value is mandatory
    #[error("emit() ran out of items at {path} (selector {selector}); supply more items or use when_empty_emit_null()")]
    EmitExhausted { path: String, selector: String },

    /// Emit queue still holds items at the end of the session
    #[error("emit() has {remaining} unused item(s) (selector {selector}); use ignore_unused() to allow leftovers")]
    UnusedEmitItems { selector: String, remaining: usize },

    /// Subtype is not assignable to the declared type
    #[error("Type '{subtype}' is not assignable to '{declared}' at {path}")]
    InvalidSubtype {
        path: String,
        declared: TypeRef,
        subtype: TypeRef,
    },

    /// Strict mode: selectors that never applied
    #[error("Unused selector(s): {}", .0.join(", "))]
    UnusedSelectors(Vec<String>),

    /// Generated value does not fit the requested Rust type
    #[error("Failed to convert generated value: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Any error returned by a terminal operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Self::Generation(GenerationError::Type(err))
    }
}

/// Result type for terminal operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
