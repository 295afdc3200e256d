//! Error types for filterable collections and form validation.

use sift_query::QueryError;

/// Errors that can occur when building filters or validating forms.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// A fragment emitted by a search filter failed in the query engine.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The expression names a filter the registry does not know.
    #[error("unknown search filter '{0}'")]
    UnknownFilter(String),

    /// The filter does not accept one of the expression's modifiers.
    #[error("{filter} does not support modifier '{modifier}'")]
    UnsupportedModifier { filter: String, modifier: String },

    /// The expression has no field name.
    #[error("filter expression '{0}' has no field name")]
    EmptyExpression(String),

    /// Requirement rules could not be deserialized.
    #[error("invalid requirement rules: {0}")]
    Rules(#[from] serde_json::Error),
}

impl SiftError {
    /// Create an unsupported-modifier error.
    pub fn unsupported_modifier(filter: impl Into<String>, modifier: impl Into<String>) -> Self {
        Self::UnsupportedModifier {
            filter: filter.into(),
            modifier: modifier.into(),
        }
    }
}

/// Result type for collection and validator operations.
pub type Result<T> = std::result::Result<T, SiftError>;
