//! Error types for the query engine.

use thiserror::Error;

/// Errors that can occur when building or executing queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A fragment used an operator outside the supported table.
    #[error("SQL operation '{0}' not supported")]
    UnsupportedOperator(String),

    /// The operation is part of the query surface but the engine only filters.
    #[error("{0} is not implemented for in-memory queries")]
    NotImplemented(&'static str),

    /// A LIKE pattern could not be compiled.
    #[error("invalid LIKE pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
