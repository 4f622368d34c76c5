//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Domain errors represent hierarchy consistency violations and malformed input data.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid node id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    #[error("invalid id scheme: {0}")]
    InvalidScheme(String),

    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error("could not find nearest ancestor for '{0}', the id is unrelated to the hierarchy")]
    NoAncestor(String),

    #[error("'{parent}' is not an ancestor of '{child}', but '{child}' is a child of '{parent}'")]
    AncestryContradiction { parent: String, child: String },

    #[error("'{parent}' would need {missing} synthesized children, the limit is {limit}")]
    BreadthGapTooWide {
        parent: String,
        missing: usize,
        limit: usize,
    },

    #[error("node handle not present in arena: {0:?}")]
    NodeNotFound(Index),

    #[error("invalid instance record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("dimension mismatch at line {line}: expected {expected} values, found {found}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl DomainError {
    /// True for internal-consistency failures that abort a whole build.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::NoAncestor(_)
                | DomainError::AncestryContradiction { .. }
                | DomainError::NodeNotFound(_)
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
