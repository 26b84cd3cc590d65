//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid input records.
/// The allocation itself never fails: every structural problem is recovered
/// by turning participants into rejects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("duplicate participant id: {0}")]
    DuplicateId(String),
}
