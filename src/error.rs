//! Error types for stratified differential expression analysis.

use thiserror::Error;

/// Main error type for analysis operations.
#[derive(Error, Debug)]
pub enum DeError {
    #[error("Gene '{query}' not found in expression data")]
    GeneNotFound { query: String },

    #[error("Gene '{query}' matches multiple rows: {candidates:?}")]
    AmbiguousGene {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Group '{label}' has {size} samples, need at least {min}")]
    InsufficientGroupSize {
        label: String,
        size: usize,
        min: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Duplicate {kind} identifier '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Unknown sample '{id}'")]
    UnknownSample { id: String },

    #[error("Invalid expression matrix: {reason}")]
    InvalidMatrix { reason: String },

    #[error("Invalid p-value at index {index}: {value}")]
    InvalidPValue { index: usize, value: f64 },

    #[error("Invalid analysis options: {reason}")]
    InvalidOptions { reason: String },

    #[error("Empty input: {reason}")]
    EmptyInput { reason: String },
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, DeError>;
