use std::path::PathBuf;

use thiserror::Error;

/// Error type for store construction.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Embedding file could not be opened or read.
    #[error("embedding file {} is unavailable: {source}", path.display())]
    StoreUnavailable {
        /// file that failed
        path: PathBuf,
        /// underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line is missing vector fields, has extra ones, or a field is not a number.
    #[error("malformed embedding line {line}: {reason}")]
    MalformedEmbeddingLine {
        /// 1-based line number
        line: usize,
        /// what was wrong with it
        reason: String,
    },

    /// Vector inserted with the wrong dimension.
    #[error("vector for {word:?} has dimension {actual}, store expects {expected}")]
    DimensionMismatch {
        /// key being inserted
        word: String,
        /// store dimension
        expected: usize,
        /// supplied dimension
        actual: usize,
    },

    /// Zero buckets or zero dimension.
    #[error("invalid store options: {0}")]
    InvalidOptions(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
