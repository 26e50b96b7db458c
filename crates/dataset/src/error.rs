use thiserror::Error;

use crate::example::LoadWarning;

/// Error type for training set loads. Any error aborts the whole load.
#[derive(Debug, Error)]
pub enum AlignError {
    /// Tokens or labels file could not be opened or read.
    #[error("training file {location} is unavailable: {source}")]
    TrainingFileUnavailable {
        /// path, or stream name for in-memory readers
        location: String,
        /// underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Line that is readable but not valid UTF-8 text.
    #[error("training file {location}, line {line}: {reason}")]
    MalformedLine {
        /// path, or stream name for in-memory readers
        location: String,
        /// 1-based line number
        line: usize,
        /// what is wrong with the line
        reason: String,
    },

    /// Label field outside 0..=4.
    #[error("line {line}, position {position}: invalid label {value:?}")]
    InvalidLabel {
        /// 1-based line number
        line: usize,
        /// 0-based token position
        position: usize,
        /// raw field
        value: String,
    },

    /// Word missing from the store under `OovPolicy::Fail`.
    #[error("line {line}, position {position}: {word:?} has no embedding")]
    OutOfVocabulary {
        /// 1-based line number
        line: usize,
        /// 0-based token position
        position: usize,
        /// word as written
        word: String,
    },

    /// Capacity overflow under `CapacityPolicy::Fail`.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(LoadWarning),
}

/// Result type for alignment.
pub type Result<T> = std::result::Result<T, AlignError>;
