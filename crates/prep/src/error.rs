use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for prep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Embedding store could not be built.
    #[error(transparent)]
    Store(#[from] embeddings::StoreError),

    /// Training set could not be loaded.
    #[error(transparent)]
    Align(#[from] dataset::AlignError),

    /// Config file could not be read.
    #[error("config file {}: {source}", path.display())]
    ConfigRead {
        /// config path
        path: PathBuf,
        /// underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for `PrepConfig`.
    #[error("config file {}: {source}", path.display())]
    ConfigParse {
        /// config path
        path: PathBuf,
        /// serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for prep operations.
pub type Result<T> = std::result::Result<T, PrepError>;
