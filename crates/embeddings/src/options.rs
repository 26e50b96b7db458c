use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// What to do with a line that does not parse as `word v1 .. vD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// Abort construction with `StoreError::MalformedEmbeddingLine`.
    #[default]
    Fail,
    /// Skip the line and log a warning.
    Skip,
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Number of numeric fields per vector.
    pub dimension: usize,
    /// Fixed bucket count; never resized.
    pub buckets: usize,
    /// Malformed line handling.
    pub on_malformed: MalformedLinePolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            dimension: 50,
            buckets: 400_000,
            on_malformed: MalformedLinePolicy::Fail,
        }
    }
}

impl StoreOptions {
    /// Options with the given dimension and bucket count, failing on malformed lines.
    pub fn new(dimension: usize, buckets: usize) -> Self {
        Self {
            dimension,
            buckets,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(StoreError::InvalidOptions("dimension must be > 0".into()));
        }
        if self.buckets == 0 {
            return Err(StoreError::InvalidOptions("buckets must be > 0".into()));
        }
        Ok(())
    }
}
