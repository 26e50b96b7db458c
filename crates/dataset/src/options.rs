use serde::{Deserialize, Serialize};

/// Handling of a word with no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OovPolicy {
    /// Drop the pair, keep the rest of the line. One warning per distinct word.
    #[default]
    SkipPair,
    /// Drop the whole line.
    SkipExample,
    /// Abort the load with `AlignError::OutOfVocabulary`.
    Fail,
}

/// Handling of lines or files over capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Keep the first N and record one warning.
    #[default]
    Truncate,
    /// Abort the load with `AlignError::CapacityExceeded`.
    Fail,
}

/// Aligner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOptions {
    /// max pairs per example
    pub max_tokens: usize,
    /// max examples (source lines) per set
    pub max_lines: usize,
    /// out-of-vocabulary handling
    pub on_oov: OovPolicy,
    /// over-capacity handling
    pub on_capacity: CapacityPolicy,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            max_tokens: 50,
            max_lines: 1000,
            on_oov: OovPolicy::SkipPair,
            on_capacity: CapacityPolicy::Truncate,
        }
    }
}
