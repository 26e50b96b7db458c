#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]

//! Training set construction. Two parallel line-oriented files are read in
//! lockstep: line N of the tokens file holds whitespace-separated words,
//! line N of the labels file holds their labels (0..=4) in the same order.
//! Every aligned word is looked up in an [`embeddings::EmbeddingStore`] and
//! the hits become `(vector, label)` pairs of one [`TrainingExample`].
//!
//! Contracts: examples never exceed `max_tokens` pairs, the set never exceeds
//! `max_lines` examples, and pair position N always came from word N and
//! label N of the same line. Recoverable problems (out-of-vocabulary words,
//! truncation, mismatched lengths) are returned as [`LoadWarning`]s.

/// Alignment errors.
pub mod error;
/// Example and set containers.
pub mod example;
/// Label domain.
pub mod label;
/// Alignment options and policies.
pub mod options;

mod aligner;

pub use aligner::TrainingSetAligner;
pub use error::{AlignError, Result};
pub use example::{LoadStats, LoadWarning, Pair, Stream, TrainingExample, TrainingSet};
pub use label::{Label, LabelError};
pub use options::{AlignOptions, CapacityPolicy, OovPolicy};
