#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
#![deny(missing_docs, unused_must_use)]

//! Prep: the data layer in front of a token-classification model.
//!
//! Everything a run needs lives in one [`PrepContext`] built from a
//! [`PrepConfig`]: the embedding store, the inference tokenizer and, once
//! loaded, the training set. The model itself is not part of this crate.
//!
//! Layout (important files):
//! - `config.rs`: `PrepConfig` (JSON, every field optional)
//! - `context.rs`: `PrepContext`, `embed_text` for inference input
//! - `error.rs`: `PrepError`
//! - `bin/prep.rs`: CLI: `stats`, `align`, `embed`, `config`

/// Run configuration.
pub mod config;
/// Owned run context.
pub mod context;
/// Error type.
pub mod error;

pub use config::PrepConfig;
pub use context::{EmbeddedText, EmbeddedToken, PrepContext};
pub use error::{PrepError, Result};

pub use dataset::{Label, LoadWarning, TrainingExample, TrainingSet};
pub use embeddings::{EmbeddingStore, EmbeddingVector};
pub use tokenize::Tokenizer;
