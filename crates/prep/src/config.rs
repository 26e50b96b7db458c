use std::path::{Path, PathBuf};

use dataset::AlignOptions;
use embeddings::StoreOptions;
use serde::{Deserialize, Serialize};
use tokenize::TokenizerOptions;

use crate::error::{PrepError, Result};

/// Everything a run reads: file locations plus per-component options.
///
/// Missing JSON fields fall back to the defaults below (50-d GloVe vectors,
/// 400000 buckets, 50 tokens per line, 1000 lines).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// `word v1 .. vD` vectors file
    pub embedding_file: PathBuf,
    /// whitespace-separated words, one example per line
    pub tokens_file: PathBuf,
    /// whitespace-separated labels, parallel to `tokens_file`
    pub labels_file: PathBuf,
    /// embedding store options
    pub store: StoreOptions,
    /// inference tokenizer options
    pub tokenizer: TokenizerOptions,
    /// training set alignment options
    pub align: AlignOptions,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            embedding_file: PathBuf::from("glove.6B.50d.txt"),
            tokens_file: PathBuf::from("tokens.txt"),
            labels_file: PathBuf::from("labels.txt"),
            store: StoreOptions::default(),
            tokenizer: TokenizerOptions::default(),
            align: AlignOptions::default(),
        }
    }
}

impl PrepConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PrepError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PrepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
