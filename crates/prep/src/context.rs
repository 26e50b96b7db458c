use dataset::{TrainingSet, TrainingSetAligner};
use embeddings::{EmbeddingStore, EmbeddingVector};
use tokenize::Tokenizer;
use tracing::debug;

use crate::config::PrepConfig;
use crate::error::Result;

/// One inference token and its lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedToken<'a> {
    /// lower-cased token
    pub token: String,
    /// byte offset in the input text
    pub offset: usize,
    /// `None` when the word has no embedding
    pub vector: Option<&'a EmbeddingVector>,
}

/// Free text turned into model input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddedText<'a> {
    /// tokens in input order, hits and misses alike
    pub tokens: Vec<EmbeddedToken<'a>>,
    /// input held more tokens than the tokenizer cap
    pub truncated: bool,
}

impl<'a> EmbeddedText<'a> {
    /// Vectors of the tokens that were found, in order.
    pub fn vectors(&self) -> impl Iterator<Item = &'a EmbeddingVector> + '_ {
        self.tokens.iter().filter_map(|t| t.vector)
    }

    /// Tokens with no embedding.
    pub fn misses(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens
            .iter()
            .filter(|t| t.vector.is_none())
            .map(|t| t.token.as_str())
    }

    /// Number of tokens, hits and misses.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the text had no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// State of one run: the store, the tokenizer and the training set once loaded.
#[derive(Debug)]
pub struct PrepContext {
    config: PrepConfig,
    store: EmbeddingStore,
    tokenizer: Tokenizer,
    training_set: Option<TrainingSet>,
}

impl PrepContext {
    /// Build the store from `config.embedding_file`.
    pub fn from_config(config: PrepConfig) -> Result<Self> {
        let store = EmbeddingStore::build(&config.embedding_file, &config.store)?;
        Ok(Self::with_store(config, store))
    }

    /// Context around a store built elsewhere.
    pub fn with_store(config: PrepConfig, store: EmbeddingStore) -> Self {
        let tokenizer = Tokenizer::from_options(&config.tokenizer);
        Self {
            config,
            store,
            tokenizer,
            training_set: None,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Embedding store.
    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    /// Inference tokenizer.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Align the configured tokens/labels files, replacing any previous set.
    pub fn load_training_set(&mut self) -> Result<&TrainingSet> {
        let aligner = TrainingSetAligner::new(&self.store, self.config.align.clone());
        let set = aligner.load(&self.config.tokens_file, &self.config.labels_file)?;
        Ok(&*self.training_set.insert(set))
    }

    /// Training set, if loaded.
    pub fn training_set(&self) -> Option<&TrainingSet> {
        self.training_set.as_ref()
    }

    /// Move the training set out for the training loop.
    pub fn take_training_set(&mut self) -> Option<TrainingSet> {
        self.training_set.take()
    }

    /// Tokenize `text` and look every token up.
    pub fn embed_text(&self, text: &str) -> EmbeddedText<'_> {
        let batch = self.tokenizer.tokenize_bounded(text);
        let embedded = batch
            .tokens
            .into_iter()
            .zip(batch.offsets)
            .map(|(token, offset)| {
                let vector = self.store.lookup(&token);
                EmbeddedToken {
                    token,
                    offset,
                    vector,
                }
            })
            .collect();
        let result = EmbeddedText {
            tokens: embedded,
            truncated: batch.truncated,
        };
        debug!(
            tokens = result.len(),
            misses = result.misses().count(),
            "text embedded"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embeddings::StoreOptions;
    use tokenize::{SeparatorSet, TokenizerOptions};

    fn context(max_tokens: usize) -> PrepContext {
        let vocab = "hi 1 0\nolivia 2 0\nbrown 3 0\nlegal 4 0\n";
        let mut config = PrepConfig::default();
        config.store = StoreOptions::new(2, 5);
        config.tokenizer = TokenizerOptions {
            separators: SeparatorSet::canonical(),
            max_tokens,
        };
        let store = EmbeddingStore::from_reader(vocab.as_bytes(), &config.store).unwrap();
        PrepContext::with_store(config, store)
    }

    #[test]
    fn misses_are_explicit() {
        let ctx = context(50);
        let text = ctx.embed_text("Hi, Olivia Brown! Legal aid?");
        assert_eq!(text.len(), 5);
        assert_eq!(text.tokens[1].offset, 4);
        let firsts: Vec<f32> = text.vectors().map(|v| v[0]).collect();
        assert_eq!(firsts, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(text.misses().collect::<Vec<_>>(), ["aid"]);
        assert!(!text.truncated);
    }

    #[test]
    fn cap_sets_truncated() {
        let ctx = context(2);
        let text = ctx.embed_text("hi olivia brown");
        assert_eq!(text.len(), 2);
        assert!(text.truncated);
    }

    #[test]
    fn no_training_set_until_loaded() {
        let mut ctx = context(50);
        assert!(ctx.training_set().is_none());
        assert!(ctx.take_training_set().is_none());
    }
}
