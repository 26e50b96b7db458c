#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]

//! Word tokenizer: splits text on a fixed separator set and yields at most
//! `max_tokens` tokens, reporting when input was left over.

use std::fmt;
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Separator character sets.
pub mod separators;

pub use separators::{SeparatorSet, CANONICAL_SEPARATORS};

/// Default token cap per input.
pub const MAX_TOKENS: usize = 50;

/// Tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// characters that split tokens
    pub separators: SeparatorSet,
    /// hard cap on tokens yielded per input
    pub max_tokens: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            separators: SeparatorSet::canonical(),
            max_tokens: MAX_TOKENS,
        }
    }
}

/// A maximal run of non-separator characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Token<'a> {
    /// Token text as it appears in the input.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the token in the input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Lower-cased text, the form used for embedding lookups.
    pub fn normalized(&self) -> String {
        self.text.to_lowercase()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Lazy token sequence over one input. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    separators: &'a SeparatorSet,
    rest: &'a str,
    offset: usize,
    remaining: usize,
}

impl<'a> Tokens<'a> {
    fn skip_separators(&mut self) {
        let separators = self.separators;
        let trimmed = self.rest.trim_start_matches(|c: char| separators.contains(c));
        self.offset += self.rest.len() - trimmed.len();
        self.rest = trimmed;
    }

    /// True once the cap has been reached while non-separator input remains.
    pub fn is_truncated(&self) -> bool {
        let separators = self.separators;
        self.remaining == 0 && self.rest.chars().any(|c| !separators.contains(c))
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.remaining == 0 {
            return None;
        }
        self.skip_separators();
        if self.rest.is_empty() {
            return None;
        }
        let separators = self.separators;
        let end = self
            .rest
            .find(|c: char| separators.contains(c))
            .unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        let token = Token {
            text,
            offset: self.offset,
        };
        self.rest = rest;
        self.offset += end;
        self.remaining -= 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl FusedIterator for Tokens<'_> {}

/// Normalized tokens collected from one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenBatch {
    /// lower-cased tokens, in input order
    pub tokens: Vec<String>,
    /// byte offset of each token in the input
    pub offsets: Vec<usize>,
    /// input held more tokens than the cap
    pub truncated: bool,
}

/// Splits text on a separator set.
#[derive(Debug, Clone, PartialEq)]
pub struct Tokenizer {
    separators: SeparatorSet,
    max_tokens: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::canonical()
    }
}

impl Tokenizer {
    /// Tokenizer with custom separators and cap.
    pub fn new(separators: SeparatorSet, max_tokens: usize) -> Self {
        Self {
            separators,
            max_tokens,
        }
    }

    /// Canonical separators, [`MAX_TOKENS`] cap.
    pub fn canonical() -> Self {
        Self::new(SeparatorSet::canonical(), MAX_TOKENS)
    }

    /// Build from configuration.
    pub fn from_options(options: &TokenizerOptions) -> Self {
        Self::new(options.separators.clone(), options.max_tokens)
    }

    /// Token cap.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Separator set in use.
    pub fn separators(&self) -> &SeparatorSet {
        &self.separators
    }

    /// Lazy tokens of `text`, at most `max_tokens` of them.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            separators: &self.separators,
            rest: text,
            offset: 0,
            remaining: self.max_tokens,
        }
    }

    /// Collect normalized tokens; logs a warning when the cap cut the input short.
    pub fn tokenize_bounded(&self, text: &str) -> TokenBatch {
        let mut tokens = self.tokenize(text);
        let (offsets, collected): (Vec<usize>, Vec<String>) = tokens.by_ref().map(|t| (t.offset(), t.normalized())).unzip();
        let truncated = tokens.is_truncated();
        if truncated {
            warn!(
                max_tokens = self.max_tokens,
                "input exceeds the token limit, trailing tokens dropped"
            );
        }
        TokenBatch {
            tokens: collected,
            offsets,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    const SENTENCE: &str =
        "Hi, my name is Olivia Brown and I'm looking for legal help for workplace harassment.";

    #[test]
    fn canonical_sentence() {
        let batch = Tokenizer::canonical().tokenize_bounded(SENTENCE);
        let expected = [
            "hi", "my", "name", "is", "olivia", "brown", "and", "i", "m", "looking", "for",
            "legal", "help", "for", "workplace", "harassment",
        ];
        assert_eq!(batch.tokens, expected);
        assert!(!batch.truncated);
    }

    #[test]
    fn raw_tokens_keep_case_and_offsets() {
        let tokenizer = Tokenizer::canonical();
        let toks: Vec<Token> = tokenizer.tokenize("  (Olivia)-Brown").collect();
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].as_str(), "Olivia");
        assert_eq!(toks[0].offset(), 3);
        assert_eq!(toks[1].as_str(), "Brown");
        assert_eq!(toks[1].offset(), 11);
        assert_eq!(toks[1].normalized(), "brown");
    }

    #[test]
    fn empty_and_separator_only_inputs() {
        let tokenizer = Tokenizer::canonical();
        assert_eq!(tokenizer.tokenize("").count(), 0);
        assert_eq!(tokenizer.tokenize(" ,.;\n\t").count(), 0);
    }

    #[test]
    fn restartable() {
        let tokenizer = Tokenizer::canonical();
        let mut first = tokenizer.tokenize("a b c");
        assert_eq!(first.next().map(|t| t.as_str()), Some("a"));
        let resumed: Vec<&str> = first.clone().map(|t| t.as_str()).collect();
        assert_eq!(resumed, ["b", "c"]);
        let again: Vec<&str> = tokenizer.tokenize("a b c").map(|t| t.as_str()).collect();
        assert_eq!(again, ["a", "b", "c"]);
    }

    #[test]
    fn cap_truncates_with_signal() {
        let tokenizer = Tokenizer::new(SeparatorSet::canonical(), 3);
        let batch = tokenizer.tokenize_bounded("one two three four five");
        assert_eq!(batch.tokens, ["one", "two", "three"]);
        assert_eq!(batch.offsets, [0, 4, 8]);
        assert!(batch.truncated);
    }

    #[test]
    fn trailing_separators_after_cap_are_not_truncation() {
        let tokenizer = Tokenizer::new(SeparatorSet::canonical(), 3);
        let mut tokens = tokenizer.tokenize("one two three ...\n");
        assert_eq!(tokens.by_ref().count(), 3);
        assert!(!tokens.is_truncated());
    }

    #[test]
    fn sixty_words_yield_fifty() {
        let text = vec!["word"; 60].join(" ");
        let batch = Tokenizer::canonical().tokenize_bounded(&text);
        assert_eq!(batch.tokens.len(), MAX_TOKENS);
        assert!(batch.truncated);
    }

    #[test]
    fn custom_separators() {
        let tokenizer = Tokenizer::new(SeparatorSet::from("|"), 10);
        let toks: Vec<&str> = tokenizer.tokenize("a b|c||d").map(|t| t.as_str()).collect();
        assert_eq!(toks, ["a b", "c", "d"]);
    }

    quickcheck! {
        fn tokens_are_nonempty_separator_free(text: String) -> bool {
            let tokenizer = Tokenizer::canonical();
            tokenizer.tokenize(&text).all(|t| {
                !t.as_str().is_empty()
                    && !t.as_str().chars().any(|c| tokenizer.separators().contains(c))
            })
        }

        fn never_exceeds_cap(words: Vec<String>, cap: u8) -> bool {
            let cap = usize::from(cap % 8);
            let tokenizer = Tokenizer::new(SeparatorSet::canonical(), cap);
            let text = words.join(" ");
            tokenizer.tokenize(&text).count() <= cap
        }

        fn offsets_point_at_tokens(text: String) -> bool {
            let tokenizer = Tokenizer::canonical();
            tokenizer
                .tokenize(&text)
                .all(|t| text.get(t.offset()..t.offset() + t.as_str().len()) == Some(t.as_str()))
        }
    }
}
