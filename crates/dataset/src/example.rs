use std::fmt;

use embeddings::EmbeddingVector;

use crate::label::Label;

/// One aligned `(vector, label)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    /// 0-based position of the word (and its label) in the source line
    pub position: usize,
    /// embedding of the word
    pub vector: EmbeddingVector,
    /// label from the same position of the labels line
    pub label: Label,
}

/// Pairs drawn from one source line. Its length is the pair count; there is
/// no end-of-data sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    line: usize,
    pairs: Vec<Pair>,
}

impl TrainingExample {
    pub(crate) fn new(line: usize, capacity: usize) -> Self {
        Self {
            line,
            pairs: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, position: usize, vector: EmbeddingVector, label: Label) {
        self.pairs.push(Pair {
            position,
            vector,
            label,
        });
    }

    /// 1-based line number in the source files.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Pairs in line order.
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if no pair survived lookup.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Labels in line order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.pairs.iter().map(|p| p.label)
    }
}

/// Which of the two parallel files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// words file
    Tokens,
    /// labels file
    Labels,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Tokens => f.write_str("tokens"),
            Stream::Labels => f.write_str("labels"),
        }
    }
}

/// Recoverable problem met during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line had more aligned pairs than `max_tokens`; the tail was dropped.
    TokensTruncated {
        /// 1-based line number
        line: usize,
        /// aligned pairs on the line
        pairs: usize,
        /// pairs kept
        max_tokens: usize,
    },
    /// More lines than `max_lines`; reading stopped.
    LinesTruncated {
        /// lines kept
        max_lines: usize,
    },
    /// Word and label counts differ on one line; the shorter side wins.
    PairCountMismatch {
        /// 1-based line number
        line: usize,
        /// words on the line
        tokens: usize,
        /// labels on the line
        labels: usize,
    },
    /// First occurrence of a word with no embedding.
    OutOfVocabulary {
        /// normalized word
        word: String,
        /// 1-based line number of the first occurrence
        line: usize,
    },
    /// One file ran out first; the other's remaining lines were ignored.
    UnmatchedLines {
        /// file with leftover lines
        stream: Stream,
        /// number of leftover lines
        count: usize,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::TokensTruncated {
                line,
                pairs,
                max_tokens,
            } => write!(f, "line {line}: {pairs} pairs exceed the {max_tokens} token limit"),
            LoadWarning::LinesTruncated { max_lines } => {
                write!(f, "more than {max_lines} lines, the rest were ignored")
            }
            LoadWarning::PairCountMismatch {
                line,
                tokens,
                labels,
            } => write!(f, "line {line}: {tokens} tokens but {labels} labels"),
            LoadWarning::OutOfVocabulary { word, line } => {
                write!(f, "line {line}: {word:?} has no embedding")
            }
            LoadWarning::UnmatchedLines { stream, count } => {
                write!(f, "{count} trailing {stream} lines have no counterpart")
            }
        }
    }
}

/// Counters for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// line pairs read from the files
    pub lines: usize,
    /// pairs kept across all examples
    pub pairs: usize,
    /// pairs dropped for missing embeddings
    pub oov_pairs: usize,
    /// lines dropped whole (no usable pair, or `OovPolicy::SkipExample`)
    pub dropped_lines: usize,
}

/// Examples of one load, in file order, with what went wrong along the way.
///
/// Lines without a single usable pair are not represented; use
/// [`TrainingExample::line`] to map back to the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub(crate) examples: Vec<TrainingExample>,
    pub(crate) warnings: Vec<LoadWarning>,
    pub(crate) stats: LoadStats,
}

impl TrainingSet {
    /// Examples in file order.
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Warnings in the order they were raised.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Load counters.
    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// True if no example was produced.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Hand the examples to a consumer.
    pub fn into_examples(self) -> Vec<TrainingExample> {
        self.examples
    }
}

impl<'a> IntoIterator for &'a TrainingSet {
    type Item = &'a TrainingExample;
    type IntoIter = std::slice::Iter<'a, TrainingExample>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
