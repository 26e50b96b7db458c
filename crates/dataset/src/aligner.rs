use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Split};
use std::path::Path;

use embeddings::{normalize, EmbeddingStore};
use tracing::{debug, info, warn};

use crate::error::{AlignError, Result};
use crate::example::{LoadWarning, Stream, TrainingExample, TrainingSet};
use crate::label::Label;
use crate::options::{AlignOptions, CapacityPolicy, OovPolicy};

/// Builds a [`TrainingSet`] from parallel tokens/labels files.
///
/// Borrows the store read-only; one aligner can run any number of loads.
#[derive(Debug, Clone)]
pub struct TrainingSetAligner<'s> {
    store: &'s EmbeddingStore,
    options: AlignOptions,
}

/// Mutable state of one load.
#[derive(Default)]
struct LoadState {
    set: TrainingSet,
    missing: HashSet<String>,
}

impl LoadState {
    fn warn(&mut self, warning: LoadWarning) {
        warn!(%warning, "training set");
        self.set.warnings.push(warning);
    }

    /// One warning for the lines only one file still holds.
    fn unmatched(&mut self, tokens_rest: usize, labels_rest: usize) {
        let (stream, count) = match tokens_rest.cmp(&labels_rest) {
            Ordering::Greater => (Stream::Tokens, tokens_rest - labels_rest),
            Ordering::Less => (Stream::Labels, labels_rest - tokens_rest),
            Ordering::Equal => return,
        };
        self.warn(LoadWarning::UnmatchedLines { stream, count });
    }

    fn note_missing(&mut self, word: &str, line: usize) {
        let word = normalize(word);
        if !self.missing.contains(&*word) {
            self.missing.insert(word.to_string());
            self.warn(LoadWarning::OutOfVocabulary {
                word: word.into_owned(),
                line,
            });
        }
    }
}

fn unavailable(location: &str) -> impl FnOnce(std::io::Error) -> AlignError + '_ {
    move |source| AlignError::TrainingFileUnavailable {
        location: location.to_string(),
        source,
    }
}

fn next_line<R: BufRead>(lines: &mut Split<R>, location: &str) -> Result<Option<Vec<u8>>> {
    lines.next().transpose().map_err(unavailable(location))
}

/// UTF-8 text of one raw line, without the trailing `\r` of CRLF input.
fn decode(mut bytes: Vec<u8>, location: &str, line: usize) -> Result<String> {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| AlignError::MalformedLine {
        location: location.to_string(),
        line,
        reason: format!("not valid UTF-8: {}", e.utf8_error()),
    })
}

fn count_rest<R: BufRead>(lines: Split<R>, location: &str) -> Result<usize> {
    lines
        .map(|line| line.map_err(unavailable(location)))
        .try_fold(0, |count, line| line.map(|_| count + 1))
}

impl<'s> TrainingSetAligner<'s> {
    /// Aligner over `store` with the given limits and policies.
    pub fn new(store: &'s EmbeddingStore, options: AlignOptions) -> Self {
        Self { store, options }
    }

    /// Options in use.
    pub fn options(&self) -> &AlignOptions {
        &self.options
    }

    /// Load from the tokens and labels files.
    pub fn load(&self, tokens: impl AsRef<Path>, labels: impl AsRef<Path>) -> Result<TrainingSet> {
        let (tokens, labels) = (tokens.as_ref(), labels.as_ref());
        let tokens_location = tokens.display().to_string();
        let labels_location = labels.display().to_string();
        let tokens_file = File::open(tokens).map_err(unavailable(&tokens_location))?;
        let labels_file = File::open(labels).map_err(unavailable(&labels_location))?;
        let set = self.align(
            BufReader::new(tokens_file),
            BufReader::new(labels_file),
            &tokens_location,
            &labels_location,
        )?;
        info!(
            tokens = %tokens_location,
            labels = %labels_location,
            examples = set.len(),
            pairs = set.stats().pairs,
            warnings = set.warnings().len(),
            "training set loaded"
        );
        Ok(set)
    }

    /// Load from in-memory or otherwise already-open readers.
    pub fn load_from_readers<T: BufRead, L: BufRead>(&self, tokens: T, labels: L) -> Result<TrainingSet> {
        self.align(tokens, labels, "<tokens>", "<labels>")
    }

    fn align<T: BufRead, L: BufRead>(
        &self,
        tokens: T,
        labels: L,
        tokens_location: &str,
        labels_location: &str,
    ) -> Result<TrainingSet> {
        let mut token_lines = tokens.split(b'\n');
        let mut label_lines = labels.split(b'\n');
        let mut state = LoadState::default();

        loop {
            if state.set.stats.lines == self.options.max_lines {
                let tokens_rest = count_rest(token_lines, tokens_location)?;
                let labels_rest = count_rest(label_lines, labels_location)?;
                if tokens_rest > 0 || labels_rest > 0 {
                    self.overflow(
                        &mut state,
                        LoadWarning::LinesTruncated {
                            max_lines: self.options.max_lines,
                        },
                    )?;
                }
                state.unmatched(tokens_rest, labels_rest);
                break;
            }

            let line = state.set.stats.lines + 1;
            let next_tokens = next_line(&mut token_lines, tokens_location)?;
            let next_labels = next_line(&mut label_lines, labels_location)?;
            let (token_line, label_line) = match (next_tokens, next_labels) {
                (Some(t), Some(l)) => (
                    decode(t, tokens_location, line)?,
                    decode(l, labels_location, line)?,
                ),
                (Some(_), None) => {
                    let rest = 1 + count_rest(token_lines, tokens_location)?;
                    state.unmatched(rest, 0);
                    break;
                }
                (None, Some(_)) => {
                    let rest = 1 + count_rest(label_lines, labels_location)?;
                    state.unmatched(0, rest);
                    break;
                }
                (None, None) => break,
            };

            state.set.stats.lines = line;

            match self.align_line(&mut state, line, &token_line, &label_line)? {
                Some(example) if !example.is_empty() => {
                    state.set.stats.pairs += example.len();
                    state.set.examples.push(example);
                }
                _ => {
                    debug!(line, "line produced no pairs");
                    state.set.stats.dropped_lines += 1;
                }
            }
        }

        Ok(state.set)
    }

    /// `None` when the OOV policy drops the whole line.
    fn align_line(
        &self,
        state: &mut LoadState,
        line: usize,
        token_line: &str,
        label_line: &str,
    ) -> Result<Option<TrainingExample>> {
        let words: Vec<&str> = token_line.split_whitespace().collect();
        let labels: Vec<&str> = label_line.split_whitespace().collect();
        if words.len() != labels.len() {
            state.warn(LoadWarning::PairCountMismatch {
                line,
                tokens: words.len(),
                labels: labels.len(),
            });
        }

        let aligned = words.len().min(labels.len());
        let max_tokens = self.options.max_tokens;
        if aligned > max_tokens {
            self.overflow(
                state,
                LoadWarning::TokensTruncated {
                    line,
                    pairs: aligned,
                    max_tokens,
                },
            )?;
        }

        let mut example = TrainingExample::new(line, aligned.min(max_tokens));
        let pairs = words.iter().zip(labels.iter()).take(max_tokens).enumerate();
        for (position, (word, raw_label)) in pairs {
            let label = raw_label
                .parse::<Label>()
                .map_err(|e| AlignError::InvalidLabel {
                    line,
                    position,
                    value: e.0,
                })?;
            match self.store.lookup(word) {
                Some(vector) => example.push(position, vector.clone(), label),
                None => match self.options.on_oov {
                    OovPolicy::SkipPair => {
                        state.set.stats.oov_pairs += 1;
                        state.note_missing(word, line);
                    }
                    OovPolicy::SkipExample => {
                        state.note_missing(word, line);
                        return Ok(None);
                    }
                    OovPolicy::Fail => {
                        return Err(AlignError::OutOfVocabulary {
                            line,
                            position,
                            word: word.to_string(),
                        })
                    }
                },
            }
        }
        Ok(Some(example))
    }

    fn overflow(&self, state: &mut LoadState, warning: LoadWarning) -> Result<()> {
        match self.options.on_capacity {
            CapacityPolicy::Truncate => {
                state.warn(warning);
                Ok(())
            }
            CapacityPolicy::Fail => Err(AlignError::CapacityExceeded(warning)),
        }
    }
}
